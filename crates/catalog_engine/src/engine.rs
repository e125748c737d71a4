use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use catalog_core::{CharacterId, ListState, Rgb};
use catalog_logging::{catalog_debug, catalog_info, catalog_warn};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{
    ApiCharacterSource, CharacterLookup, CharacterSource, ColorExtractor, EngineEvent, FetchError,
    HistogramColorExtractor, PageLoader,
};

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_base_url: String,
    pub fetch: FetchSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fetch: FetchSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(#[source] FetchError),
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] io::Error),
}

enum EngineCommand {
    Start,
    LoadMore,
    ShowDetails { id: CharacterId },
}

/// Synchronous front for the loader and detail lookups.
///
/// Work runs on a tokio runtime owned by a background thread. Dropping the
/// handle ends the consumer lifetime: pending fetches are abandoned and no
/// further events are sent.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    loader: Arc<PageLoader>,
    cancel: CancellationToken,
}

struct Workers {
    loader: Arc<PageLoader>,
    lookup: Arc<dyn CharacterLookup>,
    images: Arc<dyn Fetcher>,
    colors: Arc<dyn ColorExtractor>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch));
        let source = Arc::new(
            ApiCharacterSource::new(&config.api_base_url, fetcher.clone())
                .map_err(EngineError::InvalidBaseUrl)?,
        );
        Self::with_parts(
            source.clone(),
            source,
            fetcher,
            Arc::new(HistogramColorExtractor::default()),
        )
    }

    /// Builds a handle from explicit collaborators: `pages` feeds the list,
    /// `lookup` the detail view, and `images` plus `colors` its background.
    pub fn with_parts(
        pages: Arc<dyn CharacterSource>,
        lookup: Arc<dyn CharacterLookup>,
        images: Arc<dyn Fetcher>,
        colors: Arc<dyn ColorExtractor>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let loader = Arc::new(PageLoader::with_cancellation(pages, cancel.child_token()));
        let workers = Arc::new(Workers {
            loader: loader.clone(),
            lookup,
            images,
            colors,
            cancel: cancel.clone(),
        });

        runtime.spawn(forward_list(loader.subscribe(), event_tx.clone(), cancel.clone()));

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&workers, command, event_tx).await;
                });
            }
            catalog_debug!("engine command loop finished");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            loader,
            cancel,
        })
    }

    /// Activates the list. Only the first call fetches.
    pub fn start(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Start);
    }

    pub fn load_more(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadMore);
    }

    pub fn show_details(&self, id: CharacterId) {
        let _ = self.cmd_tx.send(EngineCommand::ShowDetails { id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn snapshot(&self) -> ListState {
        self.loader.snapshot()
    }

    pub fn is_last_page(&self) -> bool {
        self.loader.is_last_page()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn handle_command(
    workers: &Workers,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Start => workers.loader.start().await,
        EngineCommand::LoadMore => workers.loader.load_more().await,
        EngineCommand::ShowDetails { id } => {
            let Some(event) = workers
                .cancel
                .run_until_cancelled(load_details(workers, id))
                .await
            else {
                return;
            };
            let _ = event_tx.send(event);
        }
    }
}

async fn load_details(workers: &Workers, id: CharacterId) -> EngineEvent {
    let character = match workers.lookup.fetch_character(id).await {
        Ok(character) => character,
        Err(err) => {
            catalog_warn!("could not get character {}: {}", id, err);
            return EngineEvent::DetailsFailed { id, kind: err.kind };
        }
    };

    let background = match workers.images.fetch(&character.image).await {
        Ok(output) => match workers.colors.dominant_color(&output.bytes) {
            Ok(color) => color,
            Err(err) => {
                catalog_debug!("no dominant color for character {}: {}", id, err);
                Rgb::default()
            }
        },
        Err(err) => {
            catalog_debug!("could not get image for character {}: {}", id, err);
            Rgb::default()
        }
    };

    catalog_info!("loaded details for character {} ({})", id, character.name);
    EngineEvent::DetailsLoaded {
        character,
        background,
    }
}

async fn forward_list(
    mut rx: watch::Receiver<ListState>,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    while let Some(Ok(())) = cancel.run_until_cancelled(rx.changed()).await {
        let snapshot = rx.borrow_and_update().clone();
        if event_tx.send(EngineEvent::ListChanged(snapshot)).is_err() {
            break;
        }
    }
}
