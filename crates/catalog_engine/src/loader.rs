use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use catalog_core::{update, Effect, ListState, Msg, PageResult, PagerState};
use catalog_logging::{catalog_debug, catalog_info, catalog_warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::CharacterSource;

/// Drives sequential pagination against a [`CharacterSource`] and publishes
/// [`ListState`] snapshots to any number of subscribers.
///
/// Calls are serialized by the pager: a `load_more` issued while a page is in
/// flight is dropped. Once [`shutdown`](Self::shutdown) is called, in-flight
/// fetches are abandoned and nothing is published again.
pub struct PageLoader {
    source: Arc<dyn CharacterSource>,
    state: Mutex<PagerState>,
    tx: watch::Sender<ListState>,
    cancel: CancellationToken,
}

impl PageLoader {
    pub fn new(source: Arc<dyn CharacterSource>) -> Self {
        Self::with_cancellation(source, CancellationToken::new())
    }

    /// Ties the loader's lifetime to an externally owned token.
    pub fn with_cancellation(source: Arc<dyn CharacterSource>, cancel: CancellationToken) -> Self {
        let (tx, _rx) = watch::channel(ListState::default());
        Self {
            source,
            state: Mutex::new(PagerState::default()),
            tx,
            cancel,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.tx.subscribe()
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> ListState {
        self.tx.borrow().clone()
    }

    pub fn current_page(&self) -> u32 {
        self.lock().current_page()
    }

    pub fn is_last_page(&self) -> bool {
        self.lock().is_last_page()
    }

    /// Activates the loader and fetches the first page. Only the first call has
    /// an effect.
    pub async fn start(&self) {
        self.dispatch(Msg::Start).await;
    }

    /// Fetches the next page unless data is exhausted or a fetch is in flight.
    pub async fn load_more(&self) {
        self.dispatch(Msg::LoadMore).await;
    }

    pub fn shutdown(&self) {
        catalog_debug!("page loader shutting down");
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn dispatch(&self, msg: Msg) {
        let Some(effects) = self.apply(msg) else {
            return;
        };
        for effect in effects {
            match effect {
                Effect::FetchPage { page } => self.fetch_page(page).await,
            }
        }
    }

    async fn fetch_page(&self, page: u32) {
        catalog_debug!("fetching characters page {}", page);
        let Some(result) = self.cancel.run_until_cancelled(self.source.fetch(page)).await else {
            catalog_debug!("fetch of page {} abandoned", page);
            return;
        };

        let result = match result {
            Ok(characters) => {
                catalog_info!("page {} returned {} characters", page, characters.len());
                PageResult::Loaded(characters)
            }
            Err(err) => {
                catalog_warn!("could not get characters for page {}: {}", page, err);
                PageResult::Failed
            }
        };
        self.apply(Msg::PageLoaded { page, result });
    }

    /// Runs `msg` through the pager and publishes the result. Returns `None`
    /// after shutdown.
    fn apply(&self, msg: Msg) -> Option<Vec<Effect>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let mut guard = self.lock();
        let request = matches!(msg, Msg::Start | Msg::LoadMore);
        let (next, effects) = update(std::mem::take(&mut *guard), msg);
        *guard = next;

        if request && effects.is_empty() {
            catalog_debug!(
                "load request ignored (page {} loading={} last_page={})",
                guard.current_page(),
                guard.is_loading(),
                guard.is_last_page()
            );
        }

        let snapshot = guard.list();
        self.tx.send_if_modified(|current| {
            if current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        Some(effects)
    }

    fn lock(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
