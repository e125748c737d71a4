use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use catalog_core::Character;
use catalog_engine::{CharacterSource, FailureKind, FetchError, PageLoader};
use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(catalog_logging::initialize_for_tests);
}

fn character(id: u32, name: &str) -> Character {
    Character {
        id,
        name: name.to_string(),
        species: "Human".to_string(),
        gender: "Male".to_string(),
        status: "Alive".to_string(),
        image: String::new(),
        origin: "Earth".to_string(),
        location: "Earth".to_string(),
    }
}

fn network_error() -> FetchError {
    FetchError::new(FailureKind::Network, "connection reset")
}

/// Replies with queued results in order; an exhausted queue yields empty pages.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<Character>, FetchError>>>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<Character>, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CharacterSource for ScriptedSource {
    async fn fetch(&self, page: u32) -> Result<Vec<Character>, FetchError> {
        self.calls.lock().unwrap().push(page);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Holds every fetch until a permit is released.
struct GatedSource {
    gate: Semaphore,
    calls: Mutex<Vec<u32>>,
}

impl GatedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CharacterSource for GatedSource {
    async fn fetch(&self, page: u32) -> Result<Vec<Character>, FetchError> {
        self.calls.lock().unwrap().push(page);
        let permit = self.gate.acquire().await.map_err(|_| network_error())?;
        permit.forget();
        Ok(vec![character(page, "gated")])
    }
}

fn ids(loader: &PageLoader) -> Vec<u32> {
    loader.snapshot().characters.iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn overlapping_pages_merge_first_seen_wins() {
    init_logging();
    let source = ScriptedSource::new(vec![
        Ok(vec![character(1, "Rick"), character(2, "Morty")]),
        Ok(vec![character(2, "Doofus Morty"), character(3, "Summer")]),
    ]);
    let loader = PageLoader::new(source.clone());

    loader.start().await;
    loader.load_more().await;

    assert_eq!(ids(&loader), vec![1, 2, 3]);
    assert_eq!(loader.snapshot().characters[1].name, "Morty");
    assert_eq!(loader.current_page(), 3);
    assert!(!loader.snapshot().loading);
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn empty_first_page_exhausts_loader() {
    init_logging();
    let source = ScriptedSource::new(vec![Ok(Vec::new())]);
    let loader = PageLoader::new(source.clone());

    loader.start().await;
    assert!(loader.snapshot().characters.is_empty());
    assert!(loader.is_last_page());
    assert!(!loader.snapshot().loading);

    loader.load_more().await;
    loader.load_more().await;
    assert_eq!(source.calls(), vec![1]);
}

#[tokio::test]
async fn failure_keeps_cursor_and_retry_targets_same_page() {
    init_logging();
    let source = ScriptedSource::new(vec![Err(network_error()), Ok(vec![character(1, "Rick")])]);
    let loader = PageLoader::new(source.clone());

    loader.start().await;
    assert!(loader.snapshot().characters.is_empty());
    assert_eq!(loader.current_page(), 1);
    assert!(!loader.snapshot().loading);
    assert!(!loader.is_last_page());

    loader.load_more().await;
    assert_eq!(ids(&loader), vec![1]);
    assert_eq!(source.calls(), vec![1, 1]);
}

#[tokio::test]
async fn start_fetches_only_once() {
    init_logging();
    let source = ScriptedSource::new(vec![Ok(vec![character(1, "Rick")])]);
    let loader = PageLoader::new(source.clone());

    loader.start().await;
    loader.start().await;
    assert_eq!(source.calls(), vec![1]);
}

#[tokio::test]
async fn nothing_is_published_before_start() {
    init_logging();
    let source = ScriptedSource::new(vec![Ok(vec![character(1, "Rick")])]);
    let loader = PageLoader::new(source.clone());
    let rx = loader.subscribe();

    assert!(!rx.has_changed().unwrap());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn every_subscriber_sees_final_snapshot() {
    init_logging();
    let source = ScriptedSource::new(vec![Ok(vec![character(1, "Rick"), character(2, "Morty")])]);
    let loader = PageLoader::new(source);
    let mut first = loader.subscribe();
    let mut second = loader.subscribe();

    loader.start().await;

    assert!(first.has_changed().unwrap());
    let a = first.borrow_and_update().clone();
    let b = second.borrow_and_update().clone();
    assert_eq!(a, b);
    assert_eq!(a.characters.len(), 2);
    assert!(!a.loading);
}

#[tokio::test]
async fn load_more_while_in_flight_is_dropped() {
    init_logging();
    let source = GatedSource::new();
    let loader = Arc::new(PageLoader::new(source.clone()));
    let mut rx = loader.subscribe();

    let first = tokio::spawn({
        let loader = loader.clone();
        async move { loader.start().await }
    });
    rx.wait_for(|state| state.loading).await.unwrap();

    loader.load_more().await;
    assert_eq!(source.calls(), vec![1]);

    source.gate.add_permits(1);
    first.await.unwrap();
    assert_eq!(ids(&loader), vec![1]);
    assert_eq!(loader.current_page(), 2);
    assert!(!loader.snapshot().loading);
}

#[tokio::test]
async fn shutdown_abandons_in_flight_fetch() {
    init_logging();
    let source = GatedSource::new();
    let loader = Arc::new(PageLoader::new(source.clone()));
    let mut rx = loader.subscribe();

    let first = tokio::spawn({
        let loader = loader.clone();
        async move { loader.start().await }
    });
    rx.wait_for(|state| state.loading).await.unwrap();

    loader.shutdown();
    first.await.unwrap();
    source.gate.add_permits(1);
    loader.load_more().await;

    assert!(loader.is_shut_down());
    assert!(!rx.has_changed().unwrap());
    assert!(loader.snapshot().characters.is_empty());
    assert_eq!(source.calls(), vec![1]);
}
