use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use catalog_core::{CharacterDetailsView, CharacterId, ListViewModel};
use catalog_engine::{EngineEvent, EngineHandle};
use catalog_logging::{catalog_trace, catalog_warn};

use crate::command::{Command, HELP};
use crate::render;

enum Screen {
    List,
    Details(CharacterDetailsView),
}

/// Line-oriented front end: reads commands, drives the engine, prints screens.
pub struct App<W: Write> {
    engine: EngineHandle,
    out: W,
    screen: Screen,
    wait: Duration,
}

impl<W: Write> App<W> {
    pub fn new(engine: EngineHandle, out: W, wait: Duration) -> Self {
        Self {
            engine,
            out,
            screen: Screen::List,
            wait,
        }
    }

    pub fn run(mut self, input: impl BufRead) -> anyhow::Result<()> {
        self.engine.start();
        self.wait_for_list();
        self.draw()?;
        writeln!(self.out, "{HELP}")?;

        for line in input.lines() {
            let line = line.context("reading command")?;
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::More) => {
                    self.screen = Screen::List;
                    if !self.engine.is_last_page() {
                        self.drain();
                        self.engine.load_more();
                        self.wait_for_list();
                    }
                    self.draw()?;
                }
                Ok(Command::Show(id)) => {
                    self.engine.show_details(id);
                    self.wait_for_details(id)?;
                }
                Ok(Command::List | Command::Back) => {
                    self.screen = Screen::List;
                    self.draw()?;
                }
                Ok(Command::Help) => writeln!(self.out, "{HELP}")?,
                Err(message) => writeln!(self.out, "{message}")?,
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let text = match &self.screen {
            Screen::List => render::list(
                &ListViewModel::from_state(&self.engine.snapshot()),
                self.engine.is_last_page(),
            ),
            Screen::Details(view) => render::details(view),
        };
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn drain(&self) {
        while let Some(event) = self.engine.try_recv() {
            catalog_trace!("dropping stale engine event {:?}", event);
        }
    }

    /// Blocks until the loader reports an idle list or the wait expires.
    fn wait_for_list(&self) {
        let idle = self.pump(|event| {
            matches!(event, EngineEvent::ListChanged(state) if !state.loading)
        });
        if idle.is_none() {
            catalog_warn!("list still loading after {:?}", self.wait);
        }
    }

    fn wait_for_details(&mut self, id: CharacterId) -> anyhow::Result<()> {
        let event = self.pump(|event| match event {
            EngineEvent::DetailsLoaded { character, .. } => character.id == id,
            EngineEvent::DetailsFailed { id: failed, .. } => *failed == id,
            EngineEvent::ListChanged(_) => false,
        });
        match event {
            Some(EngineEvent::DetailsLoaded {
                character,
                background,
            }) => {
                self.screen = Screen::Details(CharacterDetailsView::new(&character, background));
                self.draw()
            }
            Some(EngineEvent::DetailsFailed { kind, .. }) => {
                writeln!(self.out, "could not load character {id}: {kind}")?;
                Ok(())
            }
            _ => {
                writeln!(self.out, "character {id} did not arrive in time")?;
                Ok(())
            }
        }
    }

    /// Drains engine events until `done` accepts one or the wait expires.
    fn pump(&self, done: impl Fn(&EngineEvent) -> bool) -> Option<EngineEvent> {
        let deadline = Instant::now() + self.wait;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let event = self.engine.recv_timeout(remaining)?;
            if done(&event) {
                return Some(event);
            }
            catalog_trace!("skipping engine event {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use catalog_core::Character;
    use catalog_engine::{
        CharacterLookup, CharacterSource, FailureKind, FetchError, FetchOutput, Fetcher,
        HistogramColorExtractor,
    };

    use super::*;

    /// Scripted catalog with optional delays. A `lookup_delay` of `None`
    /// means detail lookups never answer.
    struct TestCatalog {
        pages: Vec<Vec<CharacterId>>,
        page_delay: Duration,
        lookup_delay: Option<Duration>,
        calls: Mutex<Vec<u32>>,
    }

    impl TestCatalog {
        fn new(pages: Vec<Vec<CharacterId>>) -> Self {
            Self {
                pages,
                page_delay: Duration::ZERO,
                lookup_delay: Some(Duration::ZERO),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }

        fn character(id: CharacterId) -> Character {
            Character {
                id,
                name: format!("Morty #{id}"),
                species: "Human".to_string(),
                gender: "Male".to_string(),
                status: "Alive".to_string(),
                image: format!("memory://{id}"),
                origin: "Earth (C-137)".to_string(),
                location: "Purge Planet".to_string(),
            }
        }
    }

    #[async_trait::async_trait]
    impl CharacterSource for TestCatalog {
        async fn fetch(&self, page: u32) -> Result<Vec<Character>, FetchError> {
            self.calls.lock().unwrap().push(page);
            tokio::time::sleep(self.page_delay).await;
            let ids = self.pages.get(page as usize - 1).cloned().unwrap_or_default();
            Ok(ids.into_iter().map(Self::character).collect())
        }
    }

    #[async_trait::async_trait]
    impl CharacterLookup for TestCatalog {
        async fn fetch_character(&self, id: CharacterId) -> Result<Character, FetchError> {
            match self.lookup_delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
            if self.pages.iter().flatten().any(|known| *known == id) {
                Ok(Self::character(id))
            } else {
                Err(FetchError::new(FailureKind::HttpStatus(404), "Not Found"))
            }
        }
    }

    struct NoImages;

    #[async_trait::async_trait]
    impl Fetcher for NoImages {
        async fn fetch(&self, _url: &str) -> Result<FetchOutput, FetchError> {
            Err(FetchError::new(FailureKind::Network, "offline"))
        }
    }

    fn run_app(catalog: &Arc<TestCatalog>, wait: Duration, input: &str) -> String {
        let engine = EngineHandle::with_parts(
            catalog.clone(),
            catalog.clone(),
            Arc::new(NoImages),
            Arc::new(HistogramColorExtractor::default()),
        )
        .unwrap();
        let mut out = Vec::new();
        App::new(engine, &mut out, wait)
            .run(Cursor::new(input.to_string()))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn browses_more_details_and_back() {
        let catalog = Arc::new(TestCatalog::new(vec![vec![1, 2], vec![2, 3]]));
        let out = run_app(&catalog, Duration::from_secs(5), "m\ns 1\nb\nq\n");

        let screens: Vec<&str> = out.split("Characters\n").collect();
        // initial list, list after `m`, list after `b`
        assert_eq!(screens.len(), 4);
        assert!(screens[1].contains("#2"));
        assert!(!screens[1].contains("#3"));
        assert!(screens[2].contains("#3"));
        assert!(screens[2].contains("<- Morty #1\n"));
        assert!(screens[2].contains("Last known location:\n  Purge Planet"));
        assert!(screens[3].contains("#1"));
        assert!(screens[3].contains("#3"));
        assert_eq!(catalog.calls(), vec![1, 2]);
    }

    #[test]
    fn more_after_last_page_does_not_fetch() {
        let catalog = Arc::new(TestCatalog::new(vec![vec![1]]));
        let out = run_app(&catalog, Duration::from_secs(5), "m\nm\nq\n");

        assert_eq!(catalog.calls(), vec![1, 2]);
        assert!(out.ends_with("-- end of catalog (1 characters) --\n"));
    }

    #[test]
    fn unknown_character_prints_failure() {
        let catalog = Arc::new(TestCatalog::new(vec![vec![1]]));
        let out = run_app(&catalog, Duration::from_secs(5), "s 9\nq\n");

        assert!(out.contains("could not load character 9: http status 404\n"));
    }

    #[test]
    fn silent_lookup_prints_timeout_notice() {
        let catalog = Arc::new(TestCatalog {
            lookup_delay: None,
            ..TestCatalog::new(vec![vec![1]])
        });
        let out = run_app(&catalog, Duration::from_millis(300), "s 1\nq\n");

        assert!(out.contains("character 1 did not arrive in time\n"));
    }

    #[test]
    fn list_events_are_skipped_while_waiting_for_details() {
        // The first page lands after the start-up wait expires but before the
        // detail lookup answers.
        let catalog = Arc::new(TestCatalog {
            page_delay: Duration::from_millis(1200),
            lookup_delay: Some(Duration::from_millis(600)),
            ..TestCatalog::new(vec![vec![1]])
        });
        let out = run_app(&catalog, Duration::from_millis(800), "s 1\nl\nq\n");

        let screens: Vec<&str> = out.split("Characters\n").collect();
        assert_eq!(screens.len(), 3);
        assert!(screens[1].contains("loading..."));
        assert!(screens[1].contains("<- Morty #1\n"));
        assert!(screens[2].contains("#1"));
        assert!(!screens[2].contains("loading..."));
    }

    #[test]
    fn more_while_first_page_in_flight_waits_without_refetching() {
        let catalog = Arc::new(TestCatalog {
            page_delay: Duration::from_millis(600),
            ..TestCatalog::new(vec![vec![1]])
        });
        let out = run_app(&catalog, Duration::from_millis(400), "m\nq\n");

        let screens: Vec<&str> = out.split("Characters\n").collect();
        assert_eq!(screens.len(), 3);
        assert!(screens[1].contains("loading..."));
        assert!(screens[2].contains("#1"));
        assert!(!screens[2].contains("loading..."));
        assert_eq!(catalog.calls(), vec![1]);
    }
}
