//! Catalog engine: remote character source, page loader and effect execution.
mod engine;
mod fetch;
mod loader;
mod palette;
mod source;
mod types;

pub use engine::{EngineConfig, EngineError, EngineHandle, DEFAULT_API_BASE_URL};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use loader::PageLoader;
pub use palette::{ColorExtractor, HistogramColorExtractor, PaletteError};
pub use source::{ApiCharacterSource, CharacterLookup, CharacterSource};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput};
