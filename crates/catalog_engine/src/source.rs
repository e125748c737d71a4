use std::sync::Arc;

use catalog_core::{Character, CharacterId, FIRST_PAGE};
use serde::Deserialize;
use url::Url;

use crate::{FailureKind, FetchError, Fetcher};

/// Remote provider of character pages.
///
/// `page` is 1-based. An empty `Ok` is the end-of-data sentinel.
#[async_trait::async_trait]
pub trait CharacterSource: Send + Sync {
    async fn fetch(&self, page: u32) -> Result<Vec<Character>, FetchError>;
}

/// Single-character lookup used by the detail view.
#[async_trait::async_trait]
pub trait CharacterLookup: Send + Sync {
    async fn fetch_character(&self, id: CharacterId) -> Result<Character, FetchError>;
}

/// `CharacterSource` backed by the catalog's REST API.
pub struct ApiCharacterSource {
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
}

impl ApiCharacterSource {
    pub fn new(base_url: &str, fetcher: Arc<dyn Fetcher>) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be a base url"),
            ));
        }
        Ok(Self { base_url, fetcher })
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint(&["character"]);
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    pub fn character_url(&self, id: CharacterId) -> Url {
        self.endpoint(&["character", &id.to_string()])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait::async_trait]
impl CharacterSource for ApiCharacterSource {
    async fn fetch(&self, page: u32) -> Result<Vec<Character>, FetchError> {
        let url = self.page_url(page);
        let output = match self.fetcher.fetch(url.as_str()).await {
            Ok(output) => output,
            // The API answers 404 once `page` runs past the last one. A 404 on the
            // first page means the base url is wrong, not that the catalog is empty.
            Err(err) if err.kind == FailureKind::HttpStatus(404) && page > FIRST_PAGE => {
                return Ok(Vec::new())
            }
            Err(err) => return Err(err),
        };
        let page: PageDto = decode_json(&output.bytes)?;
        Ok(page.results.into_iter().map(Character::from).collect())
    }
}

#[async_trait::async_trait]
impl CharacterLookup for ApiCharacterSource {
    async fn fetch_character(&self, id: CharacterId) -> Result<Character, FetchError> {
        let url = self.character_url(id);
        let output = self.fetcher.fetch(url.as_str()).await?;
        let dto: CharacterDto = decode_json(&output.bytes)?;
        Ok(dto.into())
    }
}

fn decode_json<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, FetchError> {
    serde_json::from_slice(bytes).map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}

#[derive(Debug, Deserialize)]
struct PageDto {
    results: Vec<CharacterDto>,
}

#[derive(Debug, Deserialize)]
struct CharacterDto {
    id: CharacterId,
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    species: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    origin: LocationDto,
    #[serde(default)]
    location: LocationDto,
}

#[derive(Debug, Default, Deserialize)]
struct LocationDto {
    #[serde(default)]
    name: String,
}

impl From<CharacterDto> for Character {
    fn from(dto: CharacterDto) -> Self {
        Character {
            id: dto.id,
            name: dto.name,
            species: dto.species,
            gender: dto.gender,
            status: dto.status,
            image: dto.image,
            origin: dto.origin.name,
            location: dto.location.name,
        }
    }
}
