use std::fmt;

use crate::{Character, CharacterId, ListState};

/// Title shown in the list screen's top bar.
pub const LIST_TITLE: &str = "Characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Detail background until an image color is known.
    pub const DARK_GRAY: Rgb = Rgb::new(0x44, 0x44, 0x44);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::DARK_GRAY
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Green,
    Red,
    Black,
}

impl StatusIndicator {
    /// Exact, case-sensitive match on the API's status strings.
    pub fn for_status(status: &str) -> Self {
        match status {
            "Alive" => StatusIndicator::Green,
            "Dead" => StatusIndicator::Red,
            _ => StatusIndicator::Black,
        }
    }
}

/// Top bar settings handed from a screen to the chrome that draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBarConfig {
    pub show_title: bool,
    pub title: String,
    pub show_back_button: bool,
}

impl TopBarConfig {
    pub fn list() -> Self {
        Self {
            show_title: true,
            title: LIST_TITLE.to_string(),
            show_back_button: false,
        }
    }

    pub fn details(character_name: impl Into<String>) -> Self {
        Self {
            show_title: true,
            title: character_name.into(),
            show_back_button: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRowView {
    pub id: CharacterId,
    pub name: String,
    pub status: String,
    pub indicator: StatusIndicator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel {
    pub top_bar: TopBarConfig,
    pub loading: bool,
    pub rows: Vec<CharacterRowView>,
}

impl ListViewModel {
    pub fn from_state(state: &ListState) -> Self {
        Self {
            top_bar: TopBarConfig::list(),
            loading: state.loading,
            rows: state
                .characters
                .iter()
                .map(|character| CharacterRowView {
                    id: character.id,
                    name: character.name.clone(),
                    status: character.status.clone(),
                    indicator: StatusIndicator::for_status(&character.status),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDetailsView {
    pub top_bar: TopBarConfig,
    pub image: String,
    pub background: Rgb,
    pub status: String,
    pub indicator: StatusIndicator,
    pub rows: Vec<DetailRow>,
}

impl CharacterDetailsView {
    pub fn new(character: &Character, background: Rgb) -> Self {
        let row = |label, value: &str| DetailRow {
            label,
            value: value.to_string(),
        };
        Self {
            top_bar: TopBarConfig::details(character.name.clone()),
            image: character.image.clone(),
            background,
            status: character.status.clone(),
            indicator: StatusIndicator::for_status(&character.status),
            rows: vec![
                row("Species:", &character.species),
                row("Gender:", &character.gender),
                row("Last known location:", &character.location),
                row("First seen in:", &character.origin),
            ],
        }
    }
}
