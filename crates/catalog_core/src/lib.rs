//! Catalog core: pure pagination state machine and view-model helpers.
mod character;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use character::{Character, CharacterId};
pub use effect::Effect;
pub use msg::{Msg, PageResult};
pub use state::{ListState, PagerState, FIRST_PAGE};
pub use update::update;
pub use view_model::{
    CharacterDetailsView, CharacterRowView, DetailRow, ListViewModel, Rgb, StatusIndicator,
    TopBarConfig, LIST_TITLE,
};
