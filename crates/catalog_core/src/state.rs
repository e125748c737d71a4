use std::collections::HashSet;

use crate::{Character, Effect, PageResult};

/// The cursor value before anything has been fetched.
pub const FIRST_PAGE: u32 = 1;

/// Snapshot published to observers of the loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    pub loading: bool,
    /// Deduplicated by id, in first-seen order.
    pub characters: Vec<Character>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn get(&self, id: crate::CharacterId) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    /// Appends every character whose id is not already present.
    /// Returns how many were appended.
    pub(crate) fn merge_page(&mut self, page: Vec<Character>) -> usize {
        let mut seen: HashSet<_> = self.characters.iter().map(|c| c.id).collect();
        let before = self.characters.len();
        self.characters
            .extend(page.into_iter().filter(|character| seen.insert(character.id)));
        self.characters.len() - before
    }
}

/// Pagination state owned by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerState {
    current_page: u32,
    is_last_page: bool,
    started: bool,
    list: ListState,
}

impl Default for PagerState {
    fn default() -> Self {
        Self {
            current_page: FIRST_PAGE,
            is_last_page: false,
            started: false,
            list: ListState::default(),
        }
    }
}

impl PagerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next page number to request.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_last_page(&self) -> bool {
        self.is_last_page
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_loading(&self) -> bool {
        self.list.loading
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    /// Owned copy of the list for publishing.
    pub fn snapshot(&self) -> ListState {
        self.list.clone()
    }

    pub(crate) fn activate(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    /// Moves to loading and returns the fetch to perform, unless the data is
    /// exhausted or a fetch is already in flight.
    pub(crate) fn begin_load(&mut self) -> Option<Effect> {
        self.started = true;
        if self.is_last_page || self.list.loading {
            return None;
        }
        self.list.loading = true;
        Some(Effect::FetchPage {
            page: self.current_page,
        })
    }

    /// Applies a finished fetch. Returns false when the result does not belong
    /// to the fetch in flight and was ignored.
    pub(crate) fn finish_load(&mut self, page: u32, result: PageResult) -> bool {
        if !self.list.loading || page != self.current_page {
            return false;
        }
        match result {
            PageResult::Loaded(characters) if characters.is_empty() => {
                self.is_last_page = true;
            }
            PageResult::Loaded(characters) => {
                self.list.merge_page(characters);
                self.current_page += 1;
            }
            PageResult::Failed => {}
        }
        self.list.loading = false;
        true
    }
}
