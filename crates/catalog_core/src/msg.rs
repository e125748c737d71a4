use crate::Character;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Owning consumer activated the loader. Only the first one counts.
    Start,
    /// Consumer wants the next page (e.g. scrolled near the end).
    LoadMore,
    /// Source finished a fetch started by `Effect::FetchPage`.
    PageLoaded { page: u32, result: PageResult },
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// Successful fetch. An empty page is the end-of-data sentinel.
    Loaded(Vec<Character>),
    /// The fetch failed; the cause has already been logged by the caller.
    Failed,
}
