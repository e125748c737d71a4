#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the character source for one page (1-based).
    FetchPage { page: u32 },
}
