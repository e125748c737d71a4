pub type CharacterId = u32;

/// One catalog entry. `id` is stable across pages and is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub species: String,
    pub gender: String,
    /// Open-ended: "Alive", "Dead", "unknown", ...
    pub status: String,
    /// Image URI.
    pub image: String,
    /// Origin location name.
    pub origin: String,
    /// Last known location name.
    pub location: String,
}
