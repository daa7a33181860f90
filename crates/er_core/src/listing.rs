use serde::{Deserialize, Serialize};

/// Per-slot snapshot derived from the common section's profile
/// summaries, for display and scripting. Not part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterListing {
    pub index: usize,
    pub active: bool,
    pub name: String,
    pub level: u32,
    pub playtime_seconds: u32,
}
