use serde::{Deserialize, Serialize};

/// One relative location character of the location sub-language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeLocationDto {
    /// The single-character code (e.g. 'P', 'U', 'A').
    pub code: char,
    /// Human-readable name (e.g. "port", "upper").
    pub name: String,
    /// Optional definition text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Complete locations payload for one VIS release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsDto {
    /// The VIS release this payload belongs to.
    pub vis_release: String,
    /// All relative locations of the release.
    pub items: Vec<RelativeLocationDto>,
}
