use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One codebook: its payload name and the standard values grouped by
/// group name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebookDto {
    /// Payload codebook name (e.g. "quantities", "positions").
    pub name: String,
    /// Standard values keyed by group name.
    pub values: HashMap<String, Vec<String>>,
}

/// Complete codebooks payload for one VIS release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodebooksDto {
    /// The VIS release this payload belongs to.
    pub vis_release: String,
    /// All codebooks of the release.
    pub items: Vec<CodebookDto>,
}
