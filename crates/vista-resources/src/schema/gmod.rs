use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One GMOD node as stored in the reference data payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmodNodeDto {
    /// Node category (e.g. "ASSET FUNCTION", "PRODUCT").
    pub category: String,
    /// Node type (e.g. "GROUP", "SELECTION", "LEAF", "COMPOSITION", "TYPE").
    #[serde(rename = "type")]
    pub node_type: String,
    /// Stable node code (e.g. "VE", "411.1", "C101.31").
    pub code: String,
    /// Technical name.
    pub name: String,
    /// Optional common/friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// Optional technical definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Optional user-friendly definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_definition: Option<String>,
    /// Optional installation substructure flag; `false` hides the node's
    /// subtree from traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_substructure: Option<bool>,
    /// Display-name overrides keyed by the assigned child's code.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub normal_assignment_names: HashMap<String, String>,
}

/// Complete GMOD payload for one VIS release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmodDto {
    /// The VIS release this payload belongs to (e.g. "3-4a").
    pub vis_release: String,
    /// All nodes of the model.
    pub items: Vec<GmodNodeDto>,
    /// Parent/child relations as `[parentCode, childCode]` pairs.
    pub relations: Vec<Vec<String>>,
}
