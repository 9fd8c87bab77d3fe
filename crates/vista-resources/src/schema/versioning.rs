use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One node's conversion rule within a single version step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmodNodeConversionDto {
    /// The code in the step's source version.
    pub source: String,
    /// The code in the step's target version, when it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Operation tags (e.g. "changeCode", "merge", "assignmentChange").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
    /// Previous assignment child code, for assignment changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_assignment: Option<String>,
    /// New assignment child code, for assignment changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_assignment: Option<String>,
    /// `true` when the assignment was removed outright.
    #[serde(default)]
    pub delete_assignment: bool,
}

/// All conversion rules for one version step, keyed by source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmodVersioningDto {
    pub items: HashMap<String, GmodNodeConversionDto>,
}

/// The full versioning payload: one step table per target version.
pub type GmodVersioningMapDto = HashMap<String, GmodVersioningDto>;
