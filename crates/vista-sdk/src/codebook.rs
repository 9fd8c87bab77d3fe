use std::collections::{HashMap, HashSet};

use vista_resources::schema::codebooks::CodebookDto;
use vista_types::{CodebookName, MetadataTag};

use crate::error::VisError;
use crate::vis::is_iso_string;

/// Group name assigned to composite position parts that are not standard
/// values. Unlike real groups it may repeat within a composite.
const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Result codes for position string validation.
///
/// Discriminants below 100 are rejections; `Valid` and `Custom` are
/// acceptable outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PositionValidationResult {
    /// Bad format, whitespace, non-ISO characters, or an invalid part.
    Invalid = 0,
    /// Numbers before non-numeric parts, or non-numeric parts out of order.
    InvalidOrder = 1,
    /// The same group appears more than once (DEFAULT_GROUP excepted).
    InvalidGrouping = 2,
    /// Standard value, integer, or a composite of standard values.
    Valid = 100,
    /// Acceptable value outside the standard set.
    Custom = 101,
}

impl PositionValidationResult {
    /// `true` for `Valid` and `Custom`.
    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            PositionValidationResult::Valid | PositionValidationResult::Custom
        )
    }
}

/// One VIS codebook: a named set of standard values with group membership.
///
/// Codebooks validate metadata tag values and create [`MetadataTag`]
/// instances. The Position codebook carries extra composite-validation
/// rules, see [`Codebook::validate_position`].
#[derive(Debug)]
pub struct Codebook {
    name: CodebookName,
    group_map: HashMap<String, String>,
    standard_values: HashSet<String>,
    groups: HashSet<String>,
}

impl Codebook {
    pub(crate) fn new(dto: &CodebookDto) -> Result<Self, VisError> {
        let name = payload_name(&dto.name).ok_or_else(|| {
            VisError::InvalidData(format!("unknown codebook name '{}'", dto.name))
        })?;

        let mut group_map = HashMap::new();
        let mut standard_values = HashSet::new();
        let mut groups = HashSet::new();

        for (group, values) in &dto.values {
            groups.insert(group.clone());
            for value in values {
                group_map.insert(value.clone(), group.clone());
                standard_values.insert(value.clone());
            }
        }

        Ok(Self {
            name,
            group_map,
            standard_values,
            groups,
        })
    }

    /// The codebook identifier.
    pub fn name(&self) -> CodebookName {
        self.name
    }

    /// The set of standard values.
    pub fn standard_values(&self) -> &HashSet<String> {
        &self.standard_values
    }

    /// The set of group names.
    pub fn groups(&self) -> &HashSet<String> {
        &self.groups
    }

    /// Membership test on group names.
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Membership test on standard values.
    ///
    /// For the Position codebook any integer string is standard.
    pub fn has_standard_value(&self, value: &str) -> bool {
        if self.name == CodebookName::Position && is_integer(value) {
            return true;
        }
        self.standard_values.contains(value)
    }

    /// The group a standard value belongs to.
    pub fn group_of(&self, value: &str) -> Option<&str> {
        self.group_map.get(value).map(String::as_str)
    }

    /// Validates a value and creates the matching tag.
    ///
    /// Returns `None` when the value is empty, contains non-ISO-unreserved
    /// characters, or (for Position) fails composite validation. The tag is
    /// custom iff the value is outside the standard set.
    pub fn create_tag(&self, value: &str) -> Option<MetadataTag> {
        if value.trim().is_empty() || !is_iso_string(value) {
            return None;
        }

        let custom = if self.name == CodebookName::Position {
            match self.validate_position(value) {
                PositionValidationResult::Valid => false,
                PositionValidationResult::Custom => true,
                _ => return None,
            }
        } else {
            !self.has_standard_value(value)
        };

        Some(MetadataTag::new(self.name, value, custom))
    }

    /// Validates a position string.
    ///
    /// Single values: integers and standard values are `Valid`, anything
    /// else ISO-clean is `Custom`. Composites (joined with `-`) must have
    /// every part acceptable, at most one custom part, all numeric parts
    /// after the non-numeric ones, non-numeric parts in order, and no
    /// repeated group other than the default group.
    pub fn validate_position(&self, position: &str) -> PositionValidationResult {
        use PositionValidationResult::*;

        if position.is_empty() || position.trim() != position || !is_iso_string(position) {
            return Invalid;
        }

        if is_integer(position) {
            return Valid;
        }

        if !position.contains('-') {
            if self.has_standard_value(position) {
                return Valid;
            }
            return Custom;
        }

        let parts: Vec<&str> = position.split('-').collect();
        let mut customs = 0usize;
        for part in &parts {
            match self.validate_position(part) {
                Valid => {}
                Custom => customs += 1,
                _ => return Invalid,
            }
        }
        if customs > 1 {
            return Invalid;
        }

        // numeric parts must trail the non-numeric ones
        let mut seen_number = false;
        for part in &parts {
            if is_integer(part) {
                seen_number = true;
            } else if seen_number {
                return InvalidOrder;
            }
        }

        let non_numeric: Vec<&str> = parts.iter().filter(|p| !is_integer(p)).copied().collect();
        for pair in non_numeric.windows(2) {
            if pair[0] < pair[1] {
                return InvalidOrder;
            }
        }

        let mut seen_groups = HashSet::new();
        for part in &non_numeric {
            let group = self.group_of(part).unwrap_or(DEFAULT_GROUP);
            if group != DEFAULT_GROUP && !seen_groups.insert(group.to_string()) {
                return InvalidGrouping;
            }
        }

        if customs == 0 {
            Valid
        } else {
            Custom
        }
    }
}

fn is_integer(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn payload_name(name: &str) -> Option<CodebookName> {
    match name {
        "quantities" => Some(CodebookName::Quantity),
        "contents" => Some(CodebookName::Content),
        "calculations" => Some(CodebookName::Calculation),
        "states" => Some(CodebookName::State),
        "commands" => Some(CodebookName::Command),
        "types" => Some(CodebookName::Type),
        "functional_services" => Some(CodebookName::FunctionalServices),
        "maintenance_category" => Some(CodebookName::MaintenanceCategory),
        "activity_type" => Some(CodebookName::ActivityType),
        "positions" => Some(CodebookName::Position),
        "detail" => Some(CodebookName::Detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use vista_types::VisVersion;

    fn codebook(name: CodebookName) -> Codebook {
        let dto = vista_resources::codebooks_dto(VisVersion::V3_4a).unwrap();
        let payload = dto
            .items
            .iter()
            .find(|c| payload_name(&c.name) == Some(name))
            .unwrap();
        Codebook::new(payload).unwrap()
    }

    #[test_case("centre", PositionValidationResult::Valid)]
    #[test_case("42", PositionValidationResult::Valid)]
    #[test_case("custom", PositionValidationResult::Custom)]
    #[test_case("upper-centre", PositionValidationResult::Valid)]
    #[test_case("centre-upper", PositionValidationResult::InvalidOrder)]
    #[test_case("upper-upper", PositionValidationResult::InvalidGrouping)]
    #[test_case("42-centre", PositionValidationResult::InvalidOrder; "number must trail")]
    #[test_case("", PositionValidationResult::Invalid)]
    #[test_case(" x ", PositionValidationResult::Invalid)]
    #[test_case("upper-centre-42", PositionValidationResult::Valid; "trailing number")]
    #[test_case("upper-custom.thing", PositionValidationResult::Custom; "one custom part")]
    #[test_case("zz.one-aa.two", PositionValidationResult::Invalid; "two custom parts")]
    #[test_case("upper-", PositionValidationResult::Invalid; "empty part")]
    #[test_case("outside-inside", PositionValidationResult::InvalidGrouping; "same transverse group")]
    fn test_validate_position(input: &str, expected: PositionValidationResult) {
        assert_eq!(
            codebook(CodebookName::Position).validate_position(input),
            expected
        );
    }

    #[test]
    fn test_has_standard_value() {
        let positions = codebook(CodebookName::Position);
        assert!(positions.has_standard_value("upper"));
        assert!(positions.has_standard_value("7")); // integers are standard positions
        assert!(!positions.has_standard_value("somewhere"));

        let quantities = codebook(CodebookName::Quantity);
        assert!(quantities.has_standard_value("temperature"));
        assert!(!quantities.has_standard_value("7"));
    }

    #[test]
    fn test_has_group() {
        let positions = codebook(CodebookName::Position);
        assert!(positions.has_group("Vertical Position"));
        assert!(!positions.has_group("Nonexistent Group"));
        assert_eq!(positions.group_of("upper"), Some("Vertical Position"));
    }

    #[test]
    fn test_create_tag_standard_vs_custom() {
        let quantities = codebook(CodebookName::Quantity);

        let tag = quantities.create_tag("temperature").unwrap();
        assert!(!tag.is_custom());
        assert_eq!(tag.to_string(), "qty-temperature");

        let tag = quantities.create_tag("something.else").unwrap();
        assert!(tag.is_custom());
        assert_eq!(tag.to_string(), "qty~something.else");
    }

    #[test]
    fn test_create_tag_rejects_non_iso() {
        let quantities = codebook(CodebookName::Quantity);
        assert!(quantities.create_tag("").is_none());
        assert!(quantities.create_tag("with space").is_none());
        assert!(quantities.create_tag("slash/y").is_none());
    }

    #[test]
    fn test_create_tag_position_rules() {
        let positions = codebook(CodebookName::Position);
        assert!(!positions.create_tag("inlet").unwrap().is_custom());
        assert!(!positions.create_tag("42").unwrap().is_custom());
        assert!(positions.create_tag("somewhere").unwrap().is_custom());
        assert!(positions.create_tag("centre-upper").is_none());
    }

    #[test]
    fn test_detail_codebook_is_all_custom() {
        let detail = codebook(CodebookName::Detail);
        let tag = detail.create_tag("sea.water.inlet").unwrap();
        assert!(tag.is_custom());
        assert_eq!(tag.to_string(), "detail~sea.water.inlet");
    }

    #[test]
    fn test_custom_tag_consistency() {
        // is_custom must mirror standard-value membership
        let states = codebook(CodebookName::State);
        for value in ["opened", "running", "weird.state"] {
            let tag = states.create_tag(value).unwrap();
            assert_eq!(tag.is_custom(), !states.has_standard_value(value));
        }
    }
}
