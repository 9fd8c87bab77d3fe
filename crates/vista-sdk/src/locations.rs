use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;
use vista_resources::schema::locations::LocationsDto;
use vista_types::{ParsingErrors, VisVersion};

use crate::error::VisError;

/// Group slot a location letter belongs to.
///
/// At most one letter per slot may appear in a location string. The `H` and
/// `V` letters are recognized but belong to no group and bypass the slot
/// checks; numbers occupy the leading digit prefix rather than a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationGroup {
    Number,
    Side,
    Vertical,
    Transverse,
    Longitudinal,
}

impl LocationGroup {
    /// Human-readable group name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            LocationGroup::Number => "Number",
            LocationGroup::Side => "Side",
            LocationGroup::Vertical => "Vertical",
            LocationGroup::Transverse => "Transverse",
            LocationGroup::Longitudinal => "Longitudinal",
        }
    }

    fn slot(&self) -> Option<usize> {
        match self {
            LocationGroup::Number => None,
            LocationGroup::Side => Some(0),
            LocationGroup::Vertical => Some(1),
            LocationGroup::Transverse => Some(2),
            LocationGroup::Longitudinal => Some(3),
        }
    }
}

/// A validated location string.
///
/// Canonical form is an optional integer prefix followed by letters in
/// ascending order, at most one per group slot. Instances are only produced
/// by [`Locations::parse`] or [`LocationBuilder`](crate::LocationBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    value: String,
}

impl Location {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// One entry of the locations reference data.
#[derive(Debug, Clone)]
pub struct RelativeLocation {
    code: char,
    name: String,
    location: Location,
    definition: Option<String>,
}

impl RelativeLocation {
    /// The single-character code.
    pub fn code(&self) -> char {
        self.code
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-character canonical location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Optional definition text.
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }
}

/// Validation outcome kinds for location parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationValidationResult {
    NullOrWhiteSpace,
    Invalid,
    InvalidCode,
    InvalidOrder,
}

impl LocationValidationResult {
    /// The state tag used in [`ParsingErrors`] reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationValidationResult::NullOrWhiteSpace => "NullOrWhiteSpace",
            LocationValidationResult::Invalid => "Invalid",
            LocationValidationResult::InvalidCode => "InvalidCode",
            LocationValidationResult::InvalidOrder => "InvalidOrder",
        }
    }
}

/// Error produced when a location string fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LocationParseError {
    kind: LocationValidationResult,
    message: String,
}

impl LocationParseError {
    fn new(kind: LocationValidationResult, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The validation kind that failed.
    pub fn kind(&self) -> LocationValidationResult {
        self.kind
    }

    /// The detailed message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The locations reference data for one VIS version.
///
/// Owns the relative-location list, the char→group map and the set of all
/// valid letters, and parses/validates location strings against them.
#[derive(Debug)]
pub struct Locations {
    version: VisVersion,
    relative_locations: Vec<RelativeLocation>,
    reversed_groups: HashMap<char, LocationGroup>,
    location_codes: HashSet<char>,
    groups: HashMap<LocationGroup, Vec<char>>,
}

impl Locations {
    pub(crate) fn new(version: VisVersion, dto: &LocationsDto) -> Result<Self, VisError> {
        let mut relative_locations = Vec::with_capacity(dto.items.len());
        let mut reversed_groups = HashMap::new();
        let mut location_codes = HashSet::new();
        let mut groups: HashMap<LocationGroup, Vec<char>> = HashMap::new();

        for item in &dto.items {
            relative_locations.push(RelativeLocation {
                code: item.code,
                name: item.name.clone(),
                location: Location::new(item.code.to_string()),
                definition: item.definition.clone(),
            });

            let group = match item.code {
                'N' => LocationGroup::Number,
                'P' | 'C' | 'S' => LocationGroup::Side,
                'U' | 'M' | 'L' => LocationGroup::Vertical,
                'I' | 'O' => LocationGroup::Transverse,
                'F' | 'A' => LocationGroup::Longitudinal,
                // H and V are valid letters outside any group
                'H' | 'V' => {
                    location_codes.insert(item.code);
                    continue;
                }
                other => {
                    return Err(VisError::InvalidData(format!(
                        "unsupported location code '{other}' in locations payload for {version}"
                    )))
                }
            };

            // N is expressed through the digit prefix, not as a letter
            if group == LocationGroup::Number {
                continue;
            }

            location_codes.insert(item.code);
            reversed_groups.insert(item.code, group);
            groups.entry(group).or_default().push(item.code);
        }

        Ok(Self {
            version,
            relative_locations,
            reversed_groups,
            location_codes,
            groups,
        })
    }

    /// The VIS version this data belongs to.
    pub fn version(&self) -> VisVersion {
        self.version
    }

    /// All relative locations, in payload order.
    pub fn relative_locations(&self) -> &[RelativeLocation] {
        &self.relative_locations
    }

    /// The letters of one group.
    pub fn group(&self, group: LocationGroup) -> &[char] {
        self.groups.get(&group).map_or(&[], Vec::as_slice)
    }

    /// The group a letter belongs to, if any. `H` and `V` have none.
    pub fn group_of(&self, code: char) -> Option<LocationGroup> {
        self.reversed_groups.get(&code).copied()
    }

    pub(crate) fn reversed_groups(&self) -> &HashMap<char, LocationGroup> {
        &self.reversed_groups
    }

    /// Parses a candidate location string.
    ///
    /// A valid location is an optional integer prefix followed by letters in
    /// ascending order, with at most one letter per group slot. The input is
    /// accepted verbatim as the canonical form.
    pub fn parse(&self, input: &str) -> Result<Location, LocationParseError> {
        use LocationValidationResult::*;

        if input.is_empty() || input.chars().all(char::is_whitespace) {
            return Err(LocationParseError::new(
                NullOrWhiteSpace,
                "Invalid location: contains only whitespace",
            ));
        }

        let chars: Vec<char> = input.chars().collect();
        let mut prev_digit_index: Option<usize> = None;
        let mut digit_start: Option<usize> = None;
        let mut chars_start: Option<usize> = None;
        let mut seen_groups: [Option<char>; 4] = [None; 4];

        for (i, ch) in chars.iter().copied().enumerate() {
            if ch.is_ascii_digit() {
                if digit_start.is_none() && i != 0 {
                    return Err(LocationParseError::new(
                        Invalid,
                        format!(
                            "Invalid location: numeric location should start before location \
                             code(s) in location: '{input}'"
                        ),
                    ));
                }
                if let Some(prev) = prev_digit_index {
                    if prev != i - 1 {
                        return Err(LocationParseError::new(
                            Invalid,
                            format!(
                                "Invalid location: cannot have multiple separated digits in \
                                 location: '{input}'"
                            ),
                        ));
                    }
                }
                if digit_start.is_none() {
                    digit_start = Some(i);
                }
                prev_digit_index = Some(i);
                continue;
            }

            let Some(group) = self.group_of(ch) else {
                if !self.location_codes.contains(&ch) {
                    let invalid: Vec<String> = chars
                        .iter()
                        .copied()
                        .filter(|&c| {
                            !c.is_ascii_digit()
                                && (c == 'N' || !self.location_codes.contains(&c))
                        })
                        .map(|c| format!("'{c}'"))
                        .collect();
                    return Err(LocationParseError::new(
                        InvalidCode,
                        format!(
                            "Invalid location code: '{input}' with invalid location code(s): {}",
                            invalid.join(",")
                        ),
                    ));
                }
                // groupless letter (H or V): no slot or order constraint
                if chars_start.is_none() {
                    chars_start = Some(i);
                }
                continue;
            };

            let slot = group.slot().unwrap_or(0);
            if let Some(existing) = seen_groups[slot] {
                return Err(LocationParseError::new(
                    Invalid,
                    format!(
                        "Invalid location: Multiple '{}' values. Got both '{existing}' and \
                         '{ch}' in '{input}'",
                        group.name()
                    ),
                ));
            }
            seen_groups[slot] = Some(ch);

            if chars_start.is_some() && i > 0 {
                let prev_ch = chars[i - 1];
                if !prev_ch.is_ascii_digit() && ch < prev_ch {
                    return Err(LocationParseError::new(
                        InvalidOrder,
                        format!("Invalid location: '{input}' not alphabetically sorted"),
                    ));
                }
            }
            if chars_start.is_none() {
                chars_start = Some(i);
            }
        }

        Ok(Location::new(input))
    }

    /// Parse variant that records the failure into an error accumulator.
    pub fn parse_with_errors(
        &self,
        input: &str,
        errors: &mut ParsingErrors,
    ) -> Option<Location> {
        match self.parse(input) {
            Ok(location) => Some(location),
            Err(err) => {
                errors.push(err.kind().as_str(), err.message());
                None
            }
        }
    }
}
