use std::collections::HashMap;

use thiserror::Error;
use vista_types::VisVersion;

use crate::locations::{Location, LocationGroup, Locations};

/// Errors raised by [`LocationBuilder`] setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationBuilderError {
    #[error("The value {value} is an invalid {group} value")]
    InvalidValue { value: char, group: &'static str },

    #[error("Value should be greater than 0")]
    NonPositiveNumber,
}

/// Immutable fluent builder for [`Location`] values.
///
/// One slot per location group plus the numeric prefix; every setter
/// validates the character's group membership and returns a new builder.
/// `build` prints the canonical form: number first, letters sorted.
#[derive(Debug, Clone)]
pub struct LocationBuilder {
    version: VisVersion,
    number: Option<u32>,
    side: Option<char>,
    vertical: Option<char>,
    transverse: Option<char>,
    longitudinal: Option<char>,
    reversed_groups: HashMap<char, LocationGroup>,
}

impl LocationBuilder {
    /// Creates an empty builder bound to one version's location alphabet.
    pub fn create(locations: &Locations) -> Self {
        Self {
            version: locations.version(),
            number: None,
            side: None,
            vertical: None,
            transverse: None,
            longitudinal: None,
            reversed_groups: locations.reversed_groups().clone(),
        }
    }

    /// The VIS version whose alphabet this builder validates against.
    pub fn version(&self) -> VisVersion {
        self.version
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn side(&self) -> Option<char> {
        self.side
    }

    pub fn vertical(&self) -> Option<char> {
        self.vertical
    }

    pub fn transverse(&self) -> Option<char> {
        self.transverse
    }

    pub fn longitudinal(&self) -> Option<char> {
        self.longitudinal
    }

    /// Decomposes an existing location into the builder's slots.
    pub fn with_location(self, location: &Location) -> Result<Self, LocationBuilderError> {
        let mut builder = self;
        let mut number: Option<u32> = None;

        for ch in location.as_str().chars() {
            if let Some(digit) = ch.to_digit(10) {
                number = Some(match number {
                    None => digit,
                    Some(n) => n * 10 + digit,
                });
                continue;
            }
            builder = builder.with_code(ch)?;
        }

        if let Some(n) = number {
            builder = builder.with_number(n)?;
        }
        Ok(builder)
    }

    /// Sets the numeric prefix; must be at least 1.
    pub fn with_number(mut self, number: u32) -> Result<Self, LocationBuilderError> {
        if number < 1 {
            return Err(LocationBuilderError::NonPositiveNumber);
        }
        self.number = Some(number);
        Ok(self)
    }

    /// Routes a letter to the slot its group dictates.
    pub fn with_code(self, code: char) -> Result<Self, LocationBuilderError> {
        match self.reversed_groups.get(&code) {
            Some(LocationGroup::Side) => self.with_side(code),
            Some(LocationGroup::Vertical) => self.with_vertical(code),
            Some(LocationGroup::Transverse) => self.with_transverse(code),
            Some(LocationGroup::Longitudinal) => self.with_longitudinal(code),
            _ => Err(LocationBuilderError::InvalidValue {
                value: code,
                group: "Locations",
            }),
        }
    }

    pub fn with_side(mut self, side: char) -> Result<Self, LocationBuilderError> {
        self.require_group(side, LocationGroup::Side)?;
        self.side = Some(side);
        Ok(self)
    }

    pub fn with_vertical(mut self, vertical: char) -> Result<Self, LocationBuilderError> {
        self.require_group(vertical, LocationGroup::Vertical)?;
        self.vertical = Some(vertical);
        Ok(self)
    }

    pub fn with_transverse(mut self, transverse: char) -> Result<Self, LocationBuilderError> {
        self.require_group(transverse, LocationGroup::Transverse)?;
        self.transverse = Some(transverse);
        Ok(self)
    }

    pub fn with_longitudinal(mut self, longitudinal: char) -> Result<Self, LocationBuilderError> {
        self.require_group(longitudinal, LocationGroup::Longitudinal)?;
        self.longitudinal = Some(longitudinal);
        Ok(self)
    }

    /// Clears one slot.
    pub fn without_value(self, group: LocationGroup) -> Self {
        match group {
            LocationGroup::Number => self.without_number(),
            LocationGroup::Side => self.without_side(),
            LocationGroup::Vertical => self.without_vertical(),
            LocationGroup::Transverse => self.without_transverse(),
            LocationGroup::Longitudinal => self.without_longitudinal(),
        }
    }

    pub fn without_number(mut self) -> Self {
        self.number = None;
        self
    }

    pub fn without_side(mut self) -> Self {
        self.side = None;
        self
    }

    pub fn without_vertical(mut self) -> Self {
        self.vertical = None;
        self
    }

    pub fn without_transverse(mut self) -> Self {
        self.transverse = None;
        self
    }

    pub fn without_longitudinal(mut self) -> Self {
        self.longitudinal = None;
        self
    }

    /// Prints the canonical form: optional number, then sorted letters.
    pub fn build(&self) -> Location {
        let mut letters: Vec<char> = [self.side, self.vertical, self.transverse, self.longitudinal]
            .into_iter()
            .flatten()
            .collect();
        letters.sort_unstable();

        let mut value = String::new();
        if let Some(n) = self.number {
            value.push_str(&n.to_string());
        }
        value.extend(letters);
        Location::new(value)
    }

    fn require_group(
        &self,
        code: char,
        group: LocationGroup,
    ) -> Result<(), LocationBuilderError> {
        if self.reversed_groups.get(&code) == Some(&group) {
            Ok(())
        } else {
            Err(LocationBuilderError::InvalidValue {
                value: code,
                group: group.name(),
            })
        }
    }
}
