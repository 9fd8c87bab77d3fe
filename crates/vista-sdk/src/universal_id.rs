use std::fmt;
use std::str::FromStr;

use vista_types::{ImoNumber, ParsingErrors, VisVersion};

use crate::error::UniversalIdError;
use crate::local_id::{LocalId, LocalIdBuilder};
use crate::local_id_parse::LocalIdParsingState;

/// The naming entity every UniversalId string starts with.
pub const NAMING_ENTITY: &str = "data.dnv.com";

/// Immutable fluent builder for [`UniversalId`] values.
#[derive(Debug, Clone, Default)]
pub struct UniversalIdBuilder {
    imo_number: Option<ImoNumber>,
    local_id: Option<LocalIdBuilder>,
}

impl UniversalIdBuilder {
    /// Starts a builder whose LocalId targets one VIS version.
    pub fn create(vis_version: VisVersion) -> Self {
        Self {
            imo_number: None,
            local_id: Some(LocalIdBuilder::create(vis_version)),
        }
    }

    pub fn imo_number(&self) -> Option<&ImoNumber> {
        self.imo_number.as_ref()
    }

    pub fn local_id(&self) -> Option<&LocalIdBuilder> {
        self.local_id.as_ref()
    }

    pub fn with_imo_number(mut self, imo_number: ImoNumber) -> Self {
        self.imo_number = Some(imo_number);
        self
    }

    pub fn without_imo_number(mut self) -> Self {
        self.imo_number = None;
        self
    }

    pub fn with_local_id(mut self, local_id: LocalIdBuilder) -> Self {
        self.local_id = Some(local_id);
        self
    }

    pub fn without_local_id(mut self) -> Self {
        self.local_id = None;
        self
    }

    /// Whether [`UniversalIdBuilder::build`] would succeed.
    pub fn is_valid(&self) -> bool {
        self.imo_number.is_some() && self.local_id.as_ref().is_some_and(|l| l.is_valid())
    }

    pub fn build(self) -> Result<UniversalId, UniversalIdError> {
        let Some(imo_number) = self.imo_number else {
            return Err(UniversalIdError::MissingImoNumber);
        };
        let Some(local_id) = self.local_id else {
            return Err(UniversalIdError::MissingLocalId);
        };
        Ok(UniversalId {
            imo_number,
            local_id: local_id.build()?,
        })
    }
}

/// A LocalId scoped to one vessel by its IMO number — globally unique
/// across the fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct UniversalId {
    imo_number: ImoNumber,
    local_id: LocalId,
}

impl UniversalId {
    pub fn new(imo_number: ImoNumber, local_id: LocalId) -> Self {
        Self {
            imo_number,
            local_id,
        }
    }

    pub fn imo_number(&self) -> &ImoNumber {
        &self.imo_number
    }

    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    /// Parses the `data.dnv.com/IMO…/dnv-v2/…` wire form.
    pub fn parse(input: &str) -> Result<UniversalId, UniversalIdError> {
        let mut errors = ParsingErrors::new();
        Self::parse_with_errors(input, &mut errors).ok_or(UniversalIdError::Parse(errors))
    }

    /// Parse variant that records every problem found into `errors`.
    pub fn parse_with_errors(input: &str, errors: &mut ParsingErrors) -> Option<UniversalId> {
        let Some(local_id_start) = input.find("/dnv-v") else {
            errors.push(
                LocalIdParsingState::NamingRule.as_str(),
                "Missing local id naming rule segment",
            );
            return None;
        };

        let universal_part = &input[..local_id_start];
        let local_id_part = &input[local_id_start..];

        let mut segments = universal_part.split('/');
        let naming_entity = segments.next().unwrap_or("");
        if naming_entity != NAMING_ENTITY {
            errors.push(
                LocalIdParsingState::NamingEntity.as_str(),
                format!("Invalid naming entity, expected '{NAMING_ENTITY}', got '{naming_entity}'"),
            );
            return None;
        }

        let imo_segment = segments.next().unwrap_or("");
        let Ok(imo_number) = ImoNumber::from_str(imo_segment) else {
            errors.push(
                LocalIdParsingState::ImoNumber.as_str(),
                format!("Invalid IMO number segment: '{imo_segment}'"),
            );
            return None;
        };

        let local_id = LocalId::parse_with_errors(local_id_part, errors)?;
        Some(UniversalId {
            imo_number,
            local_id,
        })
    }
}

impl fmt::Display for UniversalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NAMING_ENTITY}/{}{}", self.imo_number, self.local_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str =
        "data.dnv.com/IMO9074729/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature";

    #[test]
    fn test_parse_and_round_trip() {
        let universal_id = UniversalId::parse(EXAMPLE).unwrap();
        assert_eq!(universal_id.imo_number().value(), 9074729);
        assert_eq!(
            universal_id.local_id().primary_item().to_string(),
            "411.1/C101.31-2"
        );
        assert_eq!(universal_id.to_string(), EXAMPLE);
    }

    #[test]
    fn test_parse_rejects_bad_naming_entity() {
        let mut errors = ParsingErrors::new();
        let input = "data.dnv.org/IMO9074729/dnv-v2/vis-3-4a/411.1/meta/qty-temperature";
        assert!(UniversalId::parse_with_errors(input, &mut errors).is_none());
        assert!(errors.to_string().contains("NamingEntity"));
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let mut errors = ParsingErrors::new();
        let input = "data.dnv.com/IMO9999999/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature";
        assert!(UniversalId::parse_with_errors(input, &mut errors).is_none());
        assert!(errors.to_string().contains("IMONumber"));
    }

    #[test]
    fn test_parse_requires_local_id_segment() {
        let mut errors = ParsingErrors::new();
        assert!(UniversalId::parse_with_errors("data.dnv.com/IMO9074729", &mut errors).is_none());
        assert!(errors.has_errors());
    }

    #[test]
    fn test_builder() {
        let local_id = LocalId::parse("/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature")
            .unwrap();
        let imo = ImoNumber::new(9074729).unwrap();

        let universal_id = UniversalIdBuilder::default()
            .with_imo_number(imo)
            .with_local_id(local_id.builder().clone())
            .build()
            .unwrap();
        assert_eq!(universal_id.to_string(), EXAMPLE);

        assert!(matches!(
            UniversalIdBuilder::default().build(),
            Err(UniversalIdError::MissingImoNumber)
        ));
        assert!(matches!(
            UniversalIdBuilder::default().with_imo_number(imo).build(),
            Err(UniversalIdError::MissingLocalId)
        ));
    }

    #[test]
    fn test_builder_validity() {
        let builder = UniversalIdBuilder::create(VisVersion::V3_4a);
        assert!(!builder.is_valid());
        assert!(builder.local_id().is_some());
        assert!(builder.imo_number().is_none());
    }
}
