use thiserror::Error;
use vista_types::VisVersion;

use crate::schema::codebooks::CodebooksDto;
use crate::schema::gmod::GmodDto;
use crate::schema::locations::LocationsDto;
use crate::schema::versioning::GmodVersioningMapDto;

/// Errors raised while decoding an embedded reference-data payload.
///
/// These are fatal: a payload that fails to decode means the build itself
/// shipped broken data.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to decode {kind} payload for VIS version {version}: {source}")]
    Decode {
        kind: &'static str,
        version: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

macro_rules! versioned_payload {
    ($version:expr, $prefix:literal) => {
        match $version {
            VisVersion::V3_4a => include_str!(concat!("../resources/", $prefix, "-vis-3-4a.json")),
            VisVersion::V3_5a => include_str!(concat!("../resources/", $prefix, "-vis-3-5a.json")),
            VisVersion::V3_6a => include_str!(concat!("../resources/", $prefix, "-vis-3-6a.json")),
            VisVersion::V3_7a => include_str!(concat!("../resources/", $prefix, "-vis-3-7a.json")),
            VisVersion::V3_8a => include_str!(concat!("../resources/", $prefix, "-vis-3-8a.json")),
            VisVersion::V3_9a => include_str!(concat!("../resources/", $prefix, "-vis-3-9a.json")),
        }
    };
}

fn decode<T: serde::de::DeserializeOwned>(
    payload: &'static str,
    kind: &'static str,
    version: &'static str,
) -> Result<T, ResourceError> {
    serde_json::from_str(payload).map_err(|source| ResourceError::Decode {
        kind,
        version,
        source,
    })
}

/// Decodes the GMOD payload for one VIS version.
pub fn gmod_dto(version: VisVersion) -> Result<GmodDto, ResourceError> {
    decode(versioned_payload!(version, "gmod"), "gmod", version.as_str())
}

/// Decodes the codebooks payload for one VIS version.
pub fn codebooks_dto(version: VisVersion) -> Result<CodebooksDto, ResourceError> {
    decode(
        versioned_payload!(version, "codebooks"),
        "codebooks",
        version.as_str(),
    )
}

/// Decodes the locations payload for one VIS version.
pub fn locations_dto(version: VisVersion) -> Result<LocationsDto, ResourceError> {
    decode(
        versioned_payload!(version, "locations"),
        "locations",
        version.as_str(),
    )
}

/// Decodes the versioning payload: one conversion table per target version.
pub fn versioning_dto() -> Result<GmodVersioningMapDto, ResourceError> {
    decode(
        include_str!("../resources/gmod-versioning.json"),
        "gmod-versioning",
        "all",
    )
}
