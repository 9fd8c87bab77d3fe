use thiserror::Error;
use vista_types::{CodebookName, ParsingErrors, VisVersion};

/// Errors raised while loading or assembling reference data.
#[derive(Debug, Error)]
pub enum VisError {
    /// An embedded payload failed to decode.
    #[error(transparent)]
    Resource(#[from] vista_resources::ResourceError),

    /// A payload decoded but violates a structural expectation
    /// (missing root node, unknown codebook name, unsupported location
    /// code, unknown conversion operation).
    #[error("invalid reference data: {0}")]
    InvalidData(String),
}

/// Errors raised while building or parsing a [`GmodPath`](crate::GmodPath).
///
/// The display strings double as the messages surfaced through
/// [`ParsingErrors`] reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GmodPathError {
    #[error("Item is empty")]
    Empty,

    #[error("Got different VIS versions for Gmod and Locations arguments")]
    VersionMismatch,

    #[error("Failed to get GmodNode for {0}")]
    NodeNotFound(String),

    #[error("Failed to parse location {0}")]
    InvalidLocation(String),

    #[error("Failed find any parts")]
    NoParts,

    #[error("Failed to find path after traversal")]
    NotFound,

    #[error("Path must start with '{0}'")]
    MissingRoot(String),

    #[error("Sequence of nodes are invalid")]
    InvalidSequence,

    #[error("Invalid gmod path - no parents, and {0} is not the root of gmod")]
    MissingParents(String),

    #[error("Invalid gmod path - first parent should be root of gmod (VE), but was {0}")]
    FirstParentNotRoot(String),

    #[error("Invalid gmod path - {child} not child of {parent}")]
    NotChild { parent: String, child: String },

    #[error("Mapping error: different locations in the same nodeset")]
    DifferentLocationsInSet,

    #[error("Can't skip in the middle of individualizable set")]
    SkippedInSet,

    #[error("Expected all nodes in the set to be individualized the same")]
    InconsistentSetLocations,

    #[error("Expected all nodes in the set to be without individualization")]
    UnexpectedIndividualization,

    #[error("Individualizable set must have at least one node")]
    EmptySet,

    #[error("Individualizable set has no nodes that are part of the short path")]
    SetWithoutLeaf,
}

/// Errors raised while converting identifiers between VIS versions.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("source version {source_version} is newer than target version {target}")]
    InvalidVersionPair {
        source_version: VisVersion,
        target: VisVersion,
    },

    #[error("could not convert node {code} forward to VIS version {version}")]
    NodeNotConvertible { code: String, version: VisVersion },

    #[error("cannot convert a local id without a VIS version")]
    MissingVisVersion,

    #[error("tried to remove the last asset function node")]
    RemovedLastAssetFunction,

    #[error("normal assignment end node was deleted")]
    AssignmentEndNodeDeleted,

    #[error("path reconstruction resulted in an empty path")]
    EmptyPath,

    #[error("did not end up with a valid path")]
    InvalidTargetPath,

    #[error(transparent)]
    Vis(#[from] VisError),

    #[error(transparent)]
    LocalId(#[from] LocalIdError),
}

/// Errors raised while building or parsing a [`LocalId`](crate::LocalId).
#[derive(Debug, Error)]
pub enum LocalIdError {
    /// Only the eight content-group codebooks may appear in a LocalId.
    #[error("codebook {0} cannot be used as a LocalId metadata tag")]
    UnsupportedCodebook(CodebookName),

    #[error("cannot build LocalId: VIS version, primary item, and at least one metadata tag are required")]
    Incomplete,

    #[error("failed to parse LocalId:\n{0}")]
    Parse(ParsingErrors),
}

/// Errors raised while building or parsing a
/// [`UniversalId`](crate::UniversalId).
#[derive(Debug, Error)]
pub enum UniversalIdError {
    #[error("invalid Universal Id state: Missing IMO Number")]
    MissingImoNumber,

    #[error("invalid Universal Id state: Missing LocalId")]
    MissingLocalId,

    #[error(transparent)]
    LocalId(#[from] LocalIdError),

    #[error("failed to parse UniversalId:\n{0}")]
    Parse(ParsingErrors),
}
