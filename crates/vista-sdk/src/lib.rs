//! Core library for DNV's Vessel Information Structure (VIS).
//!
//! VIS assigns globally unique, machine-parseable identifiers to every
//! sensor, signal and functional item aboard a ship. This crate loads the
//! versioned reference data (the Generic Product Model tree, the codebooks
//! and the locations set) and implements the three identifier types built
//! on top of it:
//!
//! - [`GmodPath`] — a rooted path through the GMOD tree, parseable from the
//!   sparse short form (`411.1/C101.31-2`) or the full form
//!   (`VE/400a/…/C101.31-2`)
//! - [`LocalId`] — the URI-like `/dnv-v2/vis-…/…/meta/…` identifier for one
//!   signal on one vessel
//! - [`UniversalId`] — a [`LocalId`] scoped to a vessel by IMO number
//!
//! # Entry point
//!
//! All reference data is reached through the [`Vis`] registry, which loads
//! each VIS version once and then shares it immutably:
//!
//! ```
//! use vista_sdk::{Vis, VisVersion};
//!
//! let vis = Vis::instance();
//! let gmod = vis.gmod(VisVersion::V3_4a).unwrap();
//! assert_eq!(gmod.root_node().code(), "VE");
//! ```
//!
//! Identifiers are immutable values; builders return new instances from
//! every `with_*` call. A loaded snapshot is safe to share across threads.

mod codebook;
mod codebooks;
mod error;
mod gmod;
mod gmod_node;
mod gmod_path;
mod local_id;
mod local_id_parse;
mod location_builder;
mod locations;
mod path_parse;
mod universal_id;
mod versioning;
mod vis;

pub use codebook::{Codebook, PositionValidationResult};
pub use codebooks::Codebooks;
pub use error::{ConversionError, GmodPathError, LocalIdError, UniversalIdError, VisError};
pub use gmod::{Gmod, NodeId, TraversalOptions};
pub use gmod_node::{
    is_product_selection_assignment, is_product_type_assignment, GmodNode, GmodNodeMetadata,
};
pub use gmod_path::{GmodIndividualizableSet, GmodPath, PathNode};
pub use local_id::{LocalId, LocalIdBuilder, NAMING_RULE};
pub use local_id_parse::LocalIdParsingState;
pub use location_builder::{LocationBuilder, LocationBuilderError};
pub use locations::{
    Location, LocationGroup, LocationParseError, LocationValidationResult, Locations,
    RelativeLocation,
};
pub use universal_id::{UniversalId, UniversalIdBuilder, NAMING_ENTITY};
pub use versioning::{ConversionType, GmodNodeConversion, GmodVersioning};
pub use vis::{is_iso_string, Vis};

// Re-export the shared primitive types so downstream users need only this
// crate.
pub use vista_types::{
    CodebookName, ImoNumber, MetadataTag, ParsingErrors, ShipId, TraversalControl, VisVersion,
};
