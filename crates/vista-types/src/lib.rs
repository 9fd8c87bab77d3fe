//! Shared VIS primitive value types.
//!
//! This crate defines the core value types used across the VIS reference-data
//! layer and the identifier parsers. It has zero external dependencies.
//!
//! # Types
//!
//! - [`VisVersion`] — ordered VIS release tag (`3-4a` … `3-9a`)
//! - [`CodebookName`] — metadata codebook identifiers and their tag prefixes
//! - [`MetadataTag`] — one typed LocalId metadata tag
//! - [`TraversalControl`] — traversal flow control (Continue / SkipSubtree / Stop)
//! - [`ParsingErrors`] — accumulated (state, message) parse error report
//! - [`ImoNumber`], [`ShipId`] — vessel identifiers

mod codebook_name;
mod control;
mod imo;
mod metadata_tag;
mod parsing_errors;
mod vis_version;

pub use codebook_name::{CodebookName, ParseCodebookNameError};
pub use control::TraversalControl;
pub use imo::{ImoNumber, ParseImoNumberError, ShipId};
pub use metadata_tag::MetadataTag;
pub use parsing_errors::ParsingErrors;
pub use vis_version::{ParseVisVersionError, VisVersion};
