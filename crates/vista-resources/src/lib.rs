//! Embedded VIS reference data and its serde schema types.
//!
//! For every supported VIS version this crate ships four JSON payloads —
//! the GMOD node set, the codebooks, the locations and (globally) the
//! per-step versioning tables — and exposes typed decoders for them.
//!
//! The payloads are opaque to the rest of the SDK: the only contract is
//! "given a version and a kind, return the decoded record". Decoding
//! failures are fatal to the caller.

mod embedded;
pub mod schema;

pub use embedded::{codebooks_dto, gmod_dto, locations_dto, versioning_dto, ResourceError};
