//! cfgmig Identifier Primitives
//!
//! Helpers every schema transform leans on when entity naming changes:
//!
//! - [`is_valid_identifier`] / [`convert_identifier`]: the restricted id
//!   grammar of newer schemas and the rewrite into it
//! - [`merge_ranges`]: folding of adjacent labeled identifier ranges
//!   (e.g. IMSI blocks) with the labels they supersede

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod identifier;
pub mod interval;

pub use identifier::{convert_identifier, is_valid_identifier, normalize_identifier, IdentifierError};
pub use interval::{merge_ranges, Interval, MergeOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
