//! cfgmig Path Codec
//!
//! Structured addressing into configuration trees and typed update records.
//!
//! # Core Concepts
//!
//! - [`Path`] / [`PathElem`]: hierarchical address with per-level keys
//! - [`TypedValue`]: tagged scalar written to a leaf
//! - [`Update`]: path + value
//! - [`build_update`]: constructor that yields nothing for an absent value
//!
//! # Example
//!
//! ```rust
//! use cfgmig_path::{build_update, Path};
//!
//! let path = Path::parse("/device-group[id=dg1]/display-name");
//! assert_eq!(path.len(), 2);
//!
//! let missing: Option<String> = None;
//! assert!(build_update(&path, missing).is_none());
//! assert!(build_update(&path, Some("Cameras")).is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod path;
mod update;
mod value;

pub use path::{Path, PathElem};
pub use update::{build_update, build_update_at, Update, UpdateSet};
pub use value::TypedValue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
