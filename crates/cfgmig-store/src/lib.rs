//! cfgmig Store Client
//!
//! The [`ConfigStore`] seam through which the migrator reads and writes
//! configuration trees, with two implementations:
//!
//! - [`HttpConfigStore`]: gNMI Get/Set over a JSON gateway, TLS client certs
//! - [`MemoryStore`]: in-process trees with call recording and failure
//!   injection, for tests
//!
//! Connection settings are an explicit [`StoreConfig`] value; there are no
//! process-wide transport flags.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod http;
mod memory;
mod store;

pub use config::{ConfigError, StoreConfig, TlsConfig, DEFAULT_ADDRESS};
pub use error::StoreError;
pub use http::HttpConfigStore;
pub use memory::MemoryStore;
pub use store::{ConfigStore, SetRequest, SetResponse, Snapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
