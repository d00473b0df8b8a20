//! cfgmig Migration Engine
//!
//! Moves the configuration tree of one target at one schema version into a
//! target at a later schema version:
//!
//! 1. [`resolve_chain`]: the registered steps between the two versions
//! 2. [`Migrator::run_step`]: Get both trees, run the step's [`MigrationFunction`]
//! 3. [`Migrator::execute_actions`]: Set updates on the destination, deletes on the source
//!
//! # Example
//! ```
//! use cfgmig_core::{MigrationActions, MigrationFunction, MigrationStep, Migrator, TransformError};
//! use cfgmig_store::{MemoryStore, Snapshot};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Nothing;
//!
//! impl MigrationFunction for Nothing {
//!     fn transform(
//!         &self,
//!         _step: &MigrationStep,
//!         _from_target: &str,
//!         _to_target: &str,
//!         _source: &Snapshot,
//!         _destination: &Snapshot,
//!     ) -> Result<Vec<MigrationActions>, TransformError> {
//!         Ok(Vec::new())
//!     }
//!
//!     fn describe(&self) -> String {
//!         "nothing".to_string()
//!     }
//! }
//!
//! let mut migrator = Migrator::new(Arc::new(MemoryStore::new()));
//! migrator.register(MigrationStep::between("1.0.0", "2.0.0", Nothing));
//! migrator.register(MigrationStep::between("2.0.0", "3.0.0", Nothing));
//!
//! let chain = migrator.resolve(&"1.0.0".into(), &"3.0.0".into()).unwrap();
//! assert_eq!(chain.len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod chain;
pub mod error;
pub mod migrator;
pub mod step;
pub mod version;

pub use chain::resolve_chain;
pub use error::{MigrationError, TransformError};
pub use migrator::{ApplyStats, MigrationReport, Migrator};
pub use step::{MigrationActions, MigrationFunction, MigrationStep};
pub use version::{SchemaBinding, SchemaVersion};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
