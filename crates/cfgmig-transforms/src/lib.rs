//! cfgmig Transforms
//!
//! Schema-pair transforms of the aether configuration model, each an
//! implementation of [`cfgmig_core::MigrationFunction`] wrapped in a
//! registrable step.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod device_group;

pub use device_group::DeviceGroupMigration;

use cfgmig_core::MigrationStep;

/// Steps shipped with the workspace, in lineage order
#[must_use]
pub fn default_steps() -> Vec<MigrationStep> {
    vec![DeviceGroupMigration::step()]
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_steps_form_a_lineage() {
        let steps = default_steps();
        assert!(!steps.is_empty());
        for pair in steps.windows(2) {
            assert_eq!(pair[0].to_version(), pair[1].from_version());
        }
    }
}
