//! aether 2.0.0 -> 2.1.0: device groups
//!
//! 2.1.0 restricts entity ids to the lowercase identifier grammar and stores
//! each contiguous IMSI block once. Every device group of the source tree is
//! rewritten under its normalized id on the destination target, with
//! adjacent IMSI blocks folded together, and removed from the source target.

use cfgmig_core::{MigrationActions, MigrationFunction, MigrationStep, SchemaBinding, TransformError};
use cfgmig_ident::{merge_ranges, normalize_identifier, Interval};
use cfgmig_path::{Path, UpdateSet};
use cfgmig_store::Snapshot;
use serde::Deserialize;

/// Model name of the aether bindings
pub const MODEL: &str = "aether";

/// Version migrated from
pub const FROM_VERSION: &str = "2.0.0";

/// Version migrated to
pub const TO_VERSION: &str = "2.1.0";

const ENTITY: &str = "device-group";

#[derive(Debug, Default, Deserialize)]
struct DeviceTree {
    #[serde(rename = "device-group", default)]
    device_groups: Vec<DeviceGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeviceGroup {
    id: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    site: Option<String>,
    #[serde(default)]
    imsis: Vec<ImsiBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ImsiBlock {
    imsi_id: Option<String>,
    imsi_range_from: Option<u64>,
    imsi_range_to: Option<u64>,
}

impl ImsiBlock {
    /// Block as an interval; a block without an end holds a single IMSI
    fn interval(&self) -> Option<Interval> {
        let label = self.imsi_id.as_ref()?;
        let first = self.imsi_range_from?;
        let last = self.imsi_range_to.unwrap_or(first);
        (last >= first).then(|| Interval::new(first, last, label.clone()))
    }
}

fn group_path(id: &str) -> Path {
    Path::root().elem(ENTITY).key("id", id)
}

fn decode(snapshot: &Snapshot) -> Result<DeviceTree, TransformError> {
    snapshot
        .decode()
        .map_err(|source| TransformError::invalid_snapshot(snapshot.target(), source))
}

/// Device group transform of the aether 2.0.0 -> 2.1.0 step
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceGroupMigration;

impl DeviceGroupMigration {
    /// Binding of the source version
    #[must_use]
    pub fn from_binding() -> SchemaBinding {
        SchemaBinding::new(MODEL, FROM_VERSION)
            .with_module("onf-device-group")
            .with_module("onf-site")
    }

    /// Binding of the destination version
    #[must_use]
    pub fn to_binding() -> SchemaBinding {
        SchemaBinding::new(MODEL, TO_VERSION)
            .with_module("onf-device-group")
            .with_module("onf-site")
    }

    /// Registrable step running this transform
    #[must_use]
    pub fn step() -> MigrationStep {
        MigrationStep::new(Self::from_binding(), Self::to_binding(), Self)
    }

    /// Actions for one device group, `None` when the entity is skipped
    fn migrate_group(
        group: &DeviceGroup,
        in_place: bool,
        existing: &DeviceTree,
    ) -> Option<MigrationActions> {
        let Some(old_id) = group.id.as_deref() else {
            tracing::warn!(
                display_name = group.display_name.as_deref().unwrap_or_default(),
                "device group without id, skipping"
            );
            return None;
        };
        let new_id = match normalize_identifier(old_id) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(id = old_id, error = %err, "device group id cannot be normalized, skipping");
                return None;
            }
        };
        if existing
            .device_groups
            .iter()
            .any(|g| g.id.as_deref() == Some(new_id.as_str()))
        {
            tracing::debug!(id = %new_id, "device group already on destination, overwriting");
        }

        let originals: Vec<Interval> = group
            .imsis
            .iter()
            .filter_map(|block| {
                let interval = block.interval();
                if interval.is_none() {
                    tracing::warn!(group = old_id, imsi_id = ?block.imsi_id, "incomplete imsi block, skipping");
                }
                interval
            })
            .collect();
        let outcome = merge_ranges(&originals);
        if outcome.has_merges() {
            tracing::info!(
                group = %new_id,
                merged = outcome.changed(&originals).len(),
                superseded = ?outcome.superseded,
                "imsi blocks consolidated"
            );
        }

        let mut updates = UpdateSet::new();
        updates
            .push_at("/display-name", group.display_name.as_deref())
            .push_at("/description", group.description.as_deref())
            .push_at("/site", group.site.as_deref());
        for range in &outcome.merged {
            let block = Path::root().elem("imsis").key("imsi-id", range.label.as_str());
            updates
                .push(&block.clone().elem("imsi-range-from"), Some(range.first))
                .push(&block.elem("imsi-range-to"), Some(range.last));
        }

        // Rewriting in place under the same id must not delete the group
        // just written; only the absorbed blocks go.
        let deletes = if in_place && new_id == old_id {
            outcome
                .superseded
                .iter()
                .filter(|label| !outcome.merged.iter().any(|m| &m.label == *label))
                .map(|label| group_path(old_id).elem("imsis").key("imsi-id", label.as_str()))
                .collect()
        } else {
            vec![group_path(old_id)]
        };

        Some(
            MigrationActions::new()
                .with_updates(Some(group_path(&new_id)), updates.into_vec())
                .with_deletes(None, deletes),
        )
    }
}

impl MigrationFunction for DeviceGroupMigration {
    fn transform(
        &self,
        step: &MigrationStep,
        from_target: &str,
        to_target: &str,
        source: &Snapshot,
        destination: &Snapshot,
    ) -> Result<Vec<MigrationActions>, TransformError> {
        let tree = decode(source)?;
        let existing = decode(destination)?;
        if tree.device_groups.is_empty() {
            return Err(TransformError::no_entities(from_target, ENTITY));
        }

        let in_place = from_target == to_target;
        let actions: Vec<MigrationActions> = tree
            .device_groups
            .iter()
            .filter_map(|group| Self::migrate_group(group, in_place, &existing))
            .collect();

        tracing::info!(
            step = %step,
            groups = tree.device_groups.len(),
            migrated = actions.len(),
            "device groups migrated"
        );
        Ok(actions)
    }

    fn describe(&self) -> String {
        format!("{MODEL} device-group {FROM_VERSION} -> {TO_VERSION}")
    }
}
