//! Subcommand implementations

use crate::settings::StoreFlags;
use anyhow::{Context, Result};
use cfgmig_core::{MigrationReport, MigrationStep, Migrator, SchemaVersion};
use cfgmig_store::{ConfigStore, HttpConfigStore};
use clap::ArgMatches;
use std::sync::Arc;

/// Endpoints of a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateRequest {
    pub from_target: String,
    pub to_target: String,
    pub from_version: SchemaVersion,
    pub to_version: SchemaVersion,
}

impl MigrateRequest {
    /// Read from the `migrate` subcommand
    ///
    /// # Errors
    /// Returns error if a required argument is missing
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let (from_version, to_version) = versions(args)?;
        Ok(Self {
            from_target: required(args, "from-target")?,
            to_target: required(args, "to-target")?,
            from_version,
            to_version,
        })
    }
}

fn required(args: &ArgMatches, name: &str) -> Result<String> {
    args.get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing --{name}"))
}

fn versions(args: &ArgMatches) -> Result<(SchemaVersion, SchemaVersion)> {
    Ok((
        required(args, "from-version")?.into(),
        required(args, "to-version")?.into(),
    ))
}

/// Run a migration against `store`
///
/// # Errors
/// Returns the first migration error
pub async fn migrate(
    store: Arc<dyn ConfigStore>,
    steps: Vec<MigrationStep>,
    request: &MigrateRequest,
) -> Result<MigrationReport> {
    let migrator = Migrator::with_steps(store, steps);
    migrator
        .migrate(
            &request.from_target,
            &request.from_version,
            &request.to_target,
            &request.to_version,
        )
        .await
        .with_context(|| {
            format!(
                "migration of '{}' ({}) to '{}' ({}) failed",
                request.from_target, request.from_version, request.to_target, request.to_version
            )
        })
}

/// One line per step, in registration order
#[must_use]
pub fn step_lines(steps: &[MigrationStep]) -> Vec<String> {
    steps
        .iter()
        .map(|step| format!("{step}  {}", step.transform().describe()))
        .collect()
}

/// One line per resolved step
///
/// # Errors
/// Returns error if the versions are not connected
pub fn chain_lines(steps: &[MigrationStep], from: &SchemaVersion, to: &SchemaVersion) -> Result<Vec<String>> {
    let chain = cfgmig_core::resolve_chain(steps, from, to)?;
    Ok(chain
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect())
}

/// `cfgmig migrate`
///
/// # Errors
/// Returns error on invalid settings or a failed migration
pub async fn run_migrate(args: &ArgMatches) -> Result<()> {
    let request = MigrateRequest::from_matches(args)?;
    let config = StoreFlags::from_matches(args).resolve()?;
    let store = HttpConfigStore::new(&config).context("failed to create store client")?;

    let report = migrate(Arc::new(store), cfgmig_transforms::default_steps(), &request).await?;
    if report.is_noop() {
        println!("Nothing to migrate: both targets are at {}", request.from_version);
    } else {
        println!("Migrated '{}' -> '{}'", request.from_target, request.to_target);
        for (from, to) in &report.steps {
            println!("  {from} -> {to}");
        }
        println!(
            "  Set calls: {}, updates: {}, deletes: {}",
            report.set_calls, report.updates, report.deletes
        );
    }
    Ok(())
}

/// `cfgmig steps`
pub fn run_steps() {
    for line in step_lines(&cfgmig_transforms::default_steps()) {
        println!("{line}");
    }
}

/// `cfgmig chain`
///
/// # Errors
/// Returns error if the versions are not connected
pub fn run_chain(args: &ArgMatches) -> Result<()> {
    let (from, to) = versions(args)?;
    let lines = chain_lines(&cfgmig_transforms::default_steps(), &from, &to)?;
    if lines.is_empty() {
        println!("No steps needed: {from} -> {to}");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgmig_test_utils::aether_store;
    use pretty_assertions::assert_eq;

    fn request(from: &str, to: &str) -> MigrateRequest {
        MigrateRequest {
            from_target: "v2".to_string(),
            to_target: "v21".to_string(),
            from_version: from.into(),
            to_version: to.into(),
        }
    }

    #[tokio::test]
    async fn migrate_with_default_steps() {
        let store = aether_store();
        let report = migrate(store.clone(), cfgmig_transforms::default_steps(), &request("2.0.0", "2.1.0"))
            .await
            .unwrap();

        assert_eq!(report.steps.len(), 1);
        assert!(store.tree("v21").unwrap()["device-group"].is_array());
    }

    #[tokio::test]
    async fn migrate_error_carries_context() {
        let store = aether_store();
        let err = migrate(store, cfgmig_transforms::default_steps(), &request("2.0.0", "9.0.0"))
            .await
            .unwrap_err();

        let text = format!("{err:#}");
        assert!(text.contains("'v2'"));
        assert!(text.contains("9.0.0"));
    }

    #[test]
    fn lists_steps() {
        let lines = step_lines(&cfgmig_transforms::default_steps());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("aether@2.0.0 -> aether@2.1.0"));
    }

    #[test]
    fn chain_lines_numbered() {
        let steps = cfgmig_transforms::default_steps();
        let lines = chain_lines(&steps, &"2.0.0".into(), &"2.1.0".into()).unwrap();
        assert_eq!(lines, vec!["1. aether@2.0.0 -> aether@2.1.0".to_string()]);

        assert!(chain_lines(&steps, &"2.1.0".into(), &"2.1.0".into()).unwrap().is_empty());
        assert!(chain_lines(&steps, &"1.0.0".into(), &"2.1.0".into()).is_err());
    }

    #[test]
    fn request_from_matches() {
        let matches = crate::cli::command()
            .try_get_matches_from([
                "cfgmig",
                "migrate",
                "--from-target",
                "v2",
                "--to-target",
                "v21",
                "--from-version",
                "2.0.0",
                "--to-version",
                "2.1.0",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        assert_eq!(MigrateRequest::from_matches(args).unwrap(), request("2.0.0", "2.1.0"));
    }
}
