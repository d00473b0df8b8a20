//! Store settings from an optional TOML file, overridden by flags

use anyhow::{Context, Result};
use cfgmig_store::StoreConfig;
use clap::ArgMatches;
use std::path::{Path, PathBuf};

/// Store settings given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFlags {
    pub config: Option<PathBuf>,
    pub address: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub no_tls: bool,
    pub timeout_secs: Option<u64>,
}

impl StoreFlags {
    /// Read flags of the `migrate` subcommand
    #[must_use]
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            config: args.get_one::<PathBuf>("config").cloned(),
            address: args.get_one::<String>("address").cloned(),
            ca_cert: args.get_one::<PathBuf>("ca-cert").cloned(),
            client_cert: args.get_one::<PathBuf>("client-cert").cloned(),
            client_key: args.get_one::<PathBuf>("client-key").cloned(),
            no_tls: args.get_flag("no-tls"),
            timeout_secs: args.get_one::<u64>("timeout-secs").copied(),
        }
    }

    /// Apply set flags on top of `base`
    #[must_use]
    pub fn overlay(&self, mut base: StoreConfig) -> StoreConfig {
        if let Some(address) = &self.address {
            base.address.clone_from(address);
        }
        if let Some(path) = &self.ca_cert {
            base.tls.ca_cert = Some(path.clone());
        }
        if let (Some(cert), Some(key)) = (&self.client_cert, &self.client_key) {
            base.tls.client_cert = Some(cert.clone());
            base.tls.client_key = Some(key.clone());
        }
        if self.no_tls {
            base.tls.disabled = true;
        }
        if let Some(secs) = self.timeout_secs {
            base.timeout_secs = Some(secs);
        }
        base
    }

    /// Resolve the final store settings
    ///
    /// # Errors
    /// Returns error if the config file cannot be read or the merged
    /// settings are invalid
    pub fn resolve(&self) -> Result<StoreConfig> {
        let base = match &self.config {
            Some(path) => load(path)?,
            None => StoreConfig::default(),
        };
        let config = self.overlay(base);
        config.validate().context("invalid store settings")?;
        Ok(config)
    }
}

fn load(path: &Path) -> Result<StoreConfig> {
    let config = StoreConfig::from_file(path)
        .with_context(|| format!("failed to load store settings from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded store settings");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgmig_store::DEFAULT_ADDRESS;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("cfgmig.toml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let config = StoreFlags::default().resolve().unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            address = "https://file:5150"
            timeout_secs = 10

            [tls]
            ca_cert = "/file/ca.crt"
            "#,
        );
        let flags = StoreFlags {
            config: Some(path),
            address: Some("https://flag:5150".to_string()),
            timeout_secs: Some(3),
            ..StoreFlags::default()
        };

        let config = flags.resolve().unwrap();
        assert_eq!(config.address, "https://flag:5150");
        assert_eq!(config.timeout_secs, Some(3));
        assert_eq!(config.tls.ca_cert, Some(PathBuf::from("/file/ca.crt")));
    }

    #[test]
    fn no_tls_flag_disables_file_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[tls]\nclient_cert = \"/c.crt\"\nclient_key = \"/c.key\"\n",
        );
        let flags = StoreFlags {
            config: Some(path),
            no_tls: true,
            ..StoreFlags::default()
        };

        let config = flags.resolve().unwrap();
        assert!(config.tls.disabled);
        assert_eq!(config.tls.client_cert, Some(PathBuf::from("/c.crt")));
    }

    #[test]
    fn invalid_merged_settings_rejected() {
        let flags = StoreFlags {
            address: Some("gateway:5150".to_string()),
            ..StoreFlags::default()
        };
        let err = flags.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("http"));
    }

    #[test]
    fn missing_file_names_path() {
        let flags = StoreFlags {
            config: Some(PathBuf::from("/does/not/exist.toml")),
            ..StoreFlags::default()
        };
        let err = flags.resolve().unwrap_err();
        assert!(err.to_string().contains("/does/not/exist.toml"));
    }

    #[test]
    fn from_matches_reads_flags() {
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
                "--address",
                "http://localhost:5150",
                "--no-tls",
                "--timeout-secs",
                "7",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let flags = StoreFlags::from_matches(args);
        assert_eq!(
            flags,
            StoreFlags {
                address: Some("http://localhost:5150".to_string()),
                no_tls: true,
                timeout_secs: Some(7),
                ..StoreFlags::default()
            }
        );
    }
}
