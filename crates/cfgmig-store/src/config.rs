//! Store client configuration
//!
//! An explicit, immutable value handed to [`crate::HttpConfigStore::new`].
//! Can be read from a TOML file:
//!
//! ```toml
//! address = "https://onos-config:5150"
//! timeout_secs = 30
//!
//! [tls]
//! ca_cert = "/etc/cfgmig/certs/ca.crt"
//! client_cert = "/etc/cfgmig/certs/client.crt"
//! client_key = "/etc/cfgmig/certs/client.key"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default gNMI gateway address
pub const DEFAULT_ADDRESS: &str = "https://onos-config:5150";

/// Connection settings for a configuration store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the gateway
    pub address: String,
    /// Client-certificate authentication
    pub tls: TlsConfig,
    /// Per-request transport timeout
    pub timeout_secs: Option<u64>,
}

impl StoreConfig {
    /// Create config for an address with default TLS settings
    #[inline]
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// With TLS settings
    #[inline]
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// With transport timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on invalid TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Transport timeout, if set
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check the settings are usable
    ///
    /// # Errors
    /// - empty address or address without `http://` / `https://`
    /// - zero timeout
    /// - invalid TLS settings (see [`TlsConfig::validate`])
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("store address is empty".to_string()));
        }
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "store address must start with http:// or https://: {}",
                self.address
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        self.tls.validate()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            tls: TlsConfig::default(),
            timeout_secs: None,
        }
    }
}

/// Client-certificate settings
///
/// With `disabled` set, no credentials are loaded and the certificate paths
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsConfig {
    /// PEM bundle of CA certificates to trust
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate
    pub client_cert: Option<PathBuf>,
    /// PEM private key of the client certificate
    pub client_key: Option<PathBuf>,
    /// Skip credential loading
    pub disabled: bool,
}

impl TlsConfig {
    /// No client-certificate authentication
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Check certificate and key are configured together
    ///
    /// # Errors
    /// Returns error if only one of `client_cert` / `client_key` is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.disabled {
            return Ok(());
        }
        match (&self.client_cert, &self.client_key) {
            (Some(_), None) => Err(ConfigError::Invalid(
                "client_cert is set but client_key is missing".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::Invalid(
                "client_key is set but client_cert is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Read the CA bundle, if configured and enabled
    ///
    /// # Errors
    /// Returns error if the file cannot be read
    pub fn read_ca(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        if self.disabled {
            return Ok(None);
        }
        self.ca_cert.as_deref().map(read_pem).transpose()
    }

    /// Read certificate and key as one PEM identity, if configured and enabled
    ///
    /// # Errors
    /// Returns error if either file cannot be read
    pub fn read_identity(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        if self.disabled {
            return Ok(None);
        }
        let (Some(cert), Some(key)) = (&self.client_cert, &self.client_key) else {
            return Ok(None);
        };
        let mut identity = read_pem(cert)?;
        if !identity.ends_with(b"\n") {
            identity.push(b'\n');
        }
        identity.extend(read_pem(key)?);
        Ok(Some(identity))
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be parsed
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings are inconsistent
    #[error("{0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert!(config.validate().is_ok());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn parse_full_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            address = "https://gw:8443"
            timeout_secs = 15

            [tls]
            ca_cert = "/certs/ca.crt"
            client_cert = "/certs/c.crt"
            client_key = "/certs/c.key"
            "#,
        )
        .unwrap();

        assert_eq!(config.address, "https://gw:8443");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.tls.ca_cert, Some(PathBuf::from("/certs/ca.crt")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml_uses_defaults() {
        let config = StoreConfig::from_toml_str("[tls]\ndisabled = true\n").unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert!(config.tls.disabled);
    }

    #[test]
    fn unknown_key_rejected() {
        let result = StoreConfig::from_toml_str("adress = \"typo\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn bad_address_rejected() {
        assert!(StoreConfig::new("").validate().is_err());
        assert!(StoreConfig::new("onos-config:5150").validate().is_err());
        assert!(StoreConfig::new("http://onos-config:5150").validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = StoreConfig::default().with_timeout_secs(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn cert_without_key_rejected() {
        let tls = TlsConfig {
            client_cert: Some(PathBuf::from("c.crt")),
            ..TlsConfig::default()
        };
        assert!(tls.validate().is_err());
        assert!(TlsConfig {
            disabled: true,
            ..tls
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn disabled_tls_reads_nothing() {
        let tls = TlsConfig {
            ca_cert: Some(PathBuf::from("/does/not/exist")),
            disabled: true,
            ..TlsConfig::default()
        };
        assert!(tls.read_ca().unwrap().is_none());
        assert!(tls.read_identity().unwrap().is_none());
    }

    #[test]
    fn missing_ca_file_is_io_error() {
        let tls = TlsConfig {
            ca_cert: Some(PathBuf::from("/does/not/exist/ca.crt")),
            ..TlsConfig::default()
        };
        assert!(matches!(tls.read_ca(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn identity_concatenates_cert_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("c.crt");
        let key = dir.path().join("c.key");
        std::fs::File::create(&cert).unwrap().write_all(b"CERT").unwrap();
        std::fs::File::create(&key).unwrap().write_all(b"KEY\n").unwrap();

        let tls = TlsConfig {
            client_cert: Some(cert),
            client_key: Some(key),
            ..TlsConfig::default()
        };
        assert_eq!(tls.read_identity().unwrap().unwrap(), b"CERT\nKEY\n".to_vec());
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "address = \"http://localhost:5150\"\n").unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        assert_eq!(config.address, "http://localhost:5150");

        let missing = StoreConfig::from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
