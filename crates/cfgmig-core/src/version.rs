//! Schema versions and the model bindings they are decoded with

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Opaque schema version label, e.g. `"2.1.0"`
///
/// Compared for equality only. Versions carry no ordering: the step list
/// alone decides which version follows which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Create version label
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Label text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl From<String> for SchemaVersion {
    fn from(version: String) -> Self {
        Self(version)
    }
}

impl PartialEq<str> for SchemaVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SchemaVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Model binding a snapshot of one schema version is decoded with
///
/// Descriptive only: the engine hands it to the transform and prints it,
/// it never interprets the module list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBinding {
    model: String,
    version: SchemaVersion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    modules: Vec<String>,
}

impl SchemaBinding {
    /// Create binding for a model at a version
    #[inline]
    #[must_use]
    pub fn new(model: impl Into<String>, version: impl Into<SchemaVersion>) -> Self {
        Self {
            model: model.into(),
            version: version.into(),
            modules: Vec::new(),
        }
    }

    /// Add a model module, returning the binding
    #[inline]
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Model name
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Schema version
    #[inline]
    #[must_use]
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// Model modules, in declaration order
    #[inline]
    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }
}

impl Display for SchemaBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.model.is_empty() {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}@{}", self.model, self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_equality_only() {
        let v = SchemaVersion::from("2.0.0");
        assert_eq!(v, "2.0.0");
        assert_ne!(v, SchemaVersion::new("2.0"));
        assert_eq!(v.to_string(), "2.0.0");
    }

    #[test]
    fn version_serializes_as_string() {
        let json = serde_json::to_string(&SchemaVersion::new("4.0.0")).unwrap();
        assert_eq!(json, "\"4.0.0\"");
    }

    #[test]
    fn binding_display() {
        let binding = SchemaBinding::new("aether", "2.1.0")
            .with_module("onf-device-group")
            .with_module("onf-site");
        assert_eq!(binding.to_string(), "aether@2.1.0");
        assert_eq!(binding.modules().len(), 2);
        assert_eq!(SchemaBinding::new("", "1.0.0").to_string(), "1.0.0");
    }
}
