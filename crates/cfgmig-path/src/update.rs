//! Update records and their constructors
//!
//! The constructors take an `Option` so a transform can map every optional
//! source field unconditionally: an absent value produces no update.

use crate::path::Path;
use crate::value::TypedValue;

/// Value written at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    path: Path,
    value: TypedValue,
}

impl Update {
    /// Create update
    #[inline]
    #[must_use]
    pub fn new(path: Path, value: impl Into<TypedValue>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Target path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value to write
    #[inline]
    #[must_use]
    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Split into path and value
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Path, TypedValue) {
        (self.path, self.value)
    }
}

/// Build an update for an optional value
///
/// Returns `None` when `value` is `None`, for every scalar kind.
#[inline]
#[must_use]
pub fn build_update<V: Into<TypedValue>>(path: &Path, value: Option<V>) -> Option<Update> {
    value.map(|v| Update::new(path.clone(), v))
}

/// Parse `template` and build an update for an optional value
#[inline]
#[must_use]
pub fn build_update_at<V: Into<TypedValue>>(template: &str, value: Option<V>) -> Option<Update> {
    value.map(|v| Update::new(Path::parse(template), v))
}

/// Collects updates, dropping the ones built from absent values
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    updates: Vec<Update>,
}

impl UpdateSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the update for `value` at `path`, if there is a value
    pub fn push<V: Into<TypedValue>>(&mut self, path: &Path, value: Option<V>) -> &mut Self {
        if let Some(update) = build_update(path, value) {
            self.updates.push(update);
        }
        self
    }

    /// Add the update for `value` at the parsed `template`, if there is a value
    pub fn push_at<V: Into<TypedValue>>(&mut self, template: &str, value: Option<V>) -> &mut Self {
        if let Some(update) = build_update_at(template, value) {
            self.updates.push(update);
        }
        self
    }

    /// Number of collected updates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Check if nothing was collected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Collected updates in insertion order
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Update> {
        self.updates
    }
}

impl IntoIterator for UpdateSet {
    type Item = Update;
    type IntoIter = std::vec::IntoIter<Update>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_value_builds_nothing_for_every_kind() {
        let path = Path::parse("/a/b");
        assert!(build_update::<String>(&path, None).is_none());
        assert!(build_update::<&str>(&path, None).is_none());
        assert!(build_update::<u8>(&path, None).is_none());
        assert!(build_update::<u16>(&path, None).is_none());
        assert!(build_update::<u32>(&path, None).is_none());
        assert!(build_update::<u64>(&path, None).is_none());
        assert!(build_update::<i64>(&path, None).is_none());
        assert!(build_update::<bool>(&path, None).is_none());
    }

    #[test]
    fn zero_value_is_still_an_update() {
        let path = Path::parse("/mtu");
        let update = build_update(&path, Some(0u16)).unwrap();
        assert_eq!(update.value(), &TypedValue::U16(0));

        let update = build_update(&path, Some(String::new())).unwrap();
        assert_eq!(update.value(), &TypedValue::String(String::new()));

        let update = build_update(&path, Some(false)).unwrap();
        assert_eq!(update.value(), &TypedValue::Bool(false));
    }

    #[test]
    fn build_update_at_parses_template() {
        let update = build_update_at("/site[id=s1]/display-name", Some("Site 1")).unwrap();
        assert_eq!(update.path().elems()[0].key("id"), Some("s1"));
        assert_eq!(update.value(), &TypedValue::String("Site 1".into()));
    }

    #[test]
    fn update_set_skips_absent() {
        let mut set = UpdateSet::new();
        set.push_at("/a", Some(1u32))
            .push_at::<u32>("/b", None)
            .push(&Path::parse("/c"), Some(true));
        assert_eq!(set.len(), 2);

        let paths: Vec<_> = set.into_iter().map(|u| u.path().to_string()).collect();
        assert_eq!(paths, vec!["/a", "/c"]);
    }

    proptest! {
        #[test]
        fn prop_present_value_is_kept(value in any::<u64>()) {
            let path = Path::parse("/x");
            let update = build_update(&path, Some(value)).unwrap();
            prop_assert_eq!(update.value().as_u64(), Some(value));
            prop_assert_eq!(update.path(), &path);
        }
    }
}
