//! Structured resource paths
//!
//! Provides [`Path`] and [`PathElem`] for addressing nodes of a configuration
//! tree, using the `name[key=value]/...` grammar of gNMI string paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One level of a [`Path`]
///
/// A name plus an optional set of disambiguating keys, e.g.
/// `device-group[id=starbucks]`. Keys are unique per element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElem {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    key: BTreeMap<String, String>,
}

impl PathElem {
    /// Create a key-less element
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: BTreeMap::new(),
        }
    }

    /// Add a key, returning the element
    #[inline]
    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    /// Element name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key mapping (empty for key-less elements)
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &BTreeMap<String, String> {
        &self.key
    }

    /// Value of a single key
    #[inline]
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&str> {
        self.key.get(name).map(String::as_str)
    }

    /// Parse one segment such as `imsis[imsi-id=a]`
    ///
    /// Bracket groups without `=` are dropped; the element keeps its name.
    fn parse_segment(segment: &str) -> Self {
        let Some(open) = segment.find('[') else {
            return Self::new(segment);
        };

        let mut elem = Self::new(&segment[..open]);
        let mut rest = &segment[open..];
        while let Some(body) = rest.strip_prefix('[') {
            let Some(close) = body.find(']') else {
                break;
            };
            if let Some((name, value)) = body[..close].split_once('=') {
                elem.key.insert(name.to_string(), value.to_string());
            }
            rest = &body[close + 1..];
        }
        elem
    }
}

impl Display for PathElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (name, value) in &self.key {
            write!(f, "[{name}={value}]")?;
        }
        Ok(())
    }
}

/// Path into a configuration tree
///
/// Ordered elements from root to leaf, plus the label of the target
/// (configuration instance) the path addresses.
///
/// # Examples
/// - `/device-group[id=dg1]/imsis[imsi-id=a]/imsi-range-from`
/// - `Path::root().elem("site").key("id", "bengaluru")`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(rename = "elem", default)]
    elems: Vec<PathElem>,
}

impl Path {
    /// Empty path (root), no target
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Create path from elements
    #[inline]
    #[must_use]
    pub fn new(elems: Vec<PathElem>) -> Self {
        Self {
            target: None,
            elems,
        }
    }

    /// Parse a string path
    ///
    /// Splits on `/` outside of brackets and skips empty segments. Each
    /// segment may carry `[key=value]` suffixes. Parsing is lenient and
    /// never fails; malformed brackets yield key-less elements.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let elems = split_segments(s)
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .map(PathElem::parse_segment)
            .collect();
        Self::new(elems)
    }

    /// Set the target label, returning the path
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Append a key-less element
    #[inline]
    #[must_use]
    pub fn elem(mut self, name: impl Into<String>) -> Self {
        self.elems.push(PathElem::new(name));
        self
    }

    /// Add a key to the last element
    ///
    /// No-op on the root path.
    #[inline]
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(last) = self.elems.last_mut() {
            last.key.insert(name.into(), value.into());
        }
        self
    }

    /// Append all elements of `other`; the target of `self` is kept
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut joined = self.clone();
        joined.elems.extend(other.elems.iter().cloned());
        joined
    }

    /// Target label
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Path elements
    #[inline]
    #[must_use]
    pub fn elems(&self) -> &[PathElem] {
        &self.elems
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Last element (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathElem> {
        self.elems.last()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.elems.is_empty() {
            return f.write_str("/");
        }
        for elem in &self.elems {
            write!(f, "/{elem}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<Vec<PathElem>> for Path {
    fn from(elems: Vec<PathElem>) -> Self {
        Self::new(elems)
    }
}

/// Split on `/` that are not inside `[...]`, so key values may hold slashes
fn split_segments(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&s[start..]);
    segments
}
