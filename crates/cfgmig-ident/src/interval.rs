//! Consolidation of labeled identifier ranges
//!
//! An entity owns labeled, pairwise non-overlapping ranges such as IMSI
//! blocks `[first, last]`. Ranges that are exactly adjacent are folded into
//! one; the labels they were stored under are reported as superseded.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Labeled inclusive range of numeric identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    /// First identifier in the range
    pub first: u64,
    /// Last identifier in the range (inclusive)
    pub last: u64,
    /// Name the range is stored under
    pub label: String,
}

impl Interval {
    /// Create interval
    #[inline]
    #[must_use]
    pub fn new(first: u64, last: u64, label: impl Into<String>) -> Self {
        Self {
            first,
            last,
            label: label.into(),
        }
    }

    /// Same bounds, regardless of label
    #[inline]
    #[must_use]
    pub fn same_bounds(&self, other: &Self) -> bool {
        self.first == other.first && self.last == other.last
    }

    /// `next` starts exactly one past the end of `self`
    #[inline]
    #[must_use]
    pub fn is_followed_by(&self, next: &Self) -> bool {
        next.first.checked_sub(self.last) == Some(1)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..={}]", self.label, self.first, self.last)
    }
}

/// Result of [`merge_ranges`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Reduced list, ascending by `first`
    pub merged: Vec<Interval>,
    /// Labels of every original range absorbed into a merge, in absorption order
    pub superseded: Vec<String>,
}

impl MergeOutcome {
    /// Merged ranges with bounds not identical to any original range
    ///
    /// These are the ranges a caller has to create; every original whose
    /// label is in [`Self::superseded`] has to be deleted.
    #[must_use]
    pub fn changed(&self, originals: &[Interval]) -> Vec<&Interval> {
        self.merged
            .iter()
            .filter(|m| !originals.iter().any(|o| o.same_bounds(m)))
            .collect()
    }

    /// Check if a label was absorbed into a merge
    #[inline]
    #[must_use]
    pub fn is_superseded(&self, label: &str) -> bool {
        self.superseded.iter().any(|l| l == label)
    }

    /// Check if anything merged
    #[inline]
    #[must_use]
    pub fn has_merges(&self) -> bool {
        !self.superseded.is_empty()
    }
}

/// Merge exactly adjacent ranges
///
/// Sorts by `first` (stable), then walks the list: a range that begins one
/// past the end of the previous accumulated range extends it, and both
/// labels are recorded as superseded. Gaps and overlaps never merge.
/// The merged range keeps the label of the range it started from.
#[must_use]
pub fn merge_ranges(intervals: &[Interval]) -> MergeOutcome {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|i| i.first);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    let mut superseded = Vec::new();
    let mut seen = HashSet::new();

    for interval in sorted {
        if let Some(acc) = merged.last_mut() {
            if acc.is_followed_by(&interval) {
                acc.last = interval.last;
                for label in [&acc.label, &interval.label] {
                    if seen.insert(label.clone()) {
                        superseded.push(label.clone());
                    }
                }
                continue;
            }
        }
        merged.push(interval);
    }

    MergeOutcome { merged, superseded }
}
