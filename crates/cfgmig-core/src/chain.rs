//! Step chain resolution
//!
//! The chain between two versions is found by a single forward scan over
//! the steps in registration order. This is not a graph search: a step is
//! taken as soon as its source version equals the version reached so far,
//! and the scan never backtracks. When several steps could continue a chain,
//! the one registered first wins.

use crate::error::MigrationError;
use crate::step::MigrationStep;
use crate::version::SchemaVersion;

/// Resolve the ordered steps leading from `from` to `to`
///
/// `from == to` yields an empty chain whether or not the version is known.
///
/// # Errors
/// - [`MigrationError::ChainNotFound`] naming `from` if no step starts there
/// - [`MigrationError::ChainNotFound`] naming `to` if the scan does not
///   reach it, including when `to` is an endpoint of an unconnected step
pub fn resolve_chain<'a>(
    steps: &'a [MigrationStep],
    from: &SchemaVersion,
    to: &SchemaVersion,
) -> Result<Vec<&'a MigrationStep>, MigrationError> {
    if from == to {
        return Ok(Vec::new());
    }

    let mut chain = Vec::new();
    let mut current = from;
    for step in steps {
        if current == to {
            break;
        }
        if step.from_version() == current {
            chain.push(step);
            current = step.to_version();
        }
    }

    if chain.is_empty() {
        return Err(MigrationError::ChainNotFound(from.clone()));
    }
    if current != to {
        return Err(MigrationError::ChainNotFound(to.clone()));
    }
    Ok(chain)
}
