//! Identifier grammar of the destination schemas
//!
//! Newer schema versions restrict entity ids to lowercase, hyphen-separated
//! words (`^[a-z]([a-z0-9-]?[a-z0-9])*$`). Free-form ids coming from older
//! trees are rewritten with [`convert_identifier`].

use once_cell::sync::Lazy;
use regex::Regex;

static VALID_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]([a-z0-9-]?[a-z0-9])*$").expect("identifier pattern compiles")
});

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9-]").expect("disallowed pattern compiles"));

static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z][a-z]+)").expect("word pattern compiles"));

static CAMEL_HUMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("hump pattern compiles"));

static LEADING_NON_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9-]+").expect("leading pattern compiles"));

static HYPHEN_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("hyphen pattern compiles"));

/// Check `s` against the destination identifier grammar
#[inline]
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    VALID_IDENTIFIER.is_match(s)
}

/// Rewrite a free-form name into the identifier grammar
///
/// Total: never fails. Steps, in order:
/// 1. drop every character other than ASCII letters, digits and `-`
/// 2. hyphenate `camelCase` and `PascalCase` word boundaries
/// 3. drop the leading run of digits and hyphens
/// 4. lowercase
/// 5. collapse repeated hyphens and drop trailing ones
///
/// The output is valid whenever the input holds at least one ASCII letter.
/// Without letters the output is empty.
///
/// # Examples
/// ```
/// use cfgmig_ident::convert_identifier;
///
/// assert_eq!(
///     convert_identifier("BengaluruDroneCamera-2StatusLive"),
///     "bengaluru-drone-camera-2-status-live"
/// );
/// assert_eq!(convert_identifier("123bengaluruCamera-#2"), "bengaluru-camera-2");
/// ```
#[must_use]
pub fn convert_identifier(s: &str) -> String {
    let stripped = DISALLOWED.replace_all(s, "");
    let words = CAPITALIZED_WORD.replace_all(&stripped, "${1}-${2}");
    let humps = CAMEL_HUMP.replace_all(&words, "${1}-${2}");
    let trimmed = LEADING_NON_LETTER.replace(&humps, "");
    let lowered = trimmed.to_lowercase();
    HYPHEN_RUN
        .replace_all(&lowered, "-")
        .trim_end_matches('-')
        .to_string()
}

/// Return `s` if it is already valid, otherwise its converted form
///
/// # Errors
/// Returns [`IdentifierError::Unconvertible`] when the converted form is
/// still not a valid identifier (the input holds no ASCII letter).
pub fn normalize_identifier(s: &str) -> Result<String, IdentifierError> {
    if is_valid_identifier(s) {
        return Ok(s.to_string());
    }

    let converted = convert_identifier(s);
    if !is_valid_identifier(&converted) {
        return Err(IdentifierError::Unconvertible {
            original: s.to_string(),
            converted,
        });
    }

    tracing::debug!(original = s, converted = %converted, "identifier rewritten");
    Ok(converted)
}

/// Identifier normalization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// No valid identifier can be derived
    #[error("cannot derive an identifier from '{original}' (got '{converted}')")]
    Unconvertible { original: String, converted: String },
}
