//! Typed scalar values carried by updates

use std::fmt::{self, Display, Formatter};

/// Tagged scalar written to a leaf of the configuration tree
///
/// Unsigned widths are kept distinct so transforms can state the width the
/// destination schema declares; the wire encoding may widen them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedValue {
    /// UTF-8 string leaf
    String(String),
    /// uint8 leaf
    U8(u8),
    /// uint16 leaf
    U16(u16),
    /// uint32 leaf
    U32(u32),
    /// uint64 leaf
    U64(u64),
    /// Signed integer leaf
    I64(i64),
    /// Boolean leaf
    Bool(bool),
}

impl TypedValue {
    /// Short name of the scalar kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::U64(_) => "uint64",
            Self::I64(_) => "int64",
            Self::Bool(_) => "bool",
        }
    }

    /// Unsigned value widened to u64, if the value is unsigned
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(v) => Some(u64::from(v)),
            Self::U16(v) => Some(u64::from(v)),
            Self::U32(v) => Some(u64::from(v)),
            Self::U64(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for TypedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => f.write_str(v),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for TypedValue {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<u8> for TypedValue {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for TypedValue {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for TypedValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for TypedValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(TypedValue::from("x").kind(), "string");
        assert_eq!(TypedValue::from(1u8).kind(), "uint8");
        assert_eq!(TypedValue::from(1u16).kind(), "uint16");
        assert_eq!(TypedValue::from(1u32).kind(), "uint32");
        assert_eq!(TypedValue::from(1u64).kind(), "uint64");
        assert_eq!(TypedValue::from(-1i64).kind(), "int64");
        assert_eq!(TypedValue::from(true).kind(), "bool");
    }

    #[test]
    fn as_u64_widens_unsigned_only() {
        assert_eq!(TypedValue::U8(7).as_u64(), Some(7));
        assert_eq!(TypedValue::U32(70_000).as_u64(), Some(70_000));
        assert_eq!(TypedValue::I64(7).as_u64(), None);
        assert_eq!(TypedValue::from("7").as_u64(), None);
    }

    #[test]
    fn display() {
        assert_eq!(TypedValue::I64(-3).to_string(), "-3");
        assert_eq!(TypedValue::Bool(false).to_string(), "false");
    }
}
