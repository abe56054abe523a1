//! String → typed value coercion.
//!
//! The set of target types is closed: callers pick a [`TargetType`] tag
//! instead of relying on runtime type inspection.

use std::fmt;

use crate::error::{ConfigError, Result};
use crate::source::parser::split_escaped;
use crate::store::RawEntry;

/// Types a property can be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    String,
    Int,
    Long,
    Boolean,
    Array,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::String => "string",
            TargetType::Int => "int",
            TargetType::Long => "long",
            TargetType::Boolean => "boolean",
            TargetType::Array => "array",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value of one of the supported types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Int(i32),
    Long(i64),
    Boolean(bool),
    Array(Vec<String>),
}

impl TypedValue {
    pub fn target(&self) -> TargetType {
        match self {
            TypedValue::String(_) => TargetType::String,
            TypedValue::Int(_) => TargetType::Int,
            TypedValue::Long(_) => TargetType::Long,
            TypedValue::Boolean(_) => TargetType::Boolean,
            TypedValue::Array(_) => TargetType::Array,
        }
    }

    /// The value returned for an absent key when no default is given.
    /// Strings have no such value.
    pub fn zero(target: TargetType) -> Option<TypedValue> {
        match target {
            TargetType::String => None,
            TargetType::Int => Some(TypedValue::Int(0)),
            TargetType::Long => Some(TypedValue::Long(0)),
            TargetType::Boolean => Some(TypedValue::Boolean(false)),
            TargetType::Array => Some(TypedValue::Array(Vec::new())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(n) => Some(i64::from(*n)),
            TypedValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            TypedValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The stored form of this value.
    pub fn into_entry(self) -> RawEntry {
        match self {
            TypedValue::String(s) => RawEntry::from(s),
            TypedValue::Int(n) => RawEntry::Single(n.to_string()),
            TypedValue::Long(n) => RawEntry::Single(n.to_string()),
            TypedValue::Boolean(b) => RawEntry::Single(b.to_string()),
            TypedValue::Array(values) => RawEntry::from(values),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        TypedValue::Int(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Long(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Boolean(value)
    }
}

impl From<Vec<String>> for TypedValue {
    fn from(values: Vec<String>) -> Self {
        TypedValue::Array(values)
    }
}

impl From<Vec<&str>> for TypedValue {
    fn from(values: Vec<&str>) -> Self {
        TypedValue::Array(values.into_iter().map(str::to_string).collect())
    }
}

/// Values accepted by `set`/`load`. `None` removes the key.
pub trait IntoSetting {
    fn into_setting(self) -> Option<RawEntry>;
}

macro_rules! into_setting {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoSetting for $ty {
                fn into_setting(self) -> Option<RawEntry> {
                    Some(TypedValue::from(self).into_entry())
                }
            }
        )*
    };
}

into_setting!(&str, String, i32, i64, bool, Vec<String>, Vec<&str>);

impl IntoSetting for TypedValue {
    fn into_setting(self) -> Option<RawEntry> {
        Some(self.into_entry())
    }
}

impl<T: IntoSetting> IntoSetting for Option<T> {
    fn into_setting(self) -> Option<RawEntry> {
        self.and_then(IntoSetting::into_setting)
    }
}

/// Interpolated values of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub values: Vec<String>,
    pub multi: bool,
}

impl Resolved {
    pub fn scalar(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    /// Multi-valued entries as-is; a single value split on unescaped separators.
    pub fn into_array(self, separator: char) -> Vec<String> {
        if self.multi {
            self.values
        } else {
            split_escaped(self.scalar(), separator)
        }
    }
}

/// `true`/`yes` → true, `false`/`no` → false, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// Convert a resolved entry to `target`.
pub fn coerce(key: &str, resolved: Resolved, target: TargetType, separator: char) -> Result<TypedValue> {
    let mismatch = |value: &str| ConfigError::TypeCoercion {
        key: key.to_string(),
        value: value.to_string(),
        target: target.as_str(),
    };

    match target {
        TargetType::String => Ok(TypedValue::String(resolved.scalar().to_string())),
        TargetType::Int => {
            let value = resolved.scalar();
            value.trim().parse().map(TypedValue::Int).map_err(|_| mismatch(value))
        }
        TargetType::Long => {
            let value = resolved.scalar();
            value.trim().parse().map(TypedValue::Long).map_err(|_| mismatch(value))
        }
        TargetType::Boolean => {
            let value = resolved.scalar();
            parse_bool(value).map(TypedValue::Boolean).ok_or_else(|| mismatch(value))
        }
        TargetType::Array => Ok(TypedValue::Array(resolved.into_array(separator))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: &str) -> Resolved {
        Resolved {
            values: vec![value.to_string()],
            multi: false,
        }
    }

    #[test]
    fn test_long_beyond_int_range() {
        let long = coerce("sample.long", single("3000000000"), TargetType::Long, ',').unwrap();
        assert_eq!(long, TypedValue::Long(3_000_000_000));

        let int = coerce("sample.long", single("3000000000"), TargetType::Int, ',');
        assert!(matches!(int, Err(ConfigError::TypeCoercion { target: "int", .. })));
    }

    #[test]
    fn test_bool_words() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" yes "), Some(true));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_array_from_single_and_multi() {
        assert_eq!(single("A,B,C").into_array(','), vec!["A", "B", "C"]);
        assert_eq!(single("A\\,B\\,C").into_array(','), vec!["A,B,C"]);

        let multi = Resolved {
            values: vec!["a,b".into(), "c".into()],
            multi: true,
        };
        assert_eq!(multi.into_array(','), vec!["a,b", "c"]);
    }

    #[test]
    fn test_into_setting() {
        assert_eq!("  Hi There  ".into_setting(), Some(RawEntry::Single("Hi There".into())));
        assert_eq!(true.into_setting(), Some(RawEntry::Single("true".into())));
        assert_eq!(1111111i32.into_setting(), Some(RawEntry::Single("1111111".into())));
        assert_eq!(None::<&str>.into_setting(), None);
    }
}
