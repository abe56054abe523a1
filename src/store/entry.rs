//! Raw stored values.

use std::fmt;

/// A stored property value before interpolation.
///
/// A key assigned more than once in a single source becomes `Multi`, in
/// file order and without deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    Single(String),
    Multi(Vec<String>),
}

impl RawEntry {
    /// The value used for scalar reads: the only value, or the first of many.
    pub fn first(&self) -> &str {
        match self {
            RawEntry::Single(value) => value,
            RawEntry::Multi(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values, in order.
    pub fn values(&self) -> &[String] {
        match self {
            RawEntry::Single(value) => std::slice::from_ref(value),
            RawEntry::Multi(values) => values,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, RawEntry::Multi(_))
    }

    /// Add another occurrence of the same key from the same source.
    pub fn push(&mut self, value: String) {
        match self {
            RawEntry::Single(existing) => {
                let first = std::mem::take(existing);
                *self = RawEntry::Multi(vec![first, value]);
            }
            RawEntry::Multi(values) => values.push(value),
        }
    }
}

impl fmt::Display for RawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawEntry::Single(value) => f.write_str(value),
            RawEntry::Multi(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<&str> for RawEntry {
    fn from(value: &str) -> Self {
        RawEntry::Single(value.trim().to_string())
    }
}

impl From<String> for RawEntry {
    fn from(value: String) -> Self {
        RawEntry::from(value.as_str())
    }
}

/// No values store an empty string; `Multi` always holds two or more.
impl From<Vec<String>> for RawEntry {
    fn from(values: Vec<String>) -> Self {
        let mut values: Vec<String> = values.into_iter().map(|v| v.trim().to_string()).collect();
        match values.len() {
            0 => RawEntry::Single(String::new()),
            1 => RawEntry::Single(values.remove(0)),
            _ => RawEntry::Multi(values),
        }
    }
}
