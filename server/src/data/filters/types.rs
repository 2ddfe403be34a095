//! Filter value types
//!
//! Request fields are read as [`FieldValue`] and normalized into
//! [`FilterValue`] before any predicate is attached. Bound parameters are
//! collected as [`SqlValue`]s in insertion order.

use serde::Serialize;

/// A single bound SQL parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Int(i64),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn push(&mut self, value: impl Into<SqlValue>) {
        self.values.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw value of a request field, as exposed by a request's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Plain string (empty means "not set")
    Str(&'a str),
    /// Wrapped string (`None` means "not set")
    OptStr(Option<&'a str>),
    /// Wrapped 32-bit integer (`None` means "not set")
    OptInt(Option<i32>),
    /// Repeated string field
    StrList(&'a [String]),
    /// Any shape that never participates in filtering (flags, paging values)
    Other,
}

/// Normalized filter value: a non-empty ordered list of scalars
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Strings(Vec<String>),
    Ints(Vec<i64>),
}

impl FilterValue {
    /// Normalize a raw field value; `None` means the filter is absent.
    pub fn normalize(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Str("") => None,
            FieldValue::Str(s) => Some(Self::Strings(vec![s.to_string()])),
            FieldValue::OptStr(v) => v.map(|s| Self::Strings(vec![s.to_string()])),
            FieldValue::OptInt(v) => v.map(|i| Self::Ints(vec![i64::from(i)])),
            FieldValue::StrList(list) => {
                let values: Vec<String> = list
                    .iter()
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(Self::Strings(values))
                }
            }
            FieldValue::Other => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Strings(v) => v.len(),
            Self::Ints(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The string terms, if this value is a list of strings
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Self::Strings(v) => Some(v),
            Self::Ints(_) => None,
        }
    }

    /// Convert into bound parameters, preserving order
    pub fn into_sql_values(self) -> Vec<SqlValue> {
        match self {
            Self::Strings(v) => v.into_iter().map(SqlValue::Text).collect(),
            Self::Ints(v) => v.into_iter().map(SqlValue::Int).collect(),
        }
    }
}
