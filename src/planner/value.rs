//! Value types on both sides of a comparison.
//!
//! Desired values are typed primitives borrowed from an
//! [`InputConfiguration`](crate::config::InputConfiguration). Observed values
//! come from Graylog's untyped `attributes` payload and are modelled as a
//! tagged union so that every pairing is handled explicitly.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::CompareError;

/// A typed desired-side primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Boolean field.
    Bool(bool),
    /// Integer field.
    Int(i64),
    /// String field.
    Str(&'a str),
}

/// A dynamically-typed observed value.
///
/// JSON numbers always decode to [`AttrValue::Number`], whether or not the
/// source had a fractional part.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(f64),
    /// JSON string.
    String(String),
    /// JSON null.
    Null,
    /// JSON array or object, kept verbatim.
    Nested(serde_json::Value),
}

/// Observed configuration payload keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap(BTreeMap<String, AttrValue>);

impl FieldValue<'_> {
    /// Returns true if this is the zero value for its type.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !*b,
            Self::Int(n) => *n == 0,
            Self::Str(s) => s.is_empty(),
        }
    }

    /// Returns true if the observed value represents the same logical value.
    ///
    /// An integer equals a number only when the number is integral and
    /// converts exactly. Any other type pairing is unequal.
    #[must_use]
    pub fn matches(&self, observed: &AttrValue) -> bool {
        match (self, observed) {
            (Self::Bool(a), AttrValue::Bool(b)) => a == b,
            (Self::Int(n), AttrValue::Number(f)) => int_equals_float(*n, *f),
            (Self::Str(a), AttrValue::String(b)) => *a == b.as_str(),
            _ => false,
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn int_equals_float(n: i64, f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    const UPPER: f64 = i64::MAX as f64;
    const LOWER: f64 = i64::MIN as f64;

    f.is_finite() && f.trunc() == f && (LOWER..UPPER).contains(&f) && f as i64 == n
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Null => Self::Null,
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Nested(nested)
            }
        }
    }
}

impl AttributeMap {
    /// Creates an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a value under the given key.
    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        self.0.insert(key.into(), value);
    }

    /// Looks up a value by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Looks up a value with case-insensitive key matching.
    ///
    /// An exact-case key wins over keys that only match after folding.
    #[must_use]
    pub fn get_ignore_case(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }
}

impl TryFrom<serde_json::Value> for AttributeMap {
    type Error = CompareError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(
                map.into_iter().map(|(k, v)| (k, AttrValue::from(v))).collect(),
            )),
            serde_json::Value::Null => Ok(Self::new()),
            other => Err(CompareError::ContractViolation {
                found: json_kind(&other),
            }),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
            Self::Nested(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::Bool(false).is_zero());
        assert!(FieldValue::Int(0).is_zero());
        assert!(FieldValue::Str("").is_zero());
        assert!(!FieldValue::Bool(true).is_zero());
        assert!(!FieldValue::Int(-1).is_zero());
        assert!(!FieldValue::Str("x").is_zero());
    }

    #[test]
    fn test_int_matches_integral_number() {
        assert!(FieldValue::Int(1514).matches(&AttrValue::Number(1514.0)));
        assert!(!FieldValue::Int(1514).matches(&AttrValue::Number(1514.3)));
        assert!(!FieldValue::Int(1514).matches(&AttrValue::Number(1513.999_999)));
        assert!(FieldValue::Int(-3).matches(&AttrValue::Number(-3.0)));
    }

    #[test]
    fn test_int_rejects_non_finite_and_out_of_range() {
        assert!(!FieldValue::Int(0).matches(&AttrValue::Number(f64::NAN)));
        assert!(!FieldValue::Int(i64::MAX).matches(&AttrValue::Number(f64::INFINITY)));
        assert!(!FieldValue::Int(i64::MAX).matches(&AttrValue::Number(9.3e18)));
    }

    #[test]
    fn test_type_mismatch_is_inequality() {
        assert!(!FieldValue::Int(1).matches(&AttrValue::Bool(true)));
        assert!(!FieldValue::Str("1514").matches(&AttrValue::Number(1514.0)));
        assert!(!FieldValue::Bool(true).matches(&AttrValue::String(String::from("true"))));
        assert!(!FieldValue::Str("x").matches(&AttrValue::Null));
        assert!(!FieldValue::Str("[]").matches(&AttrValue::Nested(json!([]))));
    }

    #[test]
    fn test_attribute_map_from_object() {
        let map = AttributeMap::try_from(json!({
            "port": 1514,
            "bind_address": "0.0.0.0",
            "tls_enable": false,
            "tls_cert_file": null,
            "extra": [1, 2]
        }))
        .unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map.get("port"), Some(&AttrValue::Number(1514.0)));
        assert_eq!(map.get("tls_cert_file"), Some(&AttrValue::Null));
        assert!(matches!(map.get("extra"), Some(AttrValue::Nested(_))));
    }

    #[test]
    fn test_attribute_map_rejects_non_object() {
        let err = AttributeMap::try_from(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, CompareError::ContractViolation { found: "array" });

        let err = AttributeMap::try_from(json!("port=1514")).unwrap_err();
        assert_eq!(err, CompareError::ContractViolation { found: "string" });
    }

    #[test]
    fn test_attribute_map_null_is_empty() {
        let map = AttributeMap::try_from(serde_json::Value::Null).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_get_ignore_case_prefers_exact_key() {
        let map: AttributeMap = [
            ("PORT", AttrValue::Number(1.0)),
            ("port", AttrValue::Number(2.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.get_ignore_case("port"), Some(&AttrValue::Number(2.0)));
        assert_eq!(map.get_ignore_case("Port"), Some(&AttrValue::Number(1.0)));
    }
}
