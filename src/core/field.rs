//! Field value types used for filtering and sorting

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Exact-match against a value taken from a `?filter=` object
    ///
    /// Strings compare case-sensitively. Uuids and dates accept their
    /// string form.
    pub fn matches_json(&self, expected: &Value) -> bool {
        match (self, expected) {
            (FieldValue::Null, Value::Null) => true,
            (FieldValue::String(s), Value::String(e)) => s == e,
            (FieldValue::Boolean(b), Value::Bool(e)) => b == e,
            (FieldValue::Integer(i), Value::Number(n)) => n.as_i64() == Some(*i),
            (FieldValue::Float(f), Value::Number(n)) => n.as_f64() == Some(*f),
            (FieldValue::Uuid(u), Value::String(e)) => Uuid::parse_str(e).is_ok_and(|e| e == *u),
            (FieldValue::Date(d), Value::String(e)) => {
                NaiveDate::parse_from_str(e, "%Y-%m-%d").is_ok_and(|e| e == *d)
            }
            (FieldValue::DateTime(dt), Value::String(e)) => DateTime::parse_from_rfc3339(e)
                .is_ok_and(|e| e.with_timezone(&Utc) == *dt),
            _ => false,
        }
    }

    /// Ordering used by `?sort=`
    ///
    /// Values of different kinds are not comparable except integer/float.
    /// `Null` sorts before everything else.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            (FieldValue::Null, _) => Some(Ordering::Less),
            (_, FieldValue::Null) => Some(Ordering::Greater),
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (a, b) => a.as_float()?.partial_cmp(&b.as_float()?),
        }
    }
}

impl From<Option<Uuid>> for FieldValue {
    fn from(value: Option<Uuid>) -> Self {
        value.map(FieldValue::Uuid).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::String).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map(FieldValue::Float).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_integer() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_float(), Some(42.0));
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_matches_json() {
        let id = Uuid::new_v4();
        assert!(FieldValue::Uuid(id).matches_json(&json!(id.to_string())));
        assert!(!FieldValue::Uuid(id).matches_json(&json!("nope")));

        assert!(FieldValue::String("Paid".into()).matches_json(&json!("Paid")));
        assert!(!FieldValue::String("Paid".into()).matches_json(&json!("paid")));

        assert!(FieldValue::Float(12.5).matches_json(&json!(12.5)));
        assert!(FieldValue::Integer(3).matches_json(&json!(3)));
        assert!(FieldValue::Null.matches_json(&Value::Null));

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(FieldValue::Date(date).matches_json(&json!("2024-03-01")));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            FieldValue::Float(1.5).compare(&FieldValue::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::String("a".into())),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::String("a".into()).compare(&FieldValue::Boolean(true)),
            None
        );
    }

    #[test]
    fn test_from_option() {
        assert!(FieldValue::from(None::<Uuid>).is_null());
        assert_eq!(
            FieldValue::from(Some("x".to_string())),
            FieldValue::String("x".into())
        );
    }
}
