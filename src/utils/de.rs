//! Lenient decoding for rows produced by reporting procedures, whose numeric
//! columns may come back as JSON numbers, numeric strings or null.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A finite number from a JSON number or a numeric string.
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number.filter(|number| number.is_finite())
}

pub(crate) fn to_number(value: Option<&Value>) -> f64 {
    value.and_then(parse_number).unwrap_or(0.0)
}

pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(to_number(value.as_ref()))
}

pub(crate) fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(to_number(value.as_ref()) as i64)
}

/// Strings or numbers rendered as a string, anything else as `None`.
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Counts come back either as a bare scalar or as a single row keyed by the
/// procedure name or `count`.
pub(crate) fn count_from(value: &Value, column: &str) -> i64 {
    let raw = match value {
        Value::Object(row) => row.get(column).or_else(|| row.get("count")),
        Value::Array(rows) => rows
            .first()
            .and_then(Value::as_object)
            .and_then(|row| row.get(column).or_else(|| row.get("count"))),
        scalar => Some(scalar),
    };

    to_number(raw) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "number")]
        amount: f64,
        #[serde(default, deserialize_with = "integer")]
        count: i64,
        #[serde(default, deserialize_with = "opt_string")]
        id: Option<String>,
    }

    #[test]
    fn numbers_accept_strings_and_nulls() {
        let row: Row = serde_json::from_value(json!({"amount": "12.50", "count": null, "id": 7}))
            .unwrap();

        assert_eq!(row.amount, 12.5);
        assert_eq!(row.count, 0);
        assert_eq!(row.id.as_deref(), Some("7"));
    }

    #[test]
    fn only_numbers_and_numeric_strings_parse() {
        assert_eq!(parse_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(parse_number(&json!(1.5)), Some(1.5));
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("soon")), None);
        assert_eq!(parse_number(&json!(true)), None);
        assert_eq!(to_number(Some(&json!("soon"))), 0.0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let row: Row = serde_json::from_value(json!({})).unwrap();

        assert_eq!(row.amount, 0.0);
        assert_eq!(row.count, 0);
        assert!(row.id.is_none());
    }

    #[test]
    fn counts_come_in_several_shapes() {
        assert_eq!(count_from(&json!(42), "admin_customers_count"), 42);
        assert_eq!(count_from(&json!("17"), "admin_customers_count"), 17);
        assert_eq!(
            count_from(&json!({"admin_customers_count": 9}), "admin_customers_count"),
            9
        );
        assert_eq!(count_from(&json!([{"count": 3}]), "admin_customers_count"), 3);
        assert_eq!(count_from(&Value::Null, "admin_customers_count"), 0);
    }
}
