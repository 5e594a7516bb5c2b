//! # CSV Serialization
//!
//! Turns any collection of serializable rows into CSV text.
//!
//! ## Layout
//! ```text
//! id,name,price,customer          ← keys of the FIRST row, unquoted
//! "1","Sugar ""Kabras""","150",""  ← every field quoted, quotes doubled
//! "2","Rice","220","{""name"":""Amina""}"  ← nested values as JSON text
//! ```
//!
//! Columns come from the first row only; a key that later rows lack yields
//! an empty field and keys only later rows carry are dropped.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Serializes `rows` to CSV. Returns `None` for an empty collection.
pub fn to_csv<T: Serialize>(rows: &[T]) -> CoreResult<Option<String>> {
    let values = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values_to_csv(&values)
}

/// Serializes already-converted JSON rows to CSV.
pub fn values_to_csv(rows: &[Value]) -> CoreResult<Option<String>> {
    let objects = rows
        .iter()
        .enumerate()
        .map(|(index, row)| row.as_object().ok_or(CoreError::NotAnObject { index }))
        .collect::<Result<Vec<&Map<String, Value>>, _>>()?;

    let Some(first) = objects.first() else {
        return Ok(None);
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut lines = Vec::with_capacity(objects.len() + 1);
    lines.push(headers.join(","));
    for row in &objects {
        let line = headers
            .iter()
            .map(|header| quote(&field_text(row.get(*header))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

/// Only null and missing values become empty cells; `0` and `false` are
/// written out.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Customer, RecordId};
    use serde_json::json;

    #[test]
    fn test_two_rows() {
        let rows = vec![
            json!({ "id": 1, "name": "Sugar \"Kabras\"", "price": 150 }),
            json!({ "id": 2, "name": "Rice", "price": 220.5 }),
        ];
        let csv = values_to_csv(&rows).unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,name,price");
        assert_eq!(lines[1], "\"1\",\"Sugar \"\"Kabras\"\"\",\"150\"");
        assert_eq!(lines[2], "\"2\",\"Rice\",\"220.5\"");
    }

    #[test]
    fn test_nested_values_become_json_text() {
        let rows = vec![json!({
            "id": "s-1",
            "customer": { "name": "Amina" },
            "tags": ["a", "b"]
        })];
        let csv = values_to_csv(&rows).unwrap().unwrap();
        let body = csv.lines().nth(1).unwrap();

        assert_eq!(
            body,
            "\"s-1\",\"{\"\"name\"\":\"\"Amina\"\"}\",\"[\"\"a\"\",\"\"b\"\"]\""
        );
    }

    #[test]
    fn test_headers_follow_first_row() {
        let rows = vec![
            json!({ "b": 1, "a": null }),
            json!({ "a": "x", "c": "dropped" }),
        ];
        let csv = values_to_csv(&rows).unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "b,a");
        assert_eq!(lines[1], "\"1\",\"\"");
        assert_eq!(lines[2], "\"\",\"x\"");
    }

    #[test]
    fn test_zero_and_false_are_kept() {
        let rows = vec![json!({ "stock_quantity": 0, "active": false, "category": null })];
        let csv = values_to_csv(&rows).unwrap().unwrap();

        assert_eq!(csv.lines().nth(1), Some("\"0\",\"false\",\"\""));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let rows: Vec<Customer> = Vec::new();
        assert!(to_csv(&rows).unwrap().is_none());
    }

    #[test]
    fn test_typed_rows_keep_field_order() {
        let rows = vec![Customer {
            id: RecordId::Int(3),
            name: "Otieno".to_string(),
            phone: Some("0722000111".to_string()),
            current_balance: Money::from_major(1200),
            created_at: None,
        }];
        let csv = to_csv(&rows).unwrap().unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("id,name,phone,current_balance,created_at"));
        assert_eq!(lines.next(), Some("\"3\",\"Otieno\",\"0722000111\",\"1200\",\"\""));
    }

    #[test]
    fn test_non_object_rows_are_rejected() {
        let rows = vec![json!({ "id": 1 }), json!(5)];
        assert!(matches!(
            values_to_csv(&rows),
            Err(CoreError::NotAnObject { index: 1 })
        ));
    }
}
