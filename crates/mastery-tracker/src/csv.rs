//! CSV rendering of report rows.
//!
//! Rows are JSON objects; the header is the key order of the first row.
//! Fields containing a comma, quote or line break are quoted and embedded
//! quotes are doubled.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

fn escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') || text.contains('\r') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Whole-number floats print without a fractional part, so `100.0`
/// becomes `100`.
fn number_string(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(f) if number.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => number.to_string(),
    }
}

fn field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => escape(text),
        Some(Value::Number(number)) => number_string(number),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => escape(&other.to_string()),
    }
}

/// Render JSON object rows. Returns an empty string when there are no rows
/// or the first row is not an object.
pub fn rows_to_csv(rows: &[Value]) -> String {
    let Some(Value::Object(first)) = rows.first() else {
        return String::new();
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut out = columns.iter().map(|c| escape(c)).collect::<Vec<_>>().join(",");
    out.push('\n');

    for row in rows {
        let line = columns
            .iter()
            .map(|column| field(row.as_object().and_then(|obj| obj.get(column.as_str()))))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Serialize typed rows and render them with [`rows_to_csv`].
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let values = rows.iter().map(serde_json::to_value).collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows_to_csv(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comma_fields_are_quoted() {
        let rows = vec![json!({"name": "A, B", "value": 1}), json!({"name": "C", "value": 2})];
        assert_eq!(rows_to_csv(&rows), "name,value\n\"A, B\",1\nC,2\n");
    }

    #[test]
    fn test_header_follows_first_row_key_order() {
        let rows = vec![json!({"zeta": 1, "alpha": 2})];
        assert_eq!(rows_to_csv(&rows), "zeta,alpha\n1,2\n");
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let rows = vec![json!({"note": "say \"hi\"", "multi": "a\nb"})];
        assert_eq!(rows_to_csv(&rows), "note,multi\n\"say \"\"hi\"\"\",\"a\nb\"\n");
    }

    #[test]
    fn test_number_formatting() {
        let rows = vec![json!({"a": 100.0, "b": 42.5, "c": 7, "d": null, "e": true})];
        assert_eq!(rows_to_csv(&rows), "a,b,c,d,e\n100,42.5,7,,true\n");
    }

    #[test]
    fn test_missing_keys_in_later_rows_are_blank() {
        let rows = vec![json!({"a": 1, "b": 2}), json!({"a": 3})];
        assert_eq!(rows_to_csv(&rows), "a,b\n1,2\n3,\n");
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(rows_to_csv(&[]), "");
    }

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        value: u32,
    }

    #[test]
    fn test_typed_rows() {
        let csv = to_csv(&[Row { name: "A, B", value: 1 }, Row { name: "C", value: 2 }]).unwrap();
        assert_eq!(csv, "name,value\n\"A, B\",1\nC,2\n");
    }
}
