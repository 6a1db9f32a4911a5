use crate::data::{Dataset, Value};
use crate::error::ProjectionError;
use crate::palette::DEFAULT_SERIES_COLOR;

/// Field names tried (in order, exact match) when sourcing row labels.
pub const DEFAULT_LABEL_FIELDS: &[&str] = &["name"];

/// A chart-ready series derived from a Dataset.
///
/// Labels and values are positionally aligned 1:1 with the source rows; holes
/// stay in place as `Value::Missing` so consumers can detect them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    /// The field actually plotted, after default-fallback resolution.
    pub field: String,
    pub labels: Vec<Value>,
    pub values: Vec<Value>,
    /// Fill/stroke color hint for the renderer.
    pub color: String,
}

/// Derive a ChartDataset from a Dataset.
///
/// A non-empty `selected_field` is used verbatim; if it is not in the header
/// every value comes back `Missing` (graceful degradation, not an error). An
/// empty selection falls back to the second header field, then the first.
/// Label lookup is case-sensitive: `label_fields` candidates are tried in
/// order against the header and the first exact match wins.
pub fn project(
    data: &Dataset,
    selected_field: &str,
    label_fields: &[&str],
    color: Option<&str>,
) -> Result<ChartDataset, ProjectionError> {
    if data.is_empty() {
        return Err(ProjectionError::EmptyDataset);
    }

    let field = resolve_field(data, selected_field);
    let value_idx = data.field_index(&field);
    let label_idx = label_fields
        .iter()
        .find_map(|candidate| data.field_index(candidate));

    let labels = data
        .rows
        .iter()
        .map(|row| cell_at(row, label_idx))
        .collect();
    let values = data
        .rows
        .iter()
        .map(|row| coerce_numeric(cell_at(row, value_idx)))
        .collect();

    Ok(ChartDataset {
        field,
        labels,
        values,
        color: color.unwrap_or(DEFAULT_SERIES_COLOR).to_string(),
    })
}

fn resolve_field(data: &Dataset, selected_field: &str) -> String {
    if !selected_field.is_empty() {
        return selected_field.to_string();
    }
    data.headers
        .get(1)
        .or_else(|| data.headers.first())
        .cloned()
        .unwrap_or_default()
}

fn cell_at(row: &[Value], idx: Option<usize>) -> Value {
    idx.and_then(|i| row.get(i)).cloned().unwrap_or(Value::Missing)
}

/// Coerce a string that fully parses as a decimal number; pass everything
/// else through unchanged.
fn coerce_numeric(value: Value) -> Value {
    match value {
        Value::Str(s) => match s.parse::<f64>() {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Str(s),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Value::Str(v.to_string())).collect())
                .collect(),
        )
    }

    #[test]
    fn test_default_field_is_second_header() {
        let data = make_data(&["name", "score"], &[&["Alice", "10"]]);
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.field, "score");
    }

    #[test]
    fn test_default_field_single_column_header() {
        let data = make_data(&["only"], &[&["1"]]);
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.field, "only");
    }

    #[test]
    fn test_selected_field_used_verbatim() {
        let data = make_data(&["name", "score"], &[&["Alice", "10"]]);
        let chart = project(&data, "name", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.field, "name");
        assert_eq!(chart.values, vec![Value::Str("Alice".to_string())]);
    }

    #[test]
    fn test_missing_selected_field_yields_missing_values() {
        let data = make_data(&["name", "score"], &[&["Alice", "10"], &["Bob", "7"]]);
        let chart = project(&data, "weight", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.field, "weight");
        assert_eq!(chart.values, vec![Value::Missing, Value::Missing]);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_numeric(Value::Str("42".to_string())), Value::Num(42.0));
        assert_eq!(
            coerce_numeric(Value::Str("-3.5".to_string())),
            Value::Num(-3.5)
        );
        // Partial parses are not coerced.
        assert_eq!(
            coerce_numeric(Value::Str("42a".to_string())),
            Value::Str("42a".to_string())
        );
        assert_eq!(coerce_numeric(Value::Null), Value::Null);
        assert_eq!(coerce_numeric(Value::Missing), Value::Missing);
    }

    #[test]
    fn test_label_lookup_is_case_sensitive() {
        // Header says "Name"; the conventional label field "name" must miss.
        let data = make_data(&["Name", "Score"], &[&["Alice", "10"], &["Bob", "7"]]);
        let chart = project(&data, "Score", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.values, vec![Value::Num(10.0), Value::Num(7.0)]);
        assert_eq!(chart.labels, vec![Value::Missing, Value::Missing]);
    }

    #[test]
    fn test_label_candidates_tried_in_order() {
        let data = make_data(&["label", "name", "v"], &[&["L", "N", "1"]]);
        let chart = project(&data, "v", &["name", "label"], None).unwrap();
        assert_eq!(chart.labels, vec![Value::Str("N".to_string())]);
    }

    #[test]
    fn test_row_alignment_preserves_holes() {
        let data = Dataset::new(
            vec!["name".to_string(), "score".to_string()],
            vec![
                vec![Value::Str("Alice".to_string()), Value::Str("10".to_string())],
                vec![Value::Null, Value::Str("n/a".to_string())],
            ],
        );
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.labels.len(), 2);
        assert_eq!(chart.values.len(), 2);
        assert_eq!(chart.labels[1], Value::Null);
        assert_eq!(chart.values[1], Value::Str("n/a".to_string()));
    }

    #[test]
    fn test_empty_dataset_errors() {
        let data = Dataset::new(vec!["a".to_string()], vec![]);
        assert!(matches!(
            project(&data, "", DEFAULT_LABEL_FIELDS, None),
            Err(ProjectionError::EmptyDataset)
        ));
    }

    #[test]
    fn test_color_default_and_override() {
        let data = make_data(&["name", "score"], &[&["Alice", "10"]]);
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, None).unwrap();
        assert_eq!(chart.color, DEFAULT_SERIES_COLOR);
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, Some("#ff0000")).unwrap();
        assert_eq!(chart.color, "#ff0000");
    }
}
