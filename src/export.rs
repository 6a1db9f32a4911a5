use serde_json::json;

use crate::data::Dataset;
use crate::project::ChartDataset;

/// JSON encoding of the full Dataset: an array of field-name -> value objects.
pub fn dataset_to_json(data: &Dataset) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(data)
}

/// JSON encoding of the derived series, shaped like a chart.js dataset
/// document so it can be fed straight back into a renderer.
pub fn chart_to_json(chart: &ChartDataset) -> Result<Vec<u8>, serde_json::Error> {
    let doc = json!({
        "labels": chart.labels,
        "datasets": [{
            "label": chart.field,
            "data": chart.values,
            "backgroundColor": chart.color,
            "borderColor": chart.color,
            "borderWidth": 1,
        }],
    });
    serde_json::to_vec(&doc)
}

/// CSV encoding of the Dataset: comma-joined header, then one comma-joined,
/// newline-terminated line per row. Null/missing cells render empty. Values
/// containing commas are not quoted (same limitation as the parser), so
/// comma-free datasets round-trip through `ingest::parse`.
pub fn dataset_to_csv(data: &Dataset) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&data.headers.join(","));
    out.push('\n');
    for row in &data.rows {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Value};
    use crate::ingest::{parse, Format};
    use crate::project::{project, DEFAULT_LABEL_FIELDS};

    #[test]
    fn test_dataset_json_shape() {
        let data = parse("Name,Score\nAlice,10\nBob,7\n", Format::Csv).unwrap();
        let bytes = dataset_to_json(&data).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            doc,
            serde_json::json!([
                {"Name": "Alice", "Score": "10"},
                {"Name": "Bob", "Score": "7"}
            ])
        );
    }

    #[test]
    fn test_chart_json_shape() {
        let data = parse("name,score\nAlice,10\nBob,7\n", Format::Csv).unwrap();
        let chart = project(&data, "", DEFAULT_LABEL_FIELDS, Some("#112233")).unwrap();
        let bytes = chart_to_json(&chart).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["labels"][0], "Alice");
        assert_eq!(doc["datasets"][0]["label"], "score");
        assert_eq!(doc["datasets"][0]["data"][0], 10.0);
        assert_eq!(doc["datasets"][0]["data"][1], 7.0);
        assert_eq!(doc["datasets"][0]["backgroundColor"], "#112233");
        assert_eq!(doc["datasets"][0]["borderWidth"], 1);
    }

    #[test]
    fn test_chart_json_missing_labels_are_null() {
        let data = parse("Name,Score\nAlice,10\n", Format::Csv).unwrap();
        let chart = project(&data, "Score", DEFAULT_LABEL_FIELDS, None).unwrap();
        let bytes = chart_to_json(&chart).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["labels"][0], serde_json::Value::Null);
    }

    #[test]
    fn test_csv_round_trip() {
        let original = parse("Name,Score\nAlice,10\nBob,7\n", Format::Csv).unwrap();
        let bytes = dataset_to_csv(&original);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Name,Score\nAlice,10\nBob,7\n");
        let reparsed = parse(&text, Format::Csv).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_csv_export_renders_null_empty() {
        let data = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Value::Null, Value::Num(2.0)]],
        );
        let text = String::from_utf8(dataset_to_csv(&data)).unwrap();
        assert_eq!(text, "a,b\n,2\n");
    }
}
