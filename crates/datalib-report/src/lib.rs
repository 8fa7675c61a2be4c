//! Export of the current record set, restricted to selected columns.
//!
//! Both writers take the records as displayed (already filtered and
//! paginated upstream) plus the column selection, and produce a complete
//! in-memory document. Getting the bytes to disk or into a download is the
//! caller's concern.

use thiserror::Error;

use datalib_model::{Column, Record};

#[derive(Debug, Error)]
pub enum ReportError {
    /// An export with no columns selected is rejected before any output.
    #[error("select at least one column to export")]
    NoColumns,
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json write failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Writes records as CSV: a header row of column labels, then one row per
/// record in input order. Quoting follows CSV conventions: values
/// containing commas or quotes are quoted, quotes doubled.
pub fn write_csv(records: &[Record], columns: &[&Column]) -> Result<String> {
    if columns.is_empty() {
        tracing::warn!("csv export rejected: no columns selected");
        return Err(ReportError::NoColumns);
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|column| column.label.as_str()))?;
    for record in records {
        writer.write_record(columns.iter().map(|column| {
            record
                .get(&column.key)
                .map(|value| value.render())
                .unwrap_or_default()
        }))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| ReportError::Csv(error.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes records as a pretty-printed JSON array of objects, each object
/// restricted to the selected columns (keyed by column key).
pub fn write_json(records: &[Record], columns: &[&Column]) -> Result<String> {
    if columns.is_empty() {
        tracing::warn!("json export rejected: no columns selected");
        return Err(ReportError::NoColumns);
    }
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let mut object = serde_json::Map::new();
        for column in columns {
            let value = record
                .get(&column.key)
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null);
            object.insert(column.key.clone(), value);
        }
        out.push(serde_json::Value::Object(object));
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalib_model::Column;

    fn records() -> Vec<Record> {
        serde_json::from_str(
            r#"[
                {"name": "A,B", "count": 2},
                {"name": "plain \"quoted\"", "count": 3},
                {"count": 4}
            ]"#,
        )
        .expect("records")
    }

    #[test]
    fn comma_values_are_quoted() {
        let name = Column::text("name", "Name");
        let csv = write_csv(&records(), &[&name]).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name"));
        assert_eq!(lines.next(), Some("\"A,B\""));
        assert_eq!(lines.next(), Some("\"plain \"\"quoted\"\"\""));
        // Missing fields export as empty cells.
        assert_eq!(lines.next(), Some("\"\""));
    }

    #[test]
    fn zero_columns_is_rejected() {
        assert!(matches!(write_csv(&records(), &[]), Err(ReportError::NoColumns)));
        assert!(matches!(write_json(&records(), &[]), Err(ReportError::NoColumns)));
    }

    #[test]
    fn json_is_restricted_to_selected_columns() {
        let name = Column::text("name", "Name");
        let json = write_json(&records(), &[&name]).expect("json");
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["name"], "A,B");
        assert!(parsed[0].get("count").is_none());
        assert_eq!(parsed[2]["name"], serde_json::Value::Null);
    }

    #[test]
    fn csv_snapshot_for_multiple_columns() {
        let name = Column::text("name", "Name");
        let count = Column::number("count", "Count");
        let csv = write_csv(&records(), &[&name, &count]).expect("csv");
        insta::assert_snapshot!(csv, @r###"
        Name,Count
        "A,B",2
        "plain ""quoted""",3
        ,4
        "###);
    }
}
