//! Column catalogs: static declarations merged with discovered fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::value::{FieldValue, Record};

/// The broad type of a field, which fixes the filter operators offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Select,
    Number,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Select => "select",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldKind::Text),
            "select" => Ok(FieldKind::Select),
            "number" => Ok(FieldKind::Number),
            "date" => Ok(FieldKind::Date),
            other => Err(ModelError::UnknownColumn(other.to_string())),
        }
    }
}

/// One table column.
///
/// Columns come from three places: the static catalog a view declares, keys
/// discovered by sampling one live record, and user-added custom columns.
/// Only custom columns may be deleted; the rest can merely be hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub is_custom: bool,
}

fn default_true() -> bool {
    true
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            sortable: true,
            filterable: true,
            editable: false,
            is_custom: false,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn select(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Select)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }
}

/// The merged set of columns known to a view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
}

impl ColumnCatalog {
    /// Builds a catalog from static declarations.
    ///
    /// Duplicate keys are uniquified by suffixing a counter, so insertion
    /// never fails and never silently drops a column.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut catalog = Self::default();
        for column in columns {
            catalog.push(column);
        }
        catalog
    }

    fn push(&mut self, mut column: Column) -> String {
        column.key = self.unique_key(&column.key);
        let key = column.key.clone();
        self.columns.push(column);
        key
    }

    fn unique_key(&self, wanted: &str) -> String {
        if !self.contains_key(wanted) {
            return wanted.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{wanted}_{counter}");
            if !self.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.columns.iter().any(|column| column.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// First column a new filter rule may target.
    pub fn first_filterable(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.filterable)
    }

    /// The field kind for a key; unknown keys fall back to text so filter
    /// edits against stale catalogs stay usable.
    pub fn kind_of(&self, key: &str) -> FieldKind {
        self.get(key).map(|column| column.kind).unwrap_or_default()
    }

    /// Merges fields discovered from one sampled record.
    ///
    /// Keys already in the catalog are left untouched. Discovered columns
    /// get a humanized label, a kind inferred from the sampled value, and
    /// default to sortable, non-editable, non-custom.
    pub fn merge_sample(&mut self, sample: &Record) -> Vec<String> {
        let mut discovered = Vec::new();
        for (key, value) in sample {
            if self.contains_key(key) {
                continue;
            }
            let column = Column {
                key: key.clone(),
                label: humanize_key(key),
                kind: infer_kind(value),
                sortable: true,
                filterable: true,
                editable: false,
                is_custom: false,
            };
            discovered.push(self.push(column));
        }
        discovered
    }

    /// Adds a user-defined column and returns its (uniquified) key.
    pub fn add_custom(&mut self, label: impl Into<String>) -> String {
        let label = label.into();
        let column = Column {
            key: slug_key(&label),
            label,
            kind: FieldKind::Text,
            sortable: false,
            filterable: false,
            editable: true,
            is_custom: true,
        };
        self.push(column)
    }

    /// Deletes a custom column. Static and discovered columns can only be
    /// hidden, never removed.
    pub fn remove(&mut self, key: &str) -> Result<(), ModelError> {
        let index = self
            .columns
            .iter()
            .position(|column| column.key == key)
            .ok_or_else(|| ModelError::UnknownColumn(key.to_string()))?;
        if !self.columns[index].is_custom {
            return Err(ModelError::NotRemovable(key.to_string()));
        }
        self.columns.remove(index);
        Ok(())
    }
}

fn infer_kind(value: &FieldValue) -> FieldKind {
    match value {
        FieldValue::Number(_) => FieldKind::Number,
        FieldValue::Bool(_) | FieldValue::List(_) => FieldKind::Select,
        FieldValue::Text(_) | FieldValue::Null => FieldKind::Text,
    }
}

/// Turns a raw field key into a display label: underscores become spaces,
/// a space is inserted before interior capitals, words are title-cased.
///
/// `extra_field` -> "Extra Field", `createdAt` -> "Created At".
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' {
            spaced.push(' ');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            spaced.push(' ');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        spaced.push(ch);
    }
    spaced
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn slug_key(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let collapsed: Vec<&str> = slug.split('_').filter(|part| !part.is_empty()).collect();
    if collapsed.is_empty() {
        "custom".to_string()
    } else {
        collapsed.join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_get_counter_suffixes() {
        let catalog = ColumnCatalog::new(vec![
            Column::text("city", "City"),
            Column::text("city", "City Again"),
            Column::text("city", "City Thrice"),
        ]);
        let keys: Vec<_> = catalog.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["city", "city_2", "city_3"]);
    }

    #[test]
    fn sample_merge_discovers_new_fields_only() {
        let mut catalog =
            ColumnCatalog::new(vec![Column::text("city", "City"), Column::text("country", "Country")]);
        let sample: Record = serde_json::from_str(
            r#"{"city":"X","country":"Y","extra_field":"Z"}"#,
        )
        .expect("sample record");
        let discovered = catalog.merge_sample(&sample);
        assert_eq!(discovered, vec!["extra_field".to_string()]);
        let extra = catalog.get("extra_field").expect("discovered column");
        assert_eq!(extra.label, "Extra Field");
        assert!(extra.sortable);
        assert!(!extra.editable);
        assert!(!extra.is_custom);
    }

    #[test]
    fn humanize_handles_underscores_and_camel_case() {
        assert_eq!(humanize_key("extra_field"), "Extra Field");
        assert_eq!(humanize_key("createdAt"), "Created At");
        assert_eq!(humanize_key("id"), "Id");
    }

    #[test]
    fn custom_columns_are_removable_static_are_not() {
        let mut catalog = ColumnCatalog::new(vec![Column::text("city", "City")]);
        let key = catalog.add_custom("My Notes");
        assert_eq!(key, "my_notes");
        assert!(catalog.remove(&key).is_ok());
        assert!(matches!(
            catalog.remove("city"),
            Err(ModelError::NotRemovable(_))
        ));
    }

    #[test]
    fn custom_labels_slug_and_uniquify() {
        let mut catalog = ColumnCatalog::new(vec![Column::text("notes", "Notes")]);
        let key = catalog.add_custom("Notes");
        assert_eq!(key, "notes_2");
    }
}
