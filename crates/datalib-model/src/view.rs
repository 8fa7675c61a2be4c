//! View presets and sort/group direction types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort (and group-label) direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// A field plus direction; absent entirely when sorting is off ("none").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A named filter/sort preset selectable as a tab.
///
/// Views are mutually exclusive; exactly one is active per list instance.
/// Base filters are field -> value equality constraints merged with (never
/// replaced by) the user's advanced filters. A value of `"all"` (or blank)
/// deactivates the constraint without removing the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub id: String,
    pub name: String,
    /// Ordered so that parameter output stays deterministic.
    #[serde(default)]
    pub base_filters: Vec<(String, String)>,
    #[serde(default)]
    pub default_sort: Option<SortSpec>,
    #[serde(default)]
    pub default_group_by: Option<String>,
}

impl ViewConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_filters: Vec::new(),
            default_sort: None,
            default_group_by: None,
        }
    }

    pub fn with_base_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_filters.push((field.into(), value.into()));
        self
    }

    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn with_default_group_by(mut self, field: impl Into<String>) -> Self {
        self.default_group_by = Some(field.into());
        self
    }

    /// Base-filter entries that actually constrain the query: value present
    /// and not the `"all"` sentinel.
    pub fn active_base_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.base_filters
            .iter()
            .filter(|(_, value)| !value.trim().is_empty() && value.as_str() != "all")
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_base_filters_are_inactive() {
        let view = ViewConfig::new("recent", "Recent")
            .with_base_filter("status", "active")
            .with_base_filter("category", "all")
            .with_base_filter("owner", "  ");
        let active: Vec<_> = view.active_base_filters().collect();
        assert_eq!(active, vec![("status", "active")]);
    }
}
