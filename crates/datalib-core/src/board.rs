//! Column visibility and ordering for one list view.
//!
//! The board partitions a merged catalog into an ordered Visible list and
//! an alphabetical Hidden list. Reordering is a Visible-only operation;
//! crossing the partition is a discrete toggle.

use thiserror::Error;

use datalib_model::{Column, ColumnCatalog, ModelError, Record};

#[derive(Debug, Error)]
pub enum BoardError {
    /// Saving with nothing visible would produce an unusable table.
    #[error("at least one column must remain visible")]
    EmptyVisible,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A saved column layout: the ordered visible keys.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnLayout {
    pub visible: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ColumnBoard {
    catalog: ColumnCatalog,
    visible: Vec<String>,
    hidden: Vec<String>,
}

impl ColumnBoard {
    /// Seeds the board: `visible_seed` keys (in order, filtered against the
    /// catalog) are visible; everything else is hidden, sorted by label.
    pub fn new(catalog: ColumnCatalog, visible_seed: &[String]) -> Self {
        let mut visible = Vec::new();
        for key in visible_seed {
            if catalog.contains_key(key) && !visible.contains(key) {
                visible.push(key.clone());
            }
        }
        let mut board = Self {
            catalog,
            visible,
            hidden: Vec::new(),
        };
        board.rebuild_hidden();
        board
    }

    /// Builds the board after probing one live record for extra fields.
    pub fn with_sample(
        mut catalog: ColumnCatalog,
        visible_seed: &[String],
        sample: Option<&Record>,
    ) -> Self {
        if let Some(record) = sample {
            let discovered = catalog.merge_sample(record);
            if !discovered.is_empty() {
                tracing::debug!(count = discovered.len(), "columns discovered from sample");
            }
        }
        Self::new(catalog, visible_seed)
    }

    fn rebuild_hidden(&mut self) {
        let mut hidden: Vec<&Column> = self
            .catalog
            .columns()
            .iter()
            .filter(|column| !self.visible.contains(&column.key))
            .collect();
        hidden.sort_by(|a, b| a.label.cmp(&b.label));
        self.hidden = hidden.into_iter().map(|column| column.key.clone()).collect();
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn visible_keys(&self) -> &[String] {
        &self.visible
    }

    pub fn hidden_keys(&self) -> &[String] {
        &self.hidden
    }

    /// The visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.visible
            .iter()
            .filter_map(|key| self.catalog.get(key))
            .collect()
    }

    /// Moves a column across the partition. Hiding re-sorts the hidden
    /// list by label; showing appends to the end of the visible order.
    pub fn toggle(&mut self, key: &str) -> Result<(), BoardError> {
        if !self.catalog.contains_key(key) {
            return Err(ModelError::UnknownColumn(key.to_string()).into());
        }
        if let Some(index) = self.visible.iter().position(|k| k == key) {
            self.visible.remove(index);
        } else {
            self.visible.push(key.to_string());
        }
        self.rebuild_hidden();
        Ok(())
    }

    /// Reorders within the visible partition (drag-and-drop). Out-of-range
    /// indexes are clamped no-ops.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.visible.len() || to >= self.visible.len() || from == to {
            return;
        }
        let key = self.visible.remove(from);
        self.visible.insert(to, key);
    }

    /// Adds a user-defined column; it starts visible at the end.
    pub fn add_custom(&mut self, label: impl Into<String>) -> String {
        let key = self.catalog.add_custom(label);
        self.visible.push(key.clone());
        key
    }

    /// Removes a custom column outright. Static and discovered columns are
    /// rejected; they can only be hidden.
    pub fn remove(&mut self, key: &str) -> Result<(), BoardError> {
        self.catalog.remove(key)?;
        self.visible.retain(|k| k != key);
        self.rebuild_hidden();
        Ok(())
    }

    /// Validates and returns the layout for persistence. An empty visible
    /// partition is rejected with no state change.
    pub fn save(&self) -> Result<ColumnLayout, BoardError> {
        if self.visible.is_empty() {
            tracing::warn!("column layout rejected: nothing visible");
            return Err(BoardError::EmptyVisible);
        }
        Ok(ColumnLayout {
            visible: self.visible.clone(),
        })
    }
}
