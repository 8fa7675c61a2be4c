//! Paginated API response shapes.

use serde::{Deserialize, Serialize};

use crate::value::Record;

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_pages: u32,
    pub total_items: u64,
}

/// One page of list results, superseded wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ListPage {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape_deserializes() {
        let page: ListPage = serde_json::from_str(
            r#"{"data":[{"id":1,"city":"X"}],"pagination":{"totalPages":4,"totalItems":91}}"#,
        )
        .expect("deserialize page");
        assert_eq!(page.len(), 1);
        assert_eq!(page.pagination.total_pages, 4);
        assert_eq!(page.pagination.total_items, 91);
    }

    #[test]
    fn missing_blocks_default() {
        let page: ListPage = serde_json::from_str(r#"{}"#).expect("deserialize empty");
        assert!(page.is_empty());
        assert_eq!(page.pagination.total_items, 0);
    }
}
