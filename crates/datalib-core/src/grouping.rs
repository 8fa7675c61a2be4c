//! Client-side grouping of the current page.
//!
//! Grouping buckets the already-paginated records by a field value; it
//! never spans pages. Labels are ordered lexicographically, rows keep
//! their input order within each bucket.

use std::collections::BTreeMap;

use datalib_model::{Record, SortDirection};

/// Records without a usable group value land under this label.
pub const UNGROUPED_LABEL: &str = "Ungrouped";

/// One bucket of the grouped page. `label` is `None` only for the single
/// pass-through group produced when grouping is off.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGroup {
    pub label: Option<String>,
    pub rows: Vec<Record>,
}

/// The grouped rendering of one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedPage {
    pub groups: Vec<PageGroup>,
}

impl GroupedPage {
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(|group| group.rows.len()).sum()
    }
}

/// Groups a page's records by a field.
///
/// `group_by` of `None` or the `"none"` sentinel returns one unlabeled
/// group holding all records in input order, so re-grouping by "none" is
/// idempotent.
pub fn group_page(
    records: &[Record],
    group_by: Option<&str>,
    direction: SortDirection,
) -> GroupedPage {
    let key = match group_by {
        Some(key) if key != "none" && !key.is_empty() => key,
        _ => {
            return GroupedPage {
                groups: vec![PageGroup {
                    label: None,
                    rows: records.to_vec(),
                }],
            };
        }
    };

    // BTreeMap gives lexicographic label order; insertion order inside a
    // bucket preserves input order.
    let mut buckets: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        let label = match record.get(key) {
            Some(value) if !value.is_empty() => value.render(),
            _ => UNGROUPED_LABEL.to_string(),
        };
        buckets.entry(label).or_default().push(record.clone());
    }

    let mut groups: Vec<PageGroup> = buckets
        .into_iter()
        .map(|(label, rows)| PageGroup {
            label: Some(label),
            rows,
        })
        .collect();
    if direction == SortDirection::Desc {
        groups.reverse();
    }
    GroupedPage { groups }
}
