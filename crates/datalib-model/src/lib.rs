pub mod column;
pub mod error;
pub mod filter;
pub mod page;
pub mod value;
pub mod view;

pub use column::{Column, ColumnCatalog, FieldKind, humanize_key};
pub use error::{ModelError, Result};
pub use filter::{
    FilterGroup, FilterOperator, FilterRule, FilterSet, FilterValue, Logic, ValueArity,
};
pub use page::{ListPage, Pagination};
pub use value::{FieldValue, Record, record_id};
pub use view::{SortDirection, SortSpec, ViewConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rule_still_serializes_into_the_payload() {
        let catalog = ColumnCatalog::new(vec![Column::text("city", "City")]);
        let mut set = FilterSet::new();
        let group_id = set.groups()[0].id.clone();
        let rule_id = set.add_rule(&group_id, &catalog).expect("add rule");
        set.set_rule_operator(&group_id, &rule_id, FilterOperator::IsEmpty, &catalog)
            .expect("set operator");
        let json = set.to_json();
        assert!(json.contains(r#""operator":"is_empty""#));
        assert!(json.contains(r#""value":null"#));
    }

    #[test]
    fn view_defaults_compose() {
        let view = ViewConfig::new("media", "Media Log")
            .with_base_filter("type", "video")
            .with_default_sort(SortSpec::desc("created_at"))
            .with_default_group_by("category");
        assert_eq!(view.default_sort.as_ref().map(|s| s.field.as_str()), Some("created_at"));
        assert_eq!(view.default_group_by.as_deref(), Some("category"));
    }
}
