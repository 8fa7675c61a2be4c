//! Integration tests for the model crate's wire shapes.

use datalib_model::{
    Column, ColumnCatalog, FilterGroup, FilterOperator, FilterSet, FilterValue, ListPage, Logic,
    Record,
};

fn catalog() -> ColumnCatalog {
    ColumnCatalog::new(vec![
        Column::text("title", "Title"),
        Column::select("category", "Category"),
        Column::number("size_mb", "Size (MB)"),
        Column::date("uploaded_at", "Uploaded At"),
    ])
}

#[test]
fn advanced_filters_payload_round_trips_structurally() {
    let mut set = FilterSet::new();
    let g1 = set.groups()[0].id.clone();
    let r1 = set.add_rule(&g1, &catalog()).expect("rule 1");
    set.set_rule_value(&g1, &r1, FilterValue::scalar("report"))
        .expect("value 1");
    let r2 = set.add_rule(&g1, &catalog()).expect("rule 2");
    set.set_rule_field(&g1, &r2, "size_mb", &catalog())
        .expect("field 2");
    set.set_rule_operator(&g1, &r2, FilterOperator::Between, &catalog())
        .expect("operator 2");
    set.set_rule_value(&g1, &r2, FilterValue::pair("10", "100"))
        .expect("value 2");
    set.set_rule_logic(&g1, &r2, Logic::Or).expect("logic 2");

    let g2 = set.add_group();
    let r3 = set.add_rule(&g2, &catalog()).expect("rule 3");
    set.set_rule_field(&g2, &r3, "category", &catalog())
        .expect("field 3");
    set.set_rule_operator(&g2, &r3, FilterOperator::In, &catalog())
        .expect("operator 3");
    set.set_rule_value(&g2, &r3, FilterValue::list(["video", "audio"]))
        .expect("value 3");

    let json = set.to_json();
    let parsed: Vec<FilterGroup> = serde_json::from_str(&json).expect("parse payload");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed, set.groups().to_vec());
    assert_eq!(parsed[1].logic, Logic::Or);
    assert_eq!(parsed[1].rules[0].value, FilterValue::list(["video", "audio"]));
}

#[test]
fn discovered_columns_never_shadow_catalog_keys() {
    let mut merged = catalog();
    let sample: Record = serde_json::from_str(
        r#"{"title":"a","category":"video","size_mb":12,"uploaded_at":"2024-01-01","mime_type":"video/mp4","play_count":7}"#,
    )
    .expect("sample");
    let discovered = merged.merge_sample(&sample);
    assert_eq!(discovered, vec!["mime_type".to_string(), "play_count".to_string()]);
    assert_eq!(merged.get("mime_type").map(|c| c.label.as_str()), Some("Mime Type"));
    // A second probe with the same shape discovers nothing new.
    assert!(merged.merge_sample(&sample).is_empty());
}

#[test]
fn list_page_parses_real_world_payload() {
    let body = r#"{
        "data": [
            {"id": 1, "title": "clip", "tags": ["a"], "size_mb": 3.5, "missing": null}
        ],
        "pagination": {"totalPages": 2, "totalItems": 31}
    }"#;
    let page: ListPage = serde_json::from_str(body).expect("page");
    assert_eq!(page.len(), 1);
    assert_eq!(page.pagination.total_items, 31);
}
