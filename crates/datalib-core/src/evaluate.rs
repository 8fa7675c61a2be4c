//! Local filter evaluation for in-memory datasets.
//!
//! Where a list has no backend, filter groups are applied client-side with
//! the same operator vocabulary the `advanced_filters` parameter carries.
//! Evaluation is a strict left-to-right fold: rule 1's result is combined
//! with rule 2 using rule 2's logic, and so on; groups chain the same way.
//! There is no precedence beyond that, intentionally.
//!
//! `between` is inclusive on both bounds for numbers and dates. The
//! backend is assumed to implement the same semantics for the serialized
//! payload; nothing here cross-validates that assumption.

use datalib_model::{
    ColumnCatalog, FieldKind, FieldValue, FilterGroup, FilterOperator, FilterRule, FilterValue,
    Record,
};

use crate::flexdate;

/// Applies the groups to one record.
///
/// Empty groups are neutral (match everything); an empty group list
/// matches everything.
pub fn record_matches(record: &Record, groups: &[FilterGroup], catalog: &ColumnCatalog) -> bool {
    let mut combined: Option<bool> = None;
    for group in groups {
        let matched = group_matches(record, group, catalog);
        combined = Some(match combined {
            None => matched,
            Some(previous) => match group.logic {
                datalib_model::Logic::And => previous && matched,
                datalib_model::Logic::Or => previous || matched,
            },
        });
    }
    combined.unwrap_or(true)
}

/// Filters a record slice, preserving order.
pub fn filter_records(
    records: &[Record],
    groups: &[FilterGroup],
    catalog: &ColumnCatalog,
) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record_matches(record, groups, catalog))
        .cloned()
        .collect()
}

fn group_matches(record: &Record, group: &FilterGroup, catalog: &ColumnCatalog) -> bool {
    let mut combined: Option<bool> = None;
    for rule in &group.rules {
        let matched = rule_matches(record, rule, catalog.kind_of(&rule.field));
        combined = Some(match combined {
            None => matched,
            Some(previous) => match rule.logic {
                datalib_model::Logic::And => previous && matched,
                datalib_model::Logic::Or => previous || matched,
            },
        });
    }
    combined.unwrap_or(true)
}

fn rule_matches(record: &Record, rule: &FilterRule, kind: FieldKind) -> bool {
    let value = record.get(&rule.field);
    match rule.operator {
        FilterOperator::IsEmpty => value.is_none_or(FieldValue::is_empty),
        FilterOperator::IsNotEmpty => value.is_some_and(|v| !v.is_empty()),
        _ => match value {
            None => false,
            Some(value) => match kind {
                FieldKind::Number => number_matches(value, rule),
                FieldKind::Date => date_matches(value, rule),
                FieldKind::Text | FieldKind::Select => text_matches(value, rule),
            },
        },
    }
}

/// Text and select comparisons.
///
/// Substring-style operators compare case-insensitively the way the search
/// box does; equality is exact after trimming. List-valued fields match
/// when any element matches.
fn text_matches(value: &FieldValue, rule: &FilterRule) -> bool {
    let candidates: Vec<String> = match value {
        FieldValue::List(items) => items.clone(),
        other => vec![other.render()],
    };
    let any = |test: &dyn Fn(&str) -> bool| candidates.iter().any(|c| test(c.trim()));

    match (&rule.operator, &rule.value) {
        (FilterOperator::Contains, FilterValue::Scalar(needle)) => {
            let needle = needle.trim().to_lowercase();
            any(&|c| c.to_lowercase().contains(&needle))
        }
        (FilterOperator::NotContains, FilterValue::Scalar(needle)) => {
            let needle = needle.trim().to_lowercase();
            !any(&|c| c.to_lowercase().contains(&needle))
        }
        (FilterOperator::StartsWith, FilterValue::Scalar(prefix)) => {
            let prefix = prefix.trim().to_lowercase();
            any(&|c| c.to_lowercase().starts_with(&prefix))
        }
        (FilterOperator::EndsWith, FilterValue::Scalar(suffix)) => {
            let suffix = suffix.trim().to_lowercase();
            any(&|c| c.to_lowercase().ends_with(&suffix))
        }
        (FilterOperator::Equals, FilterValue::Scalar(expected)) => {
            any(&|c| c == expected.trim())
        }
        (FilterOperator::NotEquals, FilterValue::Scalar(expected)) => {
            !any(&|c| c == expected.trim())
        }
        (FilterOperator::In, FilterValue::List(options)) => {
            any(&|c| options.iter().any(|option| option.trim() == c))
        }
        (FilterOperator::NotIn, FilterValue::List(options)) => {
            !any(&|c| options.iter().any(|option| option.trim() == c))
        }
        _ => false,
    }
}

fn number_matches(value: &FieldValue, rule: &FilterRule) -> bool {
    let Some(actual) = value.as_number() else {
        return false;
    };
    let scalar = |raw: &str| raw.trim().parse::<f64>().ok();
    match (&rule.operator, &rule.value) {
        (FilterOperator::Equals, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|expected| actual == expected)
        }
        (FilterOperator::NotEquals, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|expected| actual != expected)
        }
        (FilterOperator::Greater, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|bound| actual > bound)
        }
        (FilterOperator::GreaterEqual, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|bound| actual >= bound)
        }
        (FilterOperator::Less, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|bound| actual < bound)
        }
        (FilterOperator::LessEqual, FilterValue::Scalar(raw)) => {
            scalar(raw).is_some_and(|bound| actual <= bound)
        }
        (FilterOperator::Between, FilterValue::Pair(low, high)) => {
            match (scalar(low), scalar(high)) {
                (Some(low), Some(high)) => low <= actual && actual <= high,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Date comparisons. Records whose field does not parse as a date are
/// excluded from every range operator: unknown dates never match.
fn date_matches(value: &FieldValue, rule: &FilterRule) -> bool {
    let Some(actual) = flexdate::parse_value(value) else {
        return false;
    };
    let bound = |raw: &str| flexdate::parse_flexible(raw);
    match (&rule.operator, &rule.value) {
        (FilterOperator::Equals, FilterValue::Scalar(raw)) => {
            bound(raw).is_some_and(|expected| actual == expected)
        }
        (FilterOperator::NotEquals, FilterValue::Scalar(raw)) => {
            bound(raw).is_some_and(|expected| actual != expected)
        }
        (FilterOperator::Before, FilterValue::Scalar(raw)) => {
            bound(raw).is_some_and(|edge| actual < edge)
        }
        (FilterOperator::After, FilterValue::Scalar(raw)) => {
            bound(raw).is_some_and(|edge| actual > edge)
        }
        (FilterOperator::Between, FilterValue::Pair(low, high)) => {
            match (bound(low), bound(high)) {
                (Some(low), Some(high)) => low <= actual && actual <= high,
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalib_model::{Column, FilterSet, Logic};

    fn catalog() -> ColumnCatalog {
        ColumnCatalog::new(vec![
            Column::text("city", "City"),
            Column::select("category", "Category"),
            Column::number("count", "Count"),
            Column::date("logged_at", "Logged At"),
        ])
    }

    fn records() -> Vec<Record> {
        serde_json::from_str(
            r#"[
                {"city": "Berlin", "category": "video", "count": 5, "logged_at": "01/03/2024"},
                {"city": "Bergen", "category": "audio", "count": 15, "logged_at": "15/03/2024"},
                {"city": "", "category": "video", "count": 50, "logged_at": "not a date"}
            ]"#,
        )
        .expect("records")
    }

    /// Builds a one-group set from (field, operator, value, logic) tuples.
    fn set_of(rules: &[(&str, FilterOperator, FilterValue, Logic)]) -> FilterSet {
        let catalog = catalog();
        let mut set = FilterSet::new();
        let group_id = set.groups()[0].id.clone();
        for (field, operator, value, logic) in rules {
            let rule_id = set.add_rule(&group_id, &catalog).expect("rule");
            set.set_rule_field(&group_id, &rule_id, field, &catalog)
                .expect("field");
            set.set_rule_operator(&group_id, &rule_id, *operator, &catalog)
                .expect("operator");
            set.set_rule_value(&group_id, &rule_id, value.clone())
                .expect("value");
            set.set_rule_logic(&group_id, &rule_id, *logic).expect("logic");
        }
        set
    }

    #[test]
    fn contains_is_case_insensitive() {
        let set = set_of(&[(
            "city",
            FilterOperator::Contains,
            FilterValue::scalar("BER"),
            Logic::And,
        )]);
        let matched = filter_records(&records(), set.groups(), &catalog());
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn sequential_reduction_has_no_precedence() {
        // contains "Berlin" OR count > 10 AND category equals "video":
        // evaluated left to right this is ((berlin OR >10) AND video).
        let set = set_of(&[
            (
                "city",
                FilterOperator::Contains,
                FilterValue::scalar("berlin"),
                Logic::And,
            ),
            (
                "count",
                FilterOperator::Greater,
                FilterValue::scalar("10"),
                Logic::Or,
            ),
            (
                "category",
                FilterOperator::Equals,
                FilterValue::scalar("video"),
                Logic::And,
            ),
        ]);
        let matched = filter_records(&records(), set.groups(), &catalog());
        let cities: Vec<String> = matched.iter().map(|r| r["city"].render()).collect();
        // Berlin matches (berlin, video); Bergen fails the trailing AND;
        // the third record matches (>10, video).
        assert_eq!(cities, vec!["Berlin".to_string(), String::new()]);
    }

    #[test]
    fn between_is_inclusive_on_both_bounds() {
        let set = set_of(&[(
            "count",
            FilterOperator::Between,
            FilterValue::pair("5", "15"),
            Logic::And,
        )]);
        let matched = filter_records(&records(), set.groups(), &catalog());
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn date_ranges_exclude_unparseable_dates() {
        let set = set_of(&[(
            "logged_at",
            FilterOperator::Between,
            FilterValue::pair("01/01/2024", "31/12/2024"),
            Logic::And,
        )]);
        let matched = filter_records(&records(), set.groups(), &catalog());
        // The "not a date" record is excluded even though the range is wide.
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn is_empty_matches_missing_and_blank() {
        let set = set_of(&[(
            "city",
            FilterOperator::IsEmpty,
            FilterValue::None,
            Logic::And,
        )]);
        let matched = filter_records(&records(), set.groups(), &catalog());
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn groups_chain_left_to_right() {
        let catalog = catalog();
        let mut set = set_of(&[(
            "category",
            FilterOperator::Equals,
            FilterValue::scalar("video"),
            Logic::And,
        )]);
        let second = set.add_group();
        let rule_id = set.add_rule(&second, &catalog).expect("rule");
        set.set_rule_field(&second, &rule_id, "count", &catalog)
            .expect("field");
        set.set_rule_operator(&second, &rule_id, FilterOperator::GreaterEqual, &catalog)
            .expect("operator");
        set.set_rule_value(&second, &rule_id, FilterValue::scalar("10"))
            .expect("value");

        // video OR count >= 10.
        let matched = filter_records(&records(), set.groups(), &catalog);
        assert_eq!(matched.len(), 3);

        set.set_group_logic(&second, Logic::And).expect("logic");
        let matched = filter_records(&records(), set.groups(), &catalog);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn empty_groups_match_everything() {
        let set = FilterSet::new();
        let matched = filter_records(&records(), set.groups(), &catalog());
        assert_eq!(matched.len(), 3);
    }
}
