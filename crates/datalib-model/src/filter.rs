//! Advanced filter rules and groups.
//!
//! A filter set is an ordered list of groups; a group is an ordered list of
//! rules. Each rule and each group carries the AND/OR conjunction that joins
//! it to its *predecessor*, so evaluation is a strict left-to-right
//! reduction with no precedence. The first rule's (and first group's) logic
//! is ignored.
//!
//! The set itself never evaluates anything against the backend: it
//! serializes to the `advanced_filters` JSON parameter and the API applies
//! the predicates. The in-memory evaluator in `datalib-core` implements the
//! same operator vocabulary for local datasets.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::column::{ColumnCatalog, FieldKind};
use crate::error::ModelError;

/// Conjunction joining a rule or group to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter predicate operator.
///
/// Which operators are offered depends on the field kind; see
/// [`FilterOperator::for_kind`]. The serialized names are the wire contract
/// for the `advanced_filters` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    In,
    NotIn,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Between,
    Before,
    After,
}

/// How many operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// No operand (`is_empty`, `is_not_empty`).
    None,
    /// One scalar operand.
    Scalar,
    /// A low/high pair (`between`).
    Pair,
    /// A list of candidates (`in`, `not_in`).
    List,
}

const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Contains,
    FilterOperator::NotContains,
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

const SELECT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::In,
    FilterOperator::NotIn,
];

const NUMBER_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::Greater,
    FilterOperator::GreaterEqual,
    FilterOperator::Less,
    FilterOperator::LessEqual,
    FilterOperator::Between,
];

const DATE_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::Before,
    FilterOperator::After,
    FilterOperator::Between,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

impl FilterOperator {
    /// Operators offered for a field kind, in menu order.
    pub fn for_kind(kind: FieldKind) -> &'static [FilterOperator] {
        match kind {
            FieldKind::Text => TEXT_OPERATORS,
            FieldKind::Select => SELECT_OPERATORS,
            FieldKind::Number => NUMBER_OPERATORS,
            FieldKind::Date => DATE_OPERATORS,
        }
    }

    /// The operator a freshly retargeted rule falls back to.
    pub fn default_for(kind: FieldKind) -> FilterOperator {
        Self::for_kind(kind)[0]
    }

    pub fn is_compatible(&self, kind: FieldKind) -> bool {
        Self::for_kind(kind).contains(self)
    }

    pub fn arity(&self) -> ValueArity {
        match self {
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty => ValueArity::None,
            FilterOperator::Between => ValueArity::Pair,
            FilterOperator::In | FilterOperator::NotIn => ValueArity::List,
            _ => ValueArity::Scalar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Greater => "greater",
            FilterOperator::GreaterEqual => "greater_equal",
            FilterOperator::Less => "less",
            FilterOperator::LessEqual => "less_equal",
            FilterOperator::Between => "between",
            FilterOperator::Before => "before",
            FilterOperator::After => "after",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| ModelError::IncompatibleOperator {
                operator: s.to_string(),
                kind: "any".to_string(),
            })
    }
}

/// Operand of a filter rule.
///
/// Serialized forms: `None` -> `null`, `Scalar` -> a string, `List` -> an
/// array of strings, `Pair` -> `{"from": ..., "to": ...}` (an object keeps
/// pairs distinguishable from two-element lists).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    #[default]
    None,
    Scalar(String),
    Pair(String, String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FilterValue::Scalar(value.into())
    }

    pub fn pair(from: impl Into<String>, to: impl Into<String>) -> Self {
        FilterValue::Pair(from.into(), to.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FilterValue::None)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::None => serializer.serialize_none(),
            FilterValue::Scalar(value) => serializer.serialize_str(value),
            FilterValue::Pair(from, to) => {
                let mut s = serializer.serialize_struct("FilterValue", 2)?;
                s.serialize_field("from", from)?;
                s.serialize_field("to", to)?;
                s.end()
            }
            FilterValue::List(values) => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(FilterValue::None),
            serde_json::Value::String(s) => Ok(FilterValue::Scalar(s)),
            serde_json::Value::Number(n) => Ok(FilterValue::Scalar(n.to_string())),
            serde_json::Value::Array(items) => Ok(FilterValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            serde_json::Value::Object(map) => {
                let part = |key: &str| {
                    map.get(key)
                        .map(|v| match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_default()
                };
                Ok(FilterValue::Pair(part("from"), part("to")))
            }
            serde_json::Value::Bool(b) => Ok(FilterValue::Scalar(b.to_string())),
        }
    }
}

/// One predicate: field, operator, operand, and the conjunction to the
/// previous rule in the same group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub id: String,
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: FilterValue,
    #[serde(default)]
    pub logic: Logic,
}

/// An ordered run of rules plus the conjunction to the previous group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub id: String,
    pub rules: Vec<FilterRule>,
    #[serde(default)]
    pub logic: Logic,
}

impl FilterGroup {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The full advanced-filter state of one list view.
///
/// Invariant: at least one group always exists; removing the last group is a
/// no-op. Ids are opaque tokens minted from a per-set counter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    groups: Vec<FilterGroup>,
    next_id: u64,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterSet {
    /// One empty AND group.
    pub fn new() -> Self {
        let mut set = Self {
            groups: Vec::new(),
            next_id: 1,
        };
        let id = set.mint("g");
        set.groups.push(FilterGroup {
            id,
            rules: Vec::new(),
            logic: Logic::And,
        });
        set
    }

    fn mint(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// True when any group holds at least one rule; gates the
    /// `advanced_filters` parameter.
    pub fn has_rules(&self) -> bool {
        self.groups.iter().any(|group| !group.is_empty())
    }

    pub fn total_rules(&self) -> usize {
        self.groups.iter().map(|group| group.rules.len()).sum()
    }

    /// Appends a rule to a group with the default operator (`contains`) and
    /// the first filterable column as its field. Returns the new rule's id.
    pub fn add_rule(&mut self, group_id: &str, catalog: &ColumnCatalog) -> Result<String, ModelError> {
        let field = catalog
            .first_filterable()
            .ok_or(ModelError::NoFilterableColumn)?
            .key
            .clone();
        let id = self.mint("r");
        let group = self.group_mut(group_id)?;
        group.rules.push(FilterRule {
            id: id.clone(),
            field,
            operator: FilterOperator::Contains,
            value: FilterValue::None,
            logic: Logic::And,
        });
        Ok(id)
    }

    pub fn remove_rule(&mut self, group_id: &str, rule_id: &str) -> Result<(), ModelError> {
        let group = self.group_mut(group_id)?;
        let index = group
            .rules
            .iter()
            .position(|rule| rule.id == rule_id)
            .ok_or_else(|| ModelError::UnknownRule(rule_id.to_string()))?;
        group.rules.remove(index);
        Ok(())
    }

    /// Retargets a rule to another field, resetting operator and value.
    pub fn set_rule_field(
        &mut self,
        group_id: &str,
        rule_id: &str,
        field: &str,
        catalog: &ColumnCatalog,
    ) -> Result<(), ModelError> {
        let kind = catalog.kind_of(field);
        let rule = self.rule_mut(group_id, rule_id)?;
        rule.field = field.to_string();
        rule.operator = FilterOperator::default_for(kind);
        rule.value = FilterValue::None;
        Ok(())
    }

    /// Changes a rule's operator, resetting its value. The operator must be
    /// compatible with the field's kind.
    pub fn set_rule_operator(
        &mut self,
        group_id: &str,
        rule_id: &str,
        operator: FilterOperator,
        catalog: &ColumnCatalog,
    ) -> Result<(), ModelError> {
        let rule = self.rule_mut(group_id, rule_id)?;
        let kind = catalog.kind_of(&rule.field);
        if !operator.is_compatible(kind) {
            return Err(ModelError::IncompatibleOperator {
                operator: operator.as_str().to_string(),
                kind: kind.as_str().to_string(),
            });
        }
        rule.operator = operator;
        rule.value = FilterValue::None;
        Ok(())
    }

    pub fn set_rule_value(
        &mut self,
        group_id: &str,
        rule_id: &str,
        value: FilterValue,
    ) -> Result<(), ModelError> {
        self.rule_mut(group_id, rule_id)?.value = value;
        Ok(())
    }

    pub fn set_rule_logic(
        &mut self,
        group_id: &str,
        rule_id: &str,
        logic: Logic,
    ) -> Result<(), ModelError> {
        self.rule_mut(group_id, rule_id)?.logic = logic;
        Ok(())
    }

    /// Appends a new empty group, OR-joined to the previous one. Returns
    /// the new group's id.
    pub fn add_group(&mut self) -> String {
        let id = self.mint("g");
        self.groups.push(FilterGroup {
            id: id.clone(),
            rules: Vec::new(),
            logic: Logic::Or,
        });
        id
    }

    /// Removes a group. Removing the only remaining group is a no-op and
    /// returns false.
    pub fn remove_group(&mut self, group_id: &str) -> bool {
        if self.groups.len() <= 1 {
            return false;
        }
        let before = self.groups.len();
        self.groups.retain(|group| group.id != group_id);
        self.groups.len() < before
    }

    pub fn set_group_logic(&mut self, group_id: &str, logic: Logic) -> Result<(), ModelError> {
        self.group_mut(group_id)?.logic = logic;
        Ok(())
    }

    /// Collapses back to a single empty AND group.
    pub fn clear(&mut self) {
        self.groups.clear();
        let id = self.mint("g");
        self.groups.push(FilterGroup {
            id,
            rules: Vec::new(),
            logic: Logic::And,
        });
    }

    /// The `advanced_filters` payload: the group list as a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.groups).unwrap_or_else(|_| "[]".to_string())
    }

    /// Rebuilds a set from a serialized group list, e.g. a saved view.
    pub fn from_groups(groups: Vec<FilterGroup>) -> Self {
        if groups.is_empty() {
            return Self::new();
        }
        Self {
            groups,
            // Minted ids restart high enough to avoid colliding with
            // whatever scheme produced the loaded ids.
            next_id: 1_000,
        }
    }

    fn group_mut(&mut self, group_id: &str) -> Result<&mut FilterGroup, ModelError> {
        self.groups
            .iter_mut()
            .find(|group| group.id == group_id)
            .ok_or_else(|| ModelError::UnknownGroup(group_id.to_string()))
    }

    fn rule_mut(&mut self, group_id: &str, rule_id: &str) -> Result<&mut FilterRule, ModelError> {
        self.group_mut(group_id)?
            .rules
            .iter_mut()
            .find(|rule| rule.id == rule_id)
            .ok_or_else(|| ModelError::UnknownRule(rule_id.to_string()))
    }
}
