//! Filter type definitions
//!
//! Defines the typed filter description accepted by the compiler and the
//! query document it produces.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Recognized operator keys of an operator set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Like,
    In,
    Gt,
    Lt,
    Ne,
    Eq,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Like,
        Operator::In,
        Operator::Gt,
        Operator::Lt,
        Operator::Ne,
        Operator::Eq,
    ];

    /// Resolve an operator key. Accepts both `like` and `$like` spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        let bare = key.strip_prefix('$').unwrap_or(key);
        match bare {
            "like" => Some(Self::Like),
            "in" => Some(Self::In),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "ne" => Some(Self::Ne),
            "eq" => Some(Self::Eq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::In => "in",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Ne => "ne",
            Self::Eq => "eq",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal scalar matched by value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`, as in `serde_json`.
impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

/// Element of a list value or of an `in` operand
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Text(String),
    Number(Number),
}

impl ListItem {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl From<&str> for ListItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ListItem {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ListItem {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for ListItem {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<Number> for ListItem {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

fn list_to_json(items: &[ListItem]) -> Value {
    Value::Array(items.iter().map(ListItem::to_json).collect())
}

/// Operator set attached to a single field
///
/// Holds at most one operand per recognized key. Classification picks
/// `like` first, then `in`, and otherwise combines `gt`/`lt`/`ne`/`eq`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSet {
    pub like: Option<String>,
    /// The `in` operand
    pub within: Option<Vec<ListItem>>,
    pub gt: Option<Number>,
    pub lt: Option<Number>,
    /// `Some(Value::Null)` is a real `ne: null` operand, not an absent key
    pub ne: Option<Value>,
    pub eq: Option<Value>,
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn like(mut self, pattern: impl Into<String>) -> Self {
        self.like = Some(pattern.into());
        self
    }

    pub fn within<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ListItem>,
    {
        self.within = Some(items.into_iter().map(Into::into).collect());
        self
    }

    pub fn gt(mut self, bound: impl Into<Number>) -> Self {
        self.gt = Some(bound.into());
        self
    }

    pub fn lt(mut self, bound: impl Into<Number>) -> Self {
        self.lt = Some(bound.into());
        self
    }

    /// Set the `ne` operand
    pub fn not_equal(mut self, value: impl Into<Value>) -> Self {
        self.ne = Some(value.into());
        self
    }

    /// Set the `eq` operand
    pub fn equals(mut self, value: impl Into<Value>) -> Self {
        self.eq = Some(value.into());
        self
    }

    /// True when none of the six operators is present
    pub fn is_empty(&self) -> bool {
        self.like.is_none()
            && self.within.is_none()
            && self.gt.is_none()
            && self.lt.is_none()
            && self.ne.is_none()
            && self.eq.is_none()
    }

    /// Operators present in this set, in declaration order
    pub fn operators(&self) -> Vec<Operator> {
        Operator::ALL
            .into_iter()
            .filter(|op| match op {
                Operator::Like => self.like.is_some(),
                Operator::In => self.within.is_some(),
                Operator::Gt => self.gt.is_some(),
                Operator::Lt => self.lt.is_some(),
                Operator::Ne => self.ne.is_some(),
                Operator::Eq => self.eq.is_some(),
            })
            .collect()
    }

    /// Operators that shape the compiled fragment
    ///
    /// `like` shadows every other key, and `in` shadows the comparisons.
    pub fn effective_operators(&self) -> Vec<Operator> {
        if self.like.is_some() {
            return vec![Operator::Like];
        }
        if self.within.is_some() {
            return vec![Operator::In];
        }
        self.operators()
    }

    /// Present operators that the compiled fragment drops
    pub fn shadowed_operators(&self) -> Vec<Operator> {
        let effective = self.effective_operators();
        self.operators()
            .into_iter()
            .filter(|op| !effective.contains(op))
            .collect()
    }

    /// Pick the single query shape this set compiles to (first match wins)
    pub fn classify(&self) -> FieldQuery {
        if let Some(pattern) = &self.like {
            return FieldQuery::PatternMatch(pattern.clone());
        }
        if let Some(items) = &self.within {
            return FieldQuery::MembershipTest(items.clone());
        }
        FieldQuery::ComparisonSet(Comparison {
            gt: self.gt.clone(),
            lt: self.lt.clone(),
            ne: self.ne.clone(),
            eq: self.eq.clone(),
        })
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(pattern) = &self.like {
            map.insert(Operator::Like.to_string(), Value::String(pattern.clone()));
        }
        if let Some(items) = &self.within {
            map.insert(Operator::In.to_string(), list_to_json(items));
        }
        if let Some(n) = &self.gt {
            map.insert(Operator::Gt.to_string(), Value::Number(n.clone()));
        }
        if let Some(n) = &self.lt {
            map.insert(Operator::Lt.to_string(), Value::Number(n.clone()));
        }
        if let Some(v) = &self.ne {
            map.insert(Operator::Ne.to_string(), v.clone());
        }
        if let Some(v) = &self.eq {
            map.insert(Operator::Eq.to_string(), v.clone());
        }
        Value::Object(map)
    }
}

/// Value attached to a field of a filter description
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Matched by equality
    Scalar(Scalar),
    /// Passed through as a literal array (not a membership test)
    List(Vec<ListItem>),
    Operators(OperatorSet),
}

impl FilterValue {
    pub fn classify(&self) -> FieldQuery {
        match self {
            Self::Scalar(s) => FieldQuery::Literal(s.to_json()),
            Self::List(items) => FieldQuery::Literal(list_to_json(items)),
            Self::Operators(ops) => ops.classify(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(s) => s.to_json(),
            Self::List(items) => list_to_json(items),
            Self::Operators(ops) => ops.to_json(),
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<ListItem>> for FilterValue {
    fn from(value: Vec<ListItem>) -> Self {
        Self::List(value)
    }
}

impl From<OperatorSet> for FilterValue {
    fn from(value: OperatorSet) -> Self {
        Self::Operators(value)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Comparison operands that survive classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub gt: Option<Number>,
    pub lt: Option<Number>,
    pub ne: Option<Value>,
    pub eq: Option<Value>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.lt.is_none() && self.ne.is_none() && self.eq.is_none()
    }
}

/// Query shape of one field after classification
#[derive(Debug, Clone, PartialEq)]
pub enum FieldQuery {
    /// Scalar or array copied through unchanged
    Literal(Value),
    /// Case-insensitive pattern match from `like`
    PatternMatch(String),
    /// Set membership from `in`
    MembershipTest(Vec<ListItem>),
    /// Combined `gt`/`lt`/`ne`/`eq` comparison, possibly empty
    ComparisonSet(Comparison),
}

impl FieldQuery {
    /// Short label used in logs and CLI summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::PatternMatch(_) => "pattern",
            Self::MembershipTest(_) => "membership",
            Self::ComparisonSet(_) => "comparison",
        }
    }
}

/// Ordered mapping from field name to filter value
///
/// Field names are unique; inserting an existing name replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDescription {
    fields: IndexMap<String, FilterValue>,
}

impl FilterDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Add an equality field
    pub fn value(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        let scalar: Scalar = value.into();
        self.insert(field, scalar);
        self
    }

    /// Add a literal array field
    pub fn list<I, T>(mut self, field: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ListItem>,
    {
        let items: Vec<ListItem> = items.into_iter().map(Into::into).collect();
        self.insert(field, items);
        self
    }

    /// Add an operator-set field
    pub fn operators(mut self, field: impl Into<String>, ops: OperatorSet) -> Self {
        self.insert(field, ops);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterDescription {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (field, value) in iter {
            filter.insert(field, value);
        }
        filter
    }
}

impl Serialize for FilterDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}

/// Compiled query document, ready to hand to a MongoDB driver
///
/// Key order follows the filter description. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryDocument(Map<String, Value>);

impl QueryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, field: String, value: Value) {
        self.0.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<QueryDocument> for Value {
    fn from(doc: QueryDocument) -> Self {
        Value::Object(doc.0)
    }
}

impl PartialEq<Value> for QueryDocument {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(map) if *map == self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_from_key_accepts_both_spellings() {
        assert_eq!(Operator::from_key("like"), Some(Operator::Like));
        assert_eq!(Operator::from_key("$like"), Some(Operator::Like));
        assert_eq!(Operator::from_key("$in"), Some(Operator::In));
        assert_eq!(Operator::from_key("gte"), None);
        assert_eq!(Operator::from_key("$$gt"), None);
    }

    #[test]
    fn like_wins_over_in() {
        let ops = OperatorSet::new().like("jo").within(["x"]);
        assert_eq!(ops.classify(), FieldQuery::PatternMatch("jo".to_string()));
    }

    #[test]
    fn in_wins_over_comparisons() {
        let ops = OperatorSet::new().within([1, 2]).gt(0);
        assert_eq!(
            ops.classify(),
            FieldQuery::MembershipTest(vec![ListItem::from(1), ListItem::from(2)])
        );
    }

    #[test]
    fn comparisons_keep_only_present_keys() {
        let ops = OperatorSet::new().gt(10).not_equal(Value::Null);
        let FieldQuery::ComparisonSet(cmp) = ops.classify() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.gt, Some(Number::from(10)));
        assert!(cmp.lt.is_none());
        assert_eq!(cmp.ne, Some(Value::Null));
        assert!(cmp.eq.is_none());
    }

    #[test]
    fn empty_operator_set_classifies_as_empty_comparison() {
        let ops = OperatorSet::new();
        assert!(ops.is_empty());
        let FieldQuery::ComparisonSet(cmp) = ops.classify() else {
            panic!("expected comparison");
        };
        assert!(cmp.is_empty());
    }

    #[test]
    fn operators_lists_present_keys_in_order() {
        let ops = OperatorSet::new().equals(1).like("a").lt(3);
        assert_eq!(
            ops.operators(),
            vec![Operator::Like, Operator::Lt, Operator::Eq]
        );
    }

    #[test]
    fn equality_builders_set_operands() {
        let ops = OperatorSet::new().equals("x").not_equal(2);
        assert_eq!(ops.eq, Some(json!("x")));
        assert_eq!(ops.ne, Some(json!(2)));
        assert!(ops == ops.clone());
        assert!(ops != OperatorSet::new());
    }

    #[test]
    fn shadowed_operators_follow_precedence() {
        let ops = OperatorSet::new().like("jo").within(["x"]).gt(1);
        assert_eq!(ops.effective_operators(), vec![Operator::Like]);
        assert_eq!(ops.shadowed_operators(), vec![Operator::In, Operator::Gt]);

        let ops = OperatorSet::new().within([1]).lt(5).equals(2);
        assert_eq!(ops.effective_operators(), vec![Operator::In]);
        assert_eq!(ops.shadowed_operators(), vec![Operator::Lt, Operator::Eq]);

        let ops = OperatorSet::new().gt(1).lt(5);
        assert_eq!(ops.effective_operators(), vec![Operator::Gt, Operator::Lt]);
        assert!(ops.shadowed_operators().is_empty());
    }

    #[test]
    fn list_value_classifies_as_literal_array() {
        let value = FilterValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(value.classify(), FieldQuery::Literal(json!(["a", "b"])));
        assert_eq!(value.classify().kind(), "literal");
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
        assert_eq!(Scalar::from(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn insert_replaces_existing_field_in_place() {
        let filter = FilterDescription::new()
            .value("a", 1)
            .value("b", 2)
            .value("a", "x");
        let names: Vec<_> = filter.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(filter.get("a"), Some(&FilterValue::Scalar("x".into())));
    }

    #[test]
    fn filter_description_serializes_with_bare_keys() {
        let filter = FilterDescription::new()
            .value("status", "active")
            .list("tags", ["a"])
            .operators("score", OperatorSet::new().gt(50).lt(90));
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            json!({"status": "active", "tags": ["a"], "score": {"gt": 50, "lt": 90}})
        );
    }

    #[test]
    fn query_document_compares_with_json() {
        let mut doc = QueryDocument::new();
        doc.insert("deletedAt".to_string(), Value::Null);
        assert_eq!(doc, json!({"deletedAt": null}));
        assert_ne!(doc, json!([]));
        assert_eq!(Value::from(doc), json!({"deletedAt": null}));
    }
}
