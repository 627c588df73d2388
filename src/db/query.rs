//! Field filters over schema-less documents.
//!
//! Filters mirror the hosted store's `where(field, op, value)` clauses. A
//! document lacking the field never matches, including for `!=`.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use super::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    NotNull,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Eq, value.into())
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Ne, value.into())
    }

    pub fn lt(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Lt, value.into())
    }

    pub fn lte(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Lte, value.into())
    }

    pub fn gt(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Gt, value.into())
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Gte, value.into())
    }

    /// `where(field, "!=", null)`: the field is present and non-null.
    pub fn not_null(field: &str) -> Self {
        Self::new(field, Op::NotNull, Value::Null)
    }

    fn new(field: &str, op: Op, value: Value) -> Self {
        Filter {
            field: field.to_string(),
            op,
            value,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        match self.op {
            Op::NotNull => !actual.is_null(),
            Op::Eq => values_equal(actual, &self.value),
            Op::Ne => !actual.is_null() && !values_equal(actual, &self.value),
            Op::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            Op::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Op::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            Op::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// A collection read with optional filters, all of which must match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn collection(name: &str) -> Self {
        Query {
            collection: name.to_string(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.collection == self.collection && self.filters.iter().all(|f| f.matches(doc))
    }
}

/// Numbers compare numerically so `1` equals `1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

/// Range comparison is defined only between two numbers or two strings.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(data: Value) -> Document {
        Document {
            id: "d1".to_string(),
            collection: "expenses".to_string(),
            data: data.as_object().cloned().unwrap_or_default(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_eq_compares_numbers_numerically() {
        let d = doc(json!({"amount": 100}));
        assert!(Filter::eq("amount", 100.0).matches(&d));
        assert!(!Filter::eq("amount", 99).matches(&d));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let d = doc(json!({"amount": 100}));
        assert!(!Filter::eq("accountId", "ACC-1000").matches(&d));
        assert!(!Filter::ne("accountId", "ACC-1000").matches(&d));
        assert!(!Filter::not_null("accountId").matches(&d));
    }

    #[test]
    fn test_not_null_excludes_explicit_null() {
        assert!(!Filter::not_null("accountId").matches(&doc(json!({"accountId": null}))));
        assert!(Filter::not_null("accountId").matches(&doc(json!({"accountId": "ACC-1"}))));
    }

    #[test]
    fn test_date_strings_range() {
        let d = doc(json!({"date": "2026-02-14"}));
        assert!(Filter::gte("date", "2026-02-01").matches(&d));
        assert!(Filter::lt("date", "2026-03-01").matches(&d));
        assert!(!Filter::gt("date", "2026-02-14").matches(&d));
        assert!(Filter::lte("date", "2026-02-14").matches(&d));
    }

    #[test]
    fn test_mixed_types_do_not_range_match() {
        let d = doc(json!({"amount": "100"}));
        assert!(!Filter::gt("amount", 5).matches(&d));
    }

    #[test]
    fn test_dotted_path() {
        let d = doc(json!({"address": {"city": "Oslo"}}));
        assert!(Filter::eq("address.city", "Oslo").matches(&d));
    }

    #[test]
    fn test_query_checks_collection_and_all_filters() {
        let d = doc(json!({"category": "Travel", "amount": 40}));
        let q = Query::collection("expenses")
            .filter(Filter::eq("category", "Travel"))
            .filter(Filter::gt("amount", 10));
        assert!(q.matches(&d));
        assert!(!Query::collection("earnings").matches(&d));
        assert!(!q.clone().filter(Filter::gt("amount", 50)).matches(&d));
    }
}
