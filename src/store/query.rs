//! Compound predicate evaluation
//!
//! A query is a list of `(field, value)` predicates joined by one operator.
//! `NONE` and `AND` both require every predicate; `OR` requires any.
//!
//! Evaluation: start from the full visible set (AND/NONE) or the empty set
//! (OR). For each predicate compute its match set against the *full*
//! visible set, then intersect or union it into the running result. An
//! empty predicate list selects every visible record.
//!
//! Backends plug in through [`MatchSource`], which lets the memory store
//! answer indexed fields from its secondary indexes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::record::{Record, RecordField, RecordId};

/// How predicates are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchOperator {
    #[default]
    None,
    And,
    Or,
}

impl SearchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::None => "NONE",
            SearchOperator::And => "AND",
            SearchOperator::Or => "OR",
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(SearchOperator::None),
            "AND" => Ok(SearchOperator::And),
            "OR" => Ok(SearchOperator::Or),
            other => Err(format!("unknown search operator '{}'", other)),
        }
    }
}

/// One equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: RecordField,
    pub value: String,
}

impl Predicate {
    pub fn new(field: RecordField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.field.matches(record, &self.value)
    }
}

/// A compound search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    predicates: Vec<Predicate>,
    operator: SearchOperator,
}

impl Query {
    /// Selects every visible record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(operator: SearchOperator) -> Self {
        Self {
            predicates: Vec::new(),
            operator,
        }
    }

    pub fn and() -> Self {
        Self::new(SearchOperator::And)
    }

    pub fn or() -> Self {
        Self::new(SearchOperator::Or)
    }

    /// Builds a query from `(field, value)` pairs.
    pub fn from_pairs<I, V>(pairs: I, operator: SearchOperator) -> Self
    where
        I: IntoIterator<Item = (RecordField, V)>,
        V: Into<String>,
    {
        Self {
            predicates: pairs
                .into_iter()
                .map(|(field, value)| Predicate::new(field, value))
                .collect(),
            operator,
        }
    }

    /// Adds a predicate.
    pub fn with(mut self, field: RecordField, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::new(field, value));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn operator(&self) -> SearchOperator {
        self.operator
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Supplies the visible id set and per-predicate match sets.
pub trait MatchSource {
    fn all_ids(&self) -> BTreeSet<RecordId>;

    /// Ids of the visible records matching `predicate`.
    fn matching_ids(&self, predicate: &Predicate) -> BTreeSet<RecordId>;
}

/// Linear-scan match source over materialized records.
pub struct ScanSource<'a> {
    records: &'a [Record],
}

impl<'a> ScanSource<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }
}

impl MatchSource for ScanSource<'_> {
    fn all_ids(&self) -> BTreeSet<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    fn matching_ids(&self, predicate: &Predicate) -> BTreeSet<RecordId> {
        self.records
            .iter()
            .filter(|r| predicate.matches(r))
            .map(|r| r.id)
            .collect()
    }
}

/// Evaluates queries against a `MatchSource`.
pub struct QueryEvaluator;

impl QueryEvaluator {
    /// Returns the ids selected by `query`.
    pub fn evaluate<S: MatchSource + ?Sized>(source: &S, query: &Query) -> BTreeSet<RecordId> {
        if query.is_empty() {
            return source.all_ids();
        }

        match query.operator() {
            SearchOperator::None | SearchOperator::And => {
                let mut result = source.all_ids();
                for predicate in query.predicates() {
                    if result.is_empty() {
                        break;
                    }
                    let matched = source.matching_ids(predicate);
                    result.retain(|id| matched.contains(id));
                }
                result
            }
            SearchOperator::Or => {
                let mut result = BTreeSet::new();
                for predicate in query.predicates() {
                    result.extend(source.matching_ids(predicate));
                }
                result
            }
        }
    }

    /// Picks the selected records, preserving storage order.
    pub fn select<'a>(records: &'a [Record], ids: &BTreeSet<RecordId>) -> Vec<&'a Record> {
        records.iter().filter(|r| ids.contains(&r.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordParameters, Salary};
    use chrono::NaiveDate;

    fn person(id: RecordId, first: &str, last: &str) -> Record {
        Record::new(
            id,
            RecordParameters::new(
                first,
                last,
                NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                170,
                Salary::from_units(100),
                'M',
            ),
        )
    }

    fn people() -> Vec<Record> {
        vec![
            person(1, "Jo", "Doe"),
            person(2, "Jo", "Roe"),
            person(3, "Al", "Doe"),
        ]
    }

    fn ids(set: BTreeSet<RecordId>) -> Vec<RecordId> {
        set.into_iter().collect()
    }

    #[test]
    fn test_empty_query_selects_all_regardless_of_operator() {
        let records = people();
        let source = ScanSource::new(&records);
        for op in [SearchOperator::None, SearchOperator::And, SearchOperator::Or] {
            assert_eq!(ids(QueryEvaluator::evaluate(&source, &Query::new(op))), vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_and_vs_or() {
        let records = people();
        let source = ScanSource::new(&records);

        let and = Query::and()
            .with(RecordField::FirstName, "Jo")
            .with(RecordField::LastName, "Doe");
        assert_eq!(ids(QueryEvaluator::evaluate(&source, &and)), vec![1]);

        let or = Query::or()
            .with(RecordField::FirstName, "Jo")
            .with(RecordField::LastName, "Doe");
        assert_eq!(ids(QueryEvaluator::evaluate(&source, &or)), vec![1, 2, 3]);
    }

    #[test]
    fn test_none_behaves_as_and() {
        let records = people();
        let source = ScanSource::new(&records);
        let none = Query::from_pairs(
            [(RecordField::FirstName, "jo"), (RecordField::LastName, "roe")],
            SearchOperator::None,
        );
        assert_eq!(ids(QueryEvaluator::evaluate(&source, &none)), vec![2]);
    }

    #[test]
    fn test_same_field_twice_with_and_is_empty() {
        let records = people();
        let source = ScanSource::new(&records);
        let q = Query::and()
            .with(RecordField::LastName, "Doe")
            .with(RecordField::LastName, "Roe");
        assert!(QueryEvaluator::evaluate(&source, &q).is_empty());

        let q = Query::or()
            .with(RecordField::LastName, "Doe")
            .with(RecordField::LastName, "Roe");
        assert_eq!(ids(QueryEvaluator::evaluate(&source, &q)), vec![1, 2, 3]);
    }

    #[test]
    fn test_select_keeps_storage_order() {
        let mut records = people();
        records.swap(0, 2);
        let selected = QueryEvaluator::select(&records, &[1, 3].into_iter().collect());
        let order: Vec<RecordId> = selected.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![3, 1]);
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("and".parse::<SearchOperator>().unwrap(), SearchOperator::And);
        assert_eq!("Or".parse::<SearchOperator>().unwrap(), SearchOperator::Or);
        assert_eq!("".parse::<SearchOperator>().unwrap(), SearchOperator::None);
        assert!("xor".parse::<SearchOperator>().is_err());
    }
}
