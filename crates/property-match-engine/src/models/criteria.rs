use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::{FieldValue, Record};

/// Separator between alternatives of a substring criterion ("ペット可|駐車場").
pub const OR_SEPARATOR: char = '|';

/// Per-field match rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    /// Stored value must equal this value.
    Exact { value: FieldValue },
    /// Stored text must contain the needle (or any `|`-separated alternative).
    Contains { needle: String },
    /// Stored value must parse as a number within the inclusive bounds.
    Range { min: Option<f64>, max: Option<f64> },
}

impl Criterion {
    pub fn exact(value: impl Into<FieldValue>) -> Self {
        Criterion::Exact {
            value: value.into(),
        }
    }

    pub fn contains(needle: impl Into<String>) -> Self {
        Criterion::Contains {
            needle: needle.into(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Criterion::Range { min, max }
    }

    pub fn at_most(max: f64) -> Self {
        Criterion::Range {
            min: None,
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Criterion::Range {
            min: Some(min),
            max: None,
        }
    }

    /// Test a single stored value. A missing field never matches.
    pub fn matches(&self, stored: Option<&FieldValue>) -> bool {
        let Some(stored) = stored else {
            return false;
        };

        match self {
            Criterion::Range { min, max } => {
                // Unparseable values fail the criterion; filtering continues for other records
                let Some(number) = stored.as_number() else {
                    return false;
                };
                if min.is_some_and(|min| number < min) {
                    return false;
                }
                if max.is_some_and(|max| number > max) {
                    return false;
                }
                true
            }
            Criterion::Contains { needle } => {
                let haystack = stored.to_string();
                if !needle.contains(OR_SEPARATOR) {
                    return haystack.contains(needle.as_str());
                }
                needle
                    .split(OR_SEPARATOR)
                    .map(str::trim)
                    .filter(|alternative| !alternative.is_empty())
                    .any(|alternative| haystack.contains(alternative))
            }
            Criterion::Exact { value } => match (value, stored) {
                (FieldValue::Text(expected), FieldValue::Text(actual)) => expected == actual,
                (FieldValue::Number(expected), FieldValue::Number(actual)) => expected == actual,
                // Whole-text parse: "3LDK" is not the number 3
                (FieldValue::Number(number), FieldValue::Text(text))
                | (FieldValue::Text(text), FieldValue::Number(number)) => {
                    text.trim().parse::<f64>().ok() == Some(*number)
                }
            },
        }
    }
}

/// Field name -> criterion; a record satisfies the set iff it satisfies every member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaSet {
    criteria: BTreeMap<String, Criterion>,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.insert(field, criterion);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, criterion: Criterion) {
        self.criteria.insert(field.into(), criterion);
    }

    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.criteria.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.criteria
            .iter()
            .all(|(field, criterion)| criterion.matches(record.get(field)))
    }
}
