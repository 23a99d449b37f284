//! Boolean filter expressions over chunk metadata.
//!
//! Filters arrive as JSON in the vector store's `where` dialect (the shape
//! the filter synthesizer is prompted to produce): field equality,
//! `{"field": {"$in": [...]}}` membership, and `$and`/`$or` combinators.
//! A filter is created fresh per query and never persisted.
//!
//! The orchestrator does not second-guess field names or values: an
//! unknown metadata key simply matches nothing locally, and a remote store
//! that rejects the filter surfaces [`AppError::InvalidFilter`].

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::{AppError, Result};

/// A boolean predicate tree over chunk metadata fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// Field equals a scalar value.
    Eq(String, Value),
    /// Field value is one of the listed scalars.
    In(String, Vec<Value>),
    /// All sub-filters match.
    And(Vec<FilterExpression>),
    /// At least one sub-filter matches.
    Or(Vec<FilterExpression>),
}

impl FilterExpression {
    /// Parse a filter from its JSON wire form.
    ///
    /// An empty object is not a valid filter here; callers map `{}` to
    /// "no filter" before parsing (an empty filter must never behave as a
    /// match-nothing predicate).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidFilter`] for shapes outside the supported
    /// dialect (non-objects, unknown operators, empty combinator lists).
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::InvalidFilter(format!("expected a JSON object, got {}", value)))?;

        if obj.is_empty() {
            return Err(AppError::InvalidFilter(
                "empty object is 'no filter', not a predicate".to_string(),
            ));
        }

        let mut clauses = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            clauses.push(Self::parse_clause(key, val)?);
        }

        // Multiple sibling keys combine conjunctively.
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Self::And(clauses))
        }
    }

    fn parse_clause(key: &str, val: &Value) -> Result<Self> {
        match key {
            "$and" | "$or" => {
                let arr = val.as_array().ok_or_else(|| {
                    AppError::InvalidFilter(format!("{} expects an array of filters", key))
                })?;
                if arr.is_empty() {
                    return Err(AppError::InvalidFilter(format!("{} with no operands", key)));
                }
                let subs = arr
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>>>()?;
                Ok(if key == "$and" {
                    Self::And(subs)
                } else {
                    Self::Or(subs)
                })
            }
            _ => match val {
                Value::Object(op) => match (op.len(), op.iter().next()) {
                    (1, Some((op_name, operand))) => match op_name.as_str() {
                        "$eq" => Ok(Self::Eq(key.to_string(), operand.clone())),
                        "$in" => {
                            let values = operand.as_array().ok_or_else(|| {
                                AppError::InvalidFilter(format!(
                                    "$in on '{}' expects an array",
                                    key
                                ))
                            })?;
                            Ok(Self::In(key.to_string(), values.clone()))
                        }
                        other => Err(AppError::InvalidFilter(format!(
                            "unsupported operator '{}' on field '{}'",
                            other, key
                        ))),
                    },
                    _ => Err(AppError::InvalidFilter(format!(
                        "field '{}' expects exactly one operator",
                        key
                    ))),
                },
                Value::Array(_) => Err(AppError::InvalidFilter(format!(
                    "field '{}' compares against a scalar, not an array",
                    key
                ))),
                scalar => Ok(Self::Eq(key.to_string(), scalar.clone())),
            },
        }
    }

    /// Serialize back into the store's `where` dialect.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Eq(field, value) => {
                let mut obj = Map::new();
                obj.insert(field.clone(), value.clone());
                Value::Object(obj)
            }
            Self::In(field, values) => {
                let mut op = Map::new();
                op.insert("$in".to_string(), Value::Array(values.clone()));
                let mut obj = Map::new();
                obj.insert(field.clone(), Value::Object(op));
                Value::Object(obj)
            }
            Self::And(subs) => {
                let mut obj = Map::new();
                obj.insert(
                    "$and".to_string(),
                    Value::Array(subs.iter().map(Self::to_value).collect()),
                );
                Value::Object(obj)
            }
            Self::Or(subs) => {
                let mut obj = Map::new();
                obj.insert(
                    "$or".to_string(),
                    Value::Array(subs.iter().map(Self::to_value).collect()),
                );
                Value::Object(obj)
            }
        }
    }

    /// Evaluate the predicate against a flat metadata map.
    ///
    /// A field absent from the map never matches; equality on `applies_to`
    /// compares the whole comma-joined string, mirroring the store's
    /// scalar semantics.
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        match self {
            Self::Eq(field, value) => metadata.get(field) == Some(value),
            Self::In(field, values) => metadata
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Self::And(subs) => subs.iter().all(|f| f.matches(metadata)),
            Self::Or(subs) => subs.iter().any(|f| f.matches(metadata)),
        }
    }
}

impl std::fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}
