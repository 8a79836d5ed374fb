//! Filter parsing
//!
//! Parses raw JSON filter descriptions into typed [`FilterDescription`]s
//! with size limits and operator validation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{FilterError, json_type_name};

use super::types::{FilterDescription, FilterValue, ListItem, Operator, OperatorSet, Scalar};

/// Maximum size of filter JSON in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Maximum number of fields allowed in one filter
pub const MAX_FILTER_FIELDS: usize = 50;

/// How operator sets with unexpected keys are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Unknown keys and empty operator sets are errors
    #[default]
    Strict,
    /// Unknown keys are dropped; an empty operator set compiles to `{}`
    Lenient,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Strict => write!(f, "strict"),
            ParseMode::Lenient => write!(f, "lenient"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    pub max_json_bytes: usize,
    pub max_fields: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Strict,
            max_json_bytes: MAX_FILTER_JSON_SIZE,
            max_fields: MAX_FILTER_FIELDS,
        }
    }
}

impl ParseOptions {
    pub fn lenient() -> Self {
        Self {
            mode: ParseMode::Lenient,
            ..Self::default()
        }
    }
}

/// Parse a filter description from JSON text
///
/// Validates JSON size, then the shape of every field.
pub fn parse_filter(json_str: &str, options: &ParseOptions) -> Result<FilterDescription, FilterError> {
    if json_str.len() > options.max_json_bytes {
        return Err(FilterError::TooLarge {
            max: options.max_json_bytes,
        });
    }

    let value: Value = serde_json::from_str(json_str)?;
    parse_filter_value(value, options)
}

/// Parse a filter description from an already decoded JSON value
pub fn parse_filter_value(
    value: Value,
    options: &ParseOptions,
) -> Result<FilterDescription, FilterError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(FilterError::NotAnObject {
                found: json_type_name(&other),
            });
        }
    };

    if map.len() > options.max_fields {
        return Err(FilterError::TooManyFields {
            max: options.max_fields,
            count: map.len(),
        });
    }

    let mut filter = FilterDescription::new();
    for (field, raw) in map {
        let value = parse_field(&field, raw, options.mode)?;
        filter.insert(field, value);
    }

    tracing::debug!(fields = filter.len(), mode = %options.mode, "Parsed filter");
    Ok(filter)
}

fn parse_field(field: &str, raw: Value, mode: ParseMode) -> Result<FilterValue, FilterError> {
    let value = match raw {
        Value::Array(items) => FilterValue::List(parse_list(field, items)?),
        Value::Object(ops) => FilterValue::Operators(parse_operator_set(field, ops, mode)?),
        Value::String(s) => FilterValue::Scalar(Scalar::Text(s)),
        Value::Number(n) => FilterValue::Scalar(Scalar::Number(n)),
        Value::Bool(b) => FilterValue::Scalar(Scalar::Bool(b)),
        Value::Null => FilterValue::Scalar(Scalar::Null),
    };
    Ok(value)
}

fn parse_list(field: &str, items: Vec<Value>) -> Result<Vec<ListItem>, FilterError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(ListItem::Text(s)),
            Value::Number(n) => Ok(ListItem::Number(n)),
            _ => Err(FilterError::invalid_list_item(field, index)),
        })
        .collect()
}

fn parse_operator_set(
    field: &str,
    ops: Map<String, Value>,
    mode: ParseMode,
) -> Result<OperatorSet, FilterError> {
    let mut set = OperatorSet::default();

    for (key, operand) in ops {
        let Some(operator) = Operator::from_key(&key) else {
            if mode == ParseMode::Strict {
                return Err(FilterError::unknown_operator(field, &key));
            }
            tracing::debug!(field, key = %key, "Ignoring unknown filter operator");
            continue;
        };

        match operator {
            Operator::Like => match operand {
                Value::String(s) => set.like = Some(s),
                _ => return Err(FilterError::invalid_operand(field, "like", "a string")),
            },
            Operator::In => match operand {
                Value::Array(items) => set.within = Some(parse_list(field, items)?),
                _ => {
                    return Err(FilterError::invalid_operand(
                        field,
                        "in",
                        "an array of strings or numbers",
                    ));
                }
            },
            Operator::Gt => match operand {
                Value::Number(n) => set.gt = Some(n),
                _ => return Err(FilterError::invalid_operand(field, "gt", "a number")),
            },
            Operator::Lt => match operand {
                Value::Number(n) => set.lt = Some(n),
                _ => return Err(FilterError::invalid_operand(field, "lt", "a number")),
            },
            Operator::Ne => set.ne = Some(operand),
            Operator::Eq => set.eq = Some(operand),
        }
    }

    if set.is_empty() && mode == ParseMode::Strict {
        return Err(FilterError::empty_operator_set(field));
    }

    Ok(set)
}

impl FilterDescription {
    /// Parse from JSON text with default (strict) options
    pub fn from_json(json_str: &str) -> Result<Self, FilterError> {
        parse_filter(json_str, &ParseOptions::default())
    }
}

/// Strict parsing without the field-count limit
impl<'de> Deserialize<'de> for FilterDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let options = ParseOptions {
            max_fields: usize::MAX,
            ..ParseOptions::default()
        };
        parse_filter_value(value, &options).map_err(serde::de::Error::custom)
    }
}
