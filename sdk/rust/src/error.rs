//! Error type for filter parsing
//!
//! Compiling a typed [`FilterDescription`](crate::FilterDescription) never
//! fails. Every error here comes from turning raw JSON into one.

use thiserror::Error;

/// Errors raised while parsing a raw filter description
#[derive(Error, Debug)]
pub enum FilterError {
    /// Input is not valid JSON
    #[error("Invalid filter JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level value is not a JSON object
    #[error("Filter must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// Raw JSON exceeds the configured byte limit
    #[error("Filter JSON exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    /// Filter names more fields than allowed
    #[error("Maximum {max} filter fields allowed, got {count}")]
    TooManyFields { max: usize, count: usize },

    /// Operator set contains a key outside like/in/gt/lt/ne/eq
    #[error("Unknown operator '{key}' on field '{field}'")]
    UnknownOperator { field: String, key: String },

    /// Operator set has none of the recognized keys
    #[error("Operator set on field '{field}' has no recognized operator")]
    EmptyOperatorSet { field: String },

    /// Operator value has the wrong JSON type
    #[error("Operator '{operator}' on field '{field}' expects {expected}")]
    InvalidOperand {
        field: String,
        operator: &'static str,
        expected: &'static str,
    },

    /// List element is neither text nor a number
    #[error("Element {index} of list on field '{field}' must be text or a number")]
    InvalidListItem { field: String, index: usize },
}

impl FilterError {
    pub fn unknown_operator(field: &str, key: &str) -> Self {
        Self::UnknownOperator {
            field: field.to_string(),
            key: key.to_string(),
        }
    }

    pub fn empty_operator_set(field: &str) -> Self {
        Self::EmptyOperatorSet {
            field: field.to_string(),
        }
    }

    pub fn invalid_operand(field: &str, operator: &'static str, expected: &'static str) -> Self {
        Self::InvalidOperand {
            field: field.to_string(),
            operator,
            expected,
        }
    }

    pub fn invalid_list_item(field: &str, index: usize) -> Self {
        Self::InvalidListItem {
            field: field.to_string(),
            index,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "INVALID_FILTER_JSON",
            Self::NotAnObject { .. } => "FILTER_NOT_OBJECT",
            Self::TooLarge { .. } => "FILTER_JSON_TOO_LARGE",
            Self::TooManyFields { .. } => "TOO_MANY_FILTER_FIELDS",
            Self::UnknownOperator { .. } => "UNKNOWN_FILTER_OPERATOR",
            Self::EmptyOperatorSet { .. } => "EMPTY_OPERATOR_SET",
            Self::InvalidOperand { .. } => "INVALID_OPERAND",
            Self::InvalidListItem { .. } => "INVALID_LIST_ITEM",
        }
    }

    /// Field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownOperator { field, .. }
            | Self::EmptyOperatorSet { field }
            | Self::InvalidOperand { field, .. }
            | Self::InvalidListItem { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
