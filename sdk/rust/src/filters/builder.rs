//! Query document builder
//!
//! Compiles typed filter descriptions into MongoDB query documents.
//! Includes the operator names of the target syntax.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{Comparison, FieldQuery, FilterDescription, ListItem, QueryDocument};

/// MongoDB operator names used in compiled fragments
pub mod mongo {
    pub const REGEX: &str = "$regex";
    pub const OPTIONS: &str = "$options";
    pub const CASE_INSENSITIVE: &str = "i";
    pub const IN: &str = "$in";
    pub const GT: &str = "$gt";
    pub const LT: &str = "$lt";
    pub const NE: &str = "$ne";
    pub const EQ: &str = "$eq";

    /// Soft-delete marker field; `null` means "not deleted"
    pub const DEFAULT_DELETED_FIELD: &str = "deletedAt";
}

/// How `like` text is turned into a `$regex` pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Text is used verbatim as a regular expression
    #[default]
    Regex,
    /// Regex metacharacters are escaped (substring match)
    Literal,
}

impl fmt::Display for PatternMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternMode::Regex => write!(f, "regex"),
            PatternMode::Literal => write!(f, "literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub deleted_field: String,
    pub pattern_mode: PatternMode,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            deleted_field: mongo::DEFAULT_DELETED_FIELD.to_string(),
            pattern_mode: PatternMode::default(),
        }
    }
}

/// Filter compiler
///
/// Stateless apart from its options; one instance can serve any number of
/// callers.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a filter description into a query document
    ///
    /// Unless `include_deleted` is set, the document starts with
    /// `{ <deleted_field>: null }`. Each field then contributes exactly one
    /// entry. A field named like the soft-delete marker overwrites it.
    pub fn compile(&self, filter: &FilterDescription, include_deleted: bool) -> QueryDocument {
        let mut query = QueryDocument::new();
        if !include_deleted {
            query.insert(self.options.deleted_field.clone(), Value::Null);
        }

        for (field, value) in filter.iter() {
            let classified = value.classify();
            tracing::trace!(field, kind = classified.kind(), "Compiling filter field");
            query.insert(field.to_string(), self.render(classified));
        }

        tracing::debug!(
            fields = filter.len(),
            include_deleted,
            deleted_field = %self.options.deleted_field,
            "Compiled filter"
        );
        query
    }

    /// Render one classified field as its query value
    pub fn render(&self, query: FieldQuery) -> Value {
        match query {
            FieldQuery::Literal(value) => value,
            FieldQuery::PatternMatch(pattern) => {
                build_pattern_fragment(&pattern, self.options.pattern_mode)
            }
            FieldQuery::MembershipTest(items) => build_membership_fragment(&items),
            FieldQuery::ComparisonSet(comparison) => build_comparison_fragment(comparison),
        }
    }
}

/// Compile with default options (`deletedAt` marker, verbatim patterns)
pub fn compile(filter: &FilterDescription, include_deleted: bool) -> QueryDocument {
    Compiler::default().compile(filter, include_deleted)
}

/// Build `{ "$regex": <pattern>, "$options": "i" }`
pub fn build_pattern_fragment(pattern: &str, mode: PatternMode) -> Value {
    let pattern = match mode {
        PatternMode::Regex => pattern.to_string(),
        PatternMode::Literal => regex::escape(pattern),
    };

    let mut fragment = Map::new();
    fragment.insert(mongo::REGEX.to_string(), Value::String(pattern));
    fragment.insert(
        mongo::OPTIONS.to_string(),
        Value::String(mongo::CASE_INSENSITIVE.to_string()),
    );
    Value::Object(fragment)
}

/// Build `{ "$in": [...] }`
pub fn build_membership_fragment(items: &[ListItem]) -> Value {
    let mut fragment = Map::new();
    fragment.insert(
        mongo::IN.to_string(),
        Value::Array(items.iter().map(ListItem::to_json).collect()),
    );
    Value::Object(fragment)
}

/// Build `{ "$gt"?, "$lt"?, "$ne"?, "$eq"? }` from the present operands only
pub fn build_comparison_fragment(comparison: Comparison) -> Value {
    let mut fragment = Map::new();
    if let Some(n) = comparison.gt {
        fragment.insert(mongo::GT.to_string(), Value::Number(n));
    }
    if let Some(n) = comparison.lt {
        fragment.insert(mongo::LT.to_string(), Value::Number(n));
    }
    if let Some(v) = comparison.ne {
        fragment.insert(mongo::NE.to_string(), v);
    }
    if let Some(v) = comparison.eq {
        fragment.insert(mongo::EQ.to_string(), v);
    }
    Value::Object(fragment)
}
