//! Query filter system
//!
//! Provides typed filter descriptions and their compilation into MongoDB
//! query documents. Fields hold literal values, literal arrays, or operator
//! sets using `like`, `in`, `gt`, `lt`, `ne` and `eq`.
//!
//! ## Usage
//!
//! ```
//! use docfilter::filters::{FilterDescription, compile};
//!
//! let json_str = r#"{"status": "active", "score": {"gt": 50}}"#;
//! let filter = FilterDescription::from_json(json_str).unwrap();
//! let query = compile(&filter, false);
//! assert_eq!(
//!     serde_json::to_string(&query).unwrap(),
//!     r#"{"deletedAt":null,"status":"active","score":{"$gt":50}}"#
//! );
//! ```

mod builder;
mod parser;
mod types;

pub use builder::{
    CompileOptions, Compiler, PatternMode, build_comparison_fragment, build_membership_fragment,
    build_pattern_fragment, compile, mongo,
};
pub use parser::{
    MAX_FILTER_FIELDS, MAX_FILTER_JSON_SIZE, ParseMode, ParseOptions, parse_filter,
    parse_filter_value,
};
pub use types::{
    Comparison, FieldQuery, FilterDescription, FilterValue, ListItem, Operator, OperatorSet,
    QueryDocument, Scalar,
};
