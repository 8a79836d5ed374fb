//! # docfilter
//!
//! Compiles store-agnostic filter descriptions into MongoDB query documents.
//!
//! A filter maps field names to literal values, literal arrays, or operator
//! sets (`like`, `in`, `gt`, `lt`, `ne`, `eq`). Compilation adds a
//! `{ "deletedAt": null }` clause so soft-deleted records are excluded
//! unless the caller asks for them.
//!
//! ```
//! use docfilter::{FilterDescription, OperatorSet, compile};
//! use serde_json::json;
//!
//! let filter = FilterDescription::new()
//!     .value("status", "active")
//!     .operators("email", OperatorSet::new().like("@x.com"));
//!
//! assert_eq!(
//!     compile(&filter, false),
//!     json!({
//!         "deletedAt": null,
//!         "status": "active",
//!         "email": {"$regex": "@x.com", "$options": "i"}
//!     })
//! );
//! ```
//!
//! The crate only builds query documents. Running them is left to the
//! caller's database driver.

pub mod error;
pub mod filters;

pub use error::FilterError;
pub use filters::{
    CompileOptions, Compiler, FieldQuery, FilterDescription, FilterValue, ListItem, Operator,
    OperatorSet, ParseMode, ParseOptions, PatternMode, QueryDocument, Scalar, compile, parse_filter,
};
