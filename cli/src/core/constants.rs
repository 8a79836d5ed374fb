// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "docfilter";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".docfilter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docfilter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DOCFILTER_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DOCFILTER_LOG";

// =============================================================================
// Environment Variables - Compiler
// =============================================================================

/// Environment variable for the soft-delete marker field
pub const ENV_DELETED_FIELD: &str = "DOCFILTER_DELETED_FIELD";

/// Environment variable for the `like` pattern mode (regex or literal)
pub const ENV_PATTERN_MODE: &str = "DOCFILTER_PATTERN_MODE";

// =============================================================================
// Environment Variables - Parser
// =============================================================================

/// Environment variable for the parse mode (strict or lenient)
pub const ENV_PARSE_MODE: &str = "DOCFILTER_PARSE_MODE";

/// Environment variable for the maximum filter JSON size in bytes
pub const ENV_MAX_JSON_BYTES: &str = "DOCFILTER_MAX_JSON_BYTES";

/// Environment variable for the maximum number of filter fields
pub const ENV_MAX_FIELDS: &str = "DOCFILTER_MAX_FIELDS";

// =============================================================================
// Environment Variables - Output
// =============================================================================

/// Environment variable for pretty-printed output
pub const ENV_PRETTY: &str = "DOCFILTER_PRETTY";
