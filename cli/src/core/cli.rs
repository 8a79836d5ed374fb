use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

use std::path::PathBuf;

use docfilter::{ParseMode, PatternMode};

use super::constants::{
    ENV_CONFIG, ENV_DELETED_FIELD, ENV_MAX_FIELDS, ENV_MAX_JSON_BYTES, ENV_PARSE_MODE,
    ENV_PATTERN_MODE, ENV_PRETTY,
};

#[derive(Parser, Debug)]
#[command(name = "docfilter")]
#[command(version, about = "Compile filter descriptions into MongoDB queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Soft-delete marker field added as `{ <field>: null }`
    #[arg(long, global = true, env = ENV_DELETED_FIELD)]
    pub deleted_field: Option<String>,

    /// How `like` text becomes a regex (regex or literal)
    #[arg(long, global = true, env = ENV_PATTERN_MODE, value_parser = parse_pattern_mode)]
    pub pattern_mode: Option<PatternMode>,

    /// How unknown operators are handled (strict or lenient)
    #[arg(long, global = true, env = ENV_PARSE_MODE, value_parser = parse_parse_mode)]
    pub parse_mode: Option<ParseMode>,

    /// Maximum filter JSON size in bytes
    #[arg(long, global = true, env = ENV_MAX_JSON_BYTES)]
    pub max_json_bytes: Option<usize>,

    /// Maximum number of filter fields
    #[arg(long, global = true, env = ENV_MAX_FIELDS)]
    pub max_fields: Option<usize>,

    /// Pretty-print the query document (`--pretty=false` overrides config)
    #[arg(
        long,
        global = true,
        env = ENV_PRETTY,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub pretty: Option<bool>,
}

/// Parse pattern mode from CLI/env string
fn parse_pattern_mode(s: &str) -> Result<PatternMode, String> {
    match s.to_lowercase().as_str() {
        "regex" => Ok(PatternMode::Regex),
        "literal" => Ok(PatternMode::Literal),
        _ => Err(format!(
            "Invalid pattern mode '{}'. Valid options: regex, literal",
            s
        )),
    }
}

/// Parse parse mode from CLI/env string
fn parse_parse_mode(s: &str) -> Result<ParseMode, String> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ParseMode::Strict),
        "lenient" => Ok(ParseMode::Lenient),
        _ => Err(format!(
            "Invalid parse mode '{}'. Valid options: strict, lenient",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Compile a filter into a query document (default command)
    Compile {
        /// Filter JSON file (`-` or omitted reads stdin)
        input: Option<PathBuf>,

        /// Keep soft-deleted records (omit the exclusion clause)
        #[arg(long)]
        include_deleted: bool,
    },
    /// Validate a filter and summarize how each field compiles
    Check {
        /// Filter JSON file (`-` or omitted reads stdin)
        input: Option<PathBuf>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub deleted_field: Option<String>,
    pub pattern_mode: Option<PatternMode>,
    pub parse_mode: Option<ParseMode>,
    pub max_json_bytes: Option<usize>,
    pub max_fields: Option<usize>,
    pub pretty: Option<bool>,
}

/// Split parsed arguments into config and command
fn into_parts(cli: Cli) -> (CliConfig, Option<Commands>) {
    let config = CliConfig {
        config: cli.config,
        deleted_field: cli.deleted_field,
        pattern_mode: cli.pattern_mode,
        parse_mode: cli.parse_mode,
        max_json_bytes: cli.max_json_bytes,
        max_fields: cli.max_fields,
        pretty: cli.pretty,
    };
    (config, cli.command)
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    into_parts(Cli::parse())
}
