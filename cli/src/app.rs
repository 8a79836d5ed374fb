//! Core application

use anyhow::{Context, Result};

use docfilter::{Compiler, FilterDescription, FilterValue, Operator, parse_filter};

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::utils::file::read_input;

pub struct CoreApp {
    pub config: AppConfig,
    compiler: Compiler,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let config = AppConfig::load(&cli_config)?;
        let app = Self::new(config);

        let command = command.unwrap_or(Commands::Compile {
            input: None,
            include_deleted: false,
        });

        let output = match command {
            Commands::Compile {
                input,
                include_deleted,
            } => {
                let raw = read_input(input.as_deref())?;
                app.compile_str(&raw, include_deleted)?
            }
            Commands::Check { input } => {
                let raw = read_input(input.as_deref())?;
                app.check_str(&raw)?
            }
        };

        println!("{}", output);
        Ok(())
    }

    pub fn new(config: AppConfig) -> Self {
        let compiler = Compiler::new(config.compile_options());
        Self { config, compiler }
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=warn", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stdout carries the query document; logs go to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    fn parse(&self, raw: &str) -> Result<FilterDescription> {
        parse_filter(raw, &self.config.parse_options()).map_err(|e| {
            let code = e.code();
            anyhow::Error::new(e).context(format!("Invalid filter ({})", code))
        })
    }

    /// Parse and compile raw filter JSON, returning the rendered query document
    pub fn compile_str(&self, raw: &str, include_deleted: bool) -> Result<String> {
        let filter = self.parse(raw)?;
        let query = self.compiler.compile(&filter, include_deleted);

        let rendered = if self.config.output.pretty {
            serde_json::to_string_pretty(&query)
        } else {
            serde_json::to_string(&query)
        };
        rendered.context("Failed to serialize query document")
    }

    /// Parse raw filter JSON and describe how each field compiles
    pub fn check_str(&self, raw: &str) -> Result<String> {
        let filter = self.parse(raw)?;

        let mut lines: Vec<String> = filter
            .iter()
            .map(|(field, value)| {
                let kind = value.classify().kind();
                match value {
                    FilterValue::Operators(ops) => {
                        let effective = join_operators(&ops.effective_operators());
                        let mut line = format!("{}: {} [{}]", field, kind, effective);
                        let shadowed = ops.shadowed_operators();
                        if !shadowed.is_empty() {
                            line.push_str(&format!(" (ignored: {})", join_operators(&shadowed)));
                        }
                        line
                    }
                    _ => format!("{}: {}", field, kind),
                }
            })
            .collect();
        lines.push(format!(
            "{} field(s) OK ({} mode)",
            filter.len(),
            self.config.parser.mode
        ));
        Ok(lines.join("\n"))
    }
}

fn join_operators(operators: &[Operator]) -> String {
    operators
        .iter()
        .map(|op| op.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfilter::{ParseMode, PatternMode};

    fn app() -> CoreApp {
        CoreApp::new(AppConfig::default())
    }

    #[test]
    fn test_compile_str_default() {
        let output = app()
            .compile_str(r#"{"status": "active", "score": {"gt": 50, "lt": 90}}"#, false)
            .unwrap();
        assert_eq!(
            output,
            r#"{"deletedAt":null,"status":"active","score":{"$gt":50,"$lt":90}}"#
        );
    }

    #[test]
    fn test_compile_str_include_deleted() {
        let output = app().compile_str("{}", true).unwrap();
        assert_eq!(output, "{}");
    }

    #[test]
    fn test_compile_str_pretty() {
        let mut config = AppConfig::default();
        config.output.pretty = true;
        let output = CoreApp::new(config).compile_str(r#"{"a": 1}"#, false).unwrap();
        assert_eq!(output, "{\n  \"deletedAt\": null,\n  \"a\": 1\n}");
    }

    #[test]
    fn test_compile_str_uses_compiler_config() {
        let mut config = AppConfig::default();
        config.compiler.deleted_field = "removedAt".to_string();
        config.compiler.pattern_mode = PatternMode::Literal;
        let output = CoreApp::new(config)
            .compile_str(r#"{"email": {"like": "a.b"}}"#, false)
            .unwrap();
        assert_eq!(
            output,
            r#"{"removedAt":null,"email":{"$regex":"a\\.b","$options":"i"}}"#
        );
    }

    #[test]
    fn test_compile_str_strict_error_has_code() {
        let err = app()
            .compile_str(r#"{"price": {"gte": 10}}"#, false)
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("UNKNOWN_FILTER_OPERATOR"));
        assert!(message.contains("Unknown operator 'gte' on field 'price'"));
    }

    #[test]
    fn test_compile_str_lenient() {
        let mut config = AppConfig::default();
        config.parser.mode = ParseMode::Lenient;
        let output = CoreApp::new(config)
            .compile_str(r#"{"price": {"gte": 10}}"#, true)
            .unwrap();
        assert_eq!(output, r#"{"price":{}}"#);
    }

    #[test]
    fn test_check_str() {
        let output = app()
            .check_str(r#"{"status": "active", "tags": ["a"], "name": {"like": "jo", "in": ["x"]}}"#)
            .unwrap();
        assert_eq!(
            output,
            "status: literal\ntags: literal\nname: pattern [like] (ignored: in)\n3 field(s) OK (strict mode)"
        );
    }

    #[test]
    fn test_check_str_lists_effective_operators() {
        let output = app()
            .check_str(r#"{"score": {"gt": 50, "lt": 90}, "id": {"in": [1], "ne": 2}}"#)
            .unwrap();
        assert_eq!(
            output,
            "score: comparison [gt, lt]\nid: membership [in] (ignored: ne)\n2 field(s) OK (strict mode)"
        );
    }

    #[test]
    fn test_check_str_invalid() {
        assert!(app().check_str("[]").is_err());
    }
}
