use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use docfilter::filters::{MAX_FILTER_FIELDS, MAX_FILTER_JSON_SIZE, mongo};
use docfilter::{CompileOptions, ParseMode, ParseOptions, PatternMode};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME};

// =============================================================================
// File Configuration (JSON)
// =============================================================================

/// Compiler configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompilerFileConfig {
    pub deleted_field: Option<String>,
    pub pattern_mode: Option<PatternMode>,
}

/// Parser configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ParserFileConfig {
    pub mode: Option<ParseMode>,
    pub max_json_bytes: Option<usize>,
    pub max_fields: Option<usize>,
}

/// Output configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputFileConfig {
    pub pretty: Option<bool>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub compiler: Option<CompilerFileConfig>,
    pub parser: Option<ParserFileConfig>,
    pub output: Option<OutputFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Names of unknown top-level fields (possible typos)
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Compiler
        if let Some(compiler) = other.compiler {
            let current = self
                .compiler
                .get_or_insert_with(CompilerFileConfig::default);
            if compiler.deleted_field.is_some() {
                tracing::trace!(deleted_field = ?compiler.deleted_field, "Merging compiler.deleted_field");
                current.deleted_field = compiler.deleted_field;
            }
            if compiler.pattern_mode.is_some() {
                tracing::trace!(pattern_mode = ?compiler.pattern_mode, "Merging compiler.pattern_mode");
                current.pattern_mode = compiler.pattern_mode;
            }
        }

        // Parser
        if let Some(parser) = other.parser {
            let current = self.parser.get_or_insert_with(ParserFileConfig::default);
            if parser.mode.is_some() {
                tracing::trace!(mode = ?parser.mode, "Merging parser.mode");
                current.mode = parser.mode;
            }
            if parser.max_json_bytes.is_some() {
                current.max_json_bytes = parser.max_json_bytes;
            }
            if parser.max_fields.is_some() {
                current.max_fields = parser.max_fields;
            }
        }

        // Output
        if let Some(output) = other.output {
            let current = self.output.get_or_insert_with(OutputFileConfig::default);
            if output.pretty.is_some() {
                current.pretty = output.pretty;
            }
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub deleted_field: String,
    pub pattern_mode: PatternMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub mode: ParseMode,
    pub max_json_bytes: usize,
    pub max_fields: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub pretty: bool,
}

/// Application configuration after layering defaults, files and CLI/env
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub compiler: CompilerConfig,
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.docfilter/docfilter.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path().as_deref())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<&Path>) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::resolve(cli, file_config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_compiler = file_config.compiler.unwrap_or_default();
        let file_parser = file_config.parser.unwrap_or_default();
        let file_output = file_config.output.unwrap_or_default();

        let deleted_field = cli
            .deleted_field
            .clone()
            .or(file_compiler.deleted_field)
            .unwrap_or_else(|| mongo::DEFAULT_DELETED_FIELD.to_string());
        if deleted_field.trim().is_empty() {
            anyhow::bail!("Soft-delete field name must not be empty");
        }

        let pattern_mode = cli
            .pattern_mode
            .or(file_compiler.pattern_mode)
            .unwrap_or_default();

        let mode = cli.parse_mode.or(file_parser.mode).unwrap_or_default();
        let max_json_bytes = cli
            .max_json_bytes
            .or(file_parser.max_json_bytes)
            .unwrap_or(MAX_FILTER_JSON_SIZE);
        let max_fields = cli
            .max_fields
            .or(file_parser.max_fields)
            .unwrap_or(MAX_FILTER_FIELDS);
        if max_json_bytes == 0 || max_fields == 0 {
            anyhow::bail!("Parser limits must be greater than zero");
        }

        let pretty = cli.pretty.or(file_output.pretty).unwrap_or(false);

        let config = Self {
            compiler: CompilerConfig {
                deleted_field,
                pattern_mode,
            },
            parser: ParserConfig {
                mode,
                max_json_bytes,
                max_fields,
            },
            output: OutputConfig { pretty },
        };
        tracing::debug!(config = ?config, "Configuration resolved");
        Ok(config)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            deleted_field: self.compiler.deleted_field.clone(),
            pattern_mode: self.compiler.pattern_mode,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            mode: self.parser.mode,
            max_json_bytes: self.parser.max_json_bytes,
            max_fields: self.parser.max_fields,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig {
                deleted_field: mongo::DEFAULT_DELETED_FIELD.to_string(),
                pattern_mode: PatternMode::default(),
            },
            parser: ParserConfig {
                mode: ParseMode::default(),
                max_json_bytes: MAX_FILTER_JSON_SIZE,
                max_fields: MAX_FILTER_FIELDS,
            },
            output: OutputConfig { pretty: false },
        }
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "compiler": { "deleted_field": "removedAt", "pattern_mode": "literal" },
            "parser": { "mode": "lenient", "max_json_bytes": 1024, "max_fields": 10 },
            "output": { "pretty": true }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let compiler = config.compiler.as_ref().unwrap();
        assert_eq!(compiler.deleted_field.as_deref(), Some("removedAt"));
        assert_eq!(compiler.pattern_mode, Some(PatternMode::Literal));
        let parser = config.parser.as_ref().unwrap();
        assert_eq!(parser.mode, Some(ParseMode::Lenient));
        assert_eq!(parser.max_json_bytes, Some(1024));
        assert_eq!(parser.max_fields, Some(10));
        assert_eq!(config.output.as_ref().unwrap().pretty, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.compiler.is_none());
        assert!(config.parser.is_none());
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "output": { "pretty": true }, "compilr": {} }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.unknown_fields(), vec!["compilr".to_string()]);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            compiler: Some(CompilerFileConfig {
                deleted_field: Some("deleted_at".to_string()),
                pattern_mode: Some(PatternMode::Literal),
            }),
            ..FileConfig::default()
        };
        let overlay = FileConfig {
            compiler: Some(CompilerFileConfig {
                deleted_field: Some("removedAt".to_string()),
                pattern_mode: None,
            }),
            parser: Some(ParserFileConfig {
                mode: Some(ParseMode::Lenient),
                ..ParserFileConfig::default()
            }),
            ..FileConfig::default()
        };
        base.merge(overlay);

        let compiler = base.compiler.unwrap();
        assert_eq!(compiler.deleted_field.as_deref(), Some("removedAt"));
        assert_eq!(compiler.pattern_mode, Some(PatternMode::Literal));
        assert_eq!(base.parser.unwrap().mode, Some(ParseMode::Lenient));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.compile_options(), CompileOptions::default());
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file_config = FileConfig {
            compiler: Some(CompilerFileConfig {
                deleted_field: Some("fromFile".to_string()),
                pattern_mode: Some(PatternMode::Literal),
            }),
            ..FileConfig::default()
        };
        let cli = CliConfig {
            deleted_field: Some("fromCli".to_string()),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, file_config).unwrap();
        assert_eq!(config.compiler.deleted_field, "fromCli");
        assert_eq!(config.compiler.pattern_mode, PatternMode::Literal);
    }

    #[test]
    fn test_resolve_cli_can_disable_pretty() {
        let file_config = || FileConfig {
            output: Some(OutputFileConfig { pretty: Some(true) }),
            ..FileConfig::default()
        };

        let cli = CliConfig {
            pretty: Some(false),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, file_config()).unwrap();
        assert!(!config.output.pretty);

        let config = AppConfig::resolve(&CliConfig::default(), file_config()).unwrap();
        assert!(config.output.pretty);
    }

    #[test]
    fn test_resolve_rejects_empty_deleted_field() {
        let cli = CliConfig {
            deleted_field: Some("  ".to_string()),
            ..CliConfig::default()
        };
        assert!(AppConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_resolve_rejects_zero_limits() {
        let cli = CliConfig {
            max_fields: Some(0),
            ..CliConfig::default()
        };
        assert!(AppConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_profile_then_cli_path() {
        let profile = write_config(r#"{ "compiler": { "deleted_field": "profileField" }, "output": { "pretty": true } }"#);
        let overlay = write_config(r#"{ "compiler": { "deleted_field": "overlayField" } }"#);
        let cli = CliConfig {
            config: Some(overlay.path().to_path_buf()),
            ..CliConfig::default()
        };

        let config = AppConfig::load_with_profile(&cli, Some(profile.path())).unwrap();
        assert_eq!(config.compiler.deleted_field, "overlayField");
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_missing_cli_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/docfilter.json")),
            ..CliConfig::default()
        };
        let err = AppConfig::load_with_profile(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_invalid_json() {
        let file = write_config("{ not json");
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..CliConfig::default()
        };
        let err = AppConfig::load_with_profile(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
