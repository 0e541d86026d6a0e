//! Configuration system: TOML file + env var overrides + defaults matching the
//! detector-run CSV produced by the flake watcher.

#![allow(missing_docs)]

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{FlakeError, Result};

/// Full categorizer configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// How detector-run rows are split and validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    /// Field delimiter.
    pub delimiter: char,
    /// Value of the `test` field that marks a header row.
    pub header_marker: String,
    /// Character every test identifier must contain (`TestClass#method`).
    pub test_separator: char,
    /// Tool tag marking randomized-seed runs; their `log` field is the seed.
    pub nondex_tool: String,
}

/// Result rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Result rendering formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `{ "A#m": "ID", "B#m": "" }` exactly as the flake watcher expects it.
    #[default]
    Legacy,
    /// A JSON object keyed by test.
    Json,
    /// Colored table with a summary line.
    Human,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Json => "json",
            Self::Human => "human",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "json" => Ok(Self::Json),
            "human" => Ok(Self::Human),
            other => Err(format!(
                "unknown output format {other:?} (expected legacy, json, or human)"
            )),
        }
    }
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LogConfig {
    /// JSONL activity log path; `None` disables the log.
    pub jsonl_path: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            header_marker: "test".to_string(),
            test_separator: '#',
            nondex_tool: "NonDex".to_string(),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[FLK-CONFIG] WARNING: HOME not set, falling back to /tmp for config path"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        home_dir.join(".config").join("flakecat").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| FlakeError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let mut parsed = Self::from_toml_str(&raw)?;
            parsed.source_path = Some(path_buf);
            parsed
        } else if path.is_some() {
            return Err(FlakeError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without touching the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(raw)?;
        Ok(parsed)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("FLAKECAT_INPUT_DELIMITER") {
            self.input.delimiter = parse_env_char("FLAKECAT_INPUT_DELIMITER", &raw)?;
        }
        if let Some(raw) = lookup("FLAKECAT_INPUT_HEADER_MARKER") {
            self.input.header_marker = raw;
        }
        if let Some(raw) = lookup("FLAKECAT_INPUT_TEST_SEPARATOR") {
            self.input.test_separator = parse_env_char("FLAKECAT_INPUT_TEST_SEPARATOR", &raw)?;
        }
        if let Some(raw) = lookup("FLAKECAT_INPUT_NONDEX_TOOL") {
            self.input.nondex_tool = raw;
        }
        if let Some(raw) = lookup("FLAKECAT_OUTPUT_FORMAT") {
            self.output.format = raw.parse().map_err(|details: String| {
                FlakeError::ConfigParse {
                    context: "env",
                    details: format!("FLAKECAT_OUTPUT_FORMAT={raw:?}: {details}"),
                }
            })?;
        }
        if let Some(raw) = lookup("FLAKECAT_LOG_JSONL_PATH") {
            self.log.jsonl_path = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// An empty `jsonl_path` in TOML means "disabled".
    fn normalize(&mut self) {
        if self
            .log
            .jsonl_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.log.jsonl_path = None;
        }
    }

    fn validate(&self) -> Result<()> {
        let input = &self.input;
        if matches!(input.delimiter, '"' | '\n' | '\r') {
            return Err(FlakeError::InvalidConfig {
                details: format!(
                    "input.delimiter must not be a quote or line break, got {:?}",
                    input.delimiter
                ),
            });
        }
        if input.delimiter == input.test_separator {
            return Err(FlakeError::InvalidConfig {
                details: format!(
                    "input.delimiter and input.test_separator must differ, both are {:?}",
                    input.delimiter
                ),
            });
        }
        for (name, value) in [
            ("header_marker", &input.header_marker),
            ("nondex_tool", &input.nondex_tool),
        ] {
            if value.trim().is_empty() {
                return Err(FlakeError::InvalidConfig {
                    details: format!("input.{name} must not be empty"),
                });
            }
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

/// Unset and empty are the same; whitespace is a value (`\t` is a real delimiter).
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|raw| !raw.is_empty())
}

fn parse_env_char(name: &str, raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(FlakeError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: expected exactly one character"),
        }),
    }
}
