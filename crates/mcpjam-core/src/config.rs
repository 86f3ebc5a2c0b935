//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{McpJamError, Result};

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BATCH: usize = 32;

/// Top-level MCPJam configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the HTTP surface. The FigJam plugin runs in a
    /// sandboxed iframe and presents itself as `null`.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cors_origins() -> Vec<String> {
    vec!["null".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Batch size used by `/pull` when the caller gives none.
    #[serde(default = "default_batch")]
    pub default_batch: usize,
}

fn default_batch() -> usize {
    DEFAULT_BATCH
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "mcpjam_gateway=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: None,
            filters: Vec::new(),
            output: default_log_output(),
        }
    }
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

static ENV_VAR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR_RE
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse config text (JSON5).
    pub fn parse(raw: &str) -> Result<Self> {
        let substituted = substitute_env_vars(raw);
        json5::from_str(&substituted).map_err(|e| McpJamError::Config(e.to_string()))
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    pub fn host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.host.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string())
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().map(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.server
            .as_ref()
            .map(|s| s.cors_origins.clone())
            .unwrap_or_else(default_cors_origins)
    }

    pub fn default_batch(&self) -> usize {
        self.queue
            .as_ref()
            .map(|q| q.default_batch)
            .unwrap_or(DEFAULT_BATCH)
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Get a config value by dotted path (e.g. "server.port").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(server) = &self.server {
            if server.port == 0 {
                errors.push("Server port cannot be 0".to_string());
            }
            for origin in &server.cors_origins {
                if !is_valid_header_value(origin) {
                    warnings.push(format!("CORS origin is not a valid header value: {origin:?}"));
                }
            }
        }

        if self.default_batch() == 0 {
            warnings.push("queue.default_batch is 0; /pull without batch returns nothing".into());
        }

        if let Some(logging) = &self.logging {
            if !matches!(logging.format.as_str(), "plain" | "json") {
                warnings.push(format!(
                    "Unknown logging format '{}', falling back to plain",
                    logging.format
                ));
            }
            if !matches!(logging.output.as_str(), "stderr" | "stdout") {
                warnings.push(format!(
                    "Unknown logging output '{}', falling back to stderr",
                    logging.output
                ));
            }
        }

        (warnings, errors)
    }
}

/// Visible ASCII (plus tab), non-empty: what an HTTP header value accepts.
fn is_valid_header_value(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}

/// Base directory for MCPJam data: `~/.mcpjam/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcpjam")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(Path::new("/nonexistent/mcpjam/config.json")).unwrap();
        assert_eq!(config.port(), 8787);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.default_batch(), 32);
        assert_eq!(config.cors_origins(), vec!["null".to_string()]);
        assert_eq!(config.logging().format, "plain");
    }

    #[test]
    fn test_load_json5_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                // comments are fine
                server: { port: 9000, host: "127.0.0.1" },
                queue: { default_batch: 8 },
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port(), 9000);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.default_batch(), 8);
        // Unset nested field keeps its default
        assert_eq!(config.cors_origins(), vec!["null".to_string()]);
    }

    #[test]
    fn test_env_substitution() {
        // SAFETY: test-only env mutation with a variable name no other test reads.
        unsafe { std::env::set_var("MCPJAM_TEST_HOST", "10.1.2.3") };
        let config = Config::parse(r#"{ server: { host: "${MCPJAM_TEST_HOST}" } }"#).unwrap();
        assert_eq!(config.host(), "10.1.2.3");
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = Config::parse("{ server: ").unwrap_err();
        assert!(matches!(err, McpJamError::Config(_)));
    }

    #[test]
    fn test_get_path() {
        let config = Config::parse(r#"{ server: { port: 1234 } }"#).unwrap();
        assert_eq!(config.get_path("server.port"), Some(serde_json::json!(1234)));
        assert_eq!(config.get_path("server.missing"), None);
    }

    #[test]
    fn test_validate_port_zero() {
        let config = Config::parse(r#"{ server: { port: 0 } }"#).unwrap();
        let (_warnings, errors) = config.validate();
        assert!(errors.iter().any(|e| e.contains("port")), "{errors:?}");
    }

    #[test]
    fn test_validate_warnings() {
        let config = Config::parse(
            r#"{
                server: { cors_origins: ["null", "bad\norigin"] },
                queue: { default_batch: 0 },
                logging: { format: "xml" },
            }"#,
        )
        .unwrap();
        let (warnings, errors) = config.validate();
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.contains("CORS")), "{warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("default_batch")));
        assert!(warnings.iter().any(|w| w.contains("xml")));
    }
}
