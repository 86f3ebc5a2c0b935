//! Tracing subscriber setup from `LoggingConfig`.

use mcpjam_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Resolved subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub directives: String,
    pub json: bool,
    pub stdout: bool,
}

impl LogSettings {
    /// `--verbose` beats the configured level. `force_stderr` is set in stdio
    /// mode, where stdout carries JSON-RPC.
    pub fn resolve(config: &LoggingConfig, verbose: bool, force_stderr: bool) -> Self {
        let level = if verbose {
            "debug"
        } else {
            config.level.as_deref().unwrap_or("info")
        };

        let directives = std::iter::once(level)
            .chain(config.filters.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            directives,
            json: config.format == "json",
            stdout: config.output == "stdout" && !force_stderr,
        }
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over the config.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.directives))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (settings.json, settings.stdout) {
        (true, true) => builder.json().with_writer(std::io::stdout).try_init(),
        (true, false) => builder.json().with_writer(std::io::stderr).try_init(),
        (false, true) => builder.with_writer(std::io::stdout).try_init(),
        (false, false) => builder.with_writer(std::io::stderr).try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
