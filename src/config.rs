use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Host name whose resolvability stands for "connected".
    pub host: String,
    /// Seconds between checks. Must be >= 1.
    pub check_interval: u64,
    /// Append-only uptime log.
    pub out_file: PathBuf,
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_ms: u64,
    #[serde(default)]
    pub labels: Labels,
}

fn default_resolve_timeout() -> u64 { 5000 }

/// Display strings, overridable for localization. Field order and the
/// semicolon separator in the log are fixed regardless of these values.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Labels {
    #[serde(default = "default_ok")]
    pub ok: String,
    #[serde(default = "default_no_connection")]
    pub no_connection: String,
    #[serde(default = "default_started")]
    pub started: String,
    #[serde(default = "default_connected")]
    pub connected: String,
    #[serde(default = "default_disconnected")]
    pub disconnected: String,
    #[serde(default = "default_columns")]
    pub columns: [String; 7],
}

fn default_ok() -> String { "OK".into() }
fn default_no_connection() -> String { "no connection".into() }
fn default_started() -> String { "started".into() }
fn default_connected() -> String { "{host}: up for {streak}".into() }
fn default_disconnected() -> String { "{host}: unreachable for {streak}".into() }
fn default_columns() -> [String; 7] {
    ["Date", "Time", "Result", "% up", "Days", "Hours", "Mins"].map(String::from)
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            ok: default_ok(),
            no_connection: default_no_connection(),
            started: default_started(),
            connected: default_connected(),
            disconnected: default_disconnected(),
            columns: default_columns(),
        }
    }
}

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: MonitorConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("host must not be empty");
        }
        if self.check_interval == 0 {
            bail!("check_interval must be at least 1 second");
        }
        Ok(())
    }
}
