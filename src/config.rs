use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default Hugging Face inference endpoint used by the `huggingface` provider.
pub const DEFAULT_HF_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct QuicknoteConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Upper bound on a single summarization, after which the request fails with 502.
    pub request_timeout_secs: u64,
    /// Longest note text accepted by `POST /api/summarize`, in characters.
    pub max_text_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SummarizerConfig {
    /// `heuristic` (local, no network) or `huggingface`.
    pub provider: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// HTTP client timeout for the remote provider.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_level: "info".into(),
            request_timeout_secs: 60,
            max_text_chars: 20_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_quicknote_dir()
            .join("notes.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: "heuristic".into(),
            endpoint: DEFAULT_HF_ENDPOINT.into(),
            api_key: None,
            timeout_secs: 45,
        }
    }
}

/// Returns `~/.quicknote/`, or `./.quicknote/` when no home directory is known.
pub fn default_quicknote_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quicknote")
}

/// Returns the default config file path: `~/.quicknote/config.toml`
pub fn default_config_path() -> PathBuf {
    default_quicknote_dir().join("config.toml")
}

impl QuicknoteConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            QuicknoteConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("QUICKNOTE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("QUICKNOTE_PORT is not a valid port: {val}"))?;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_SUMMARIZER") {
            self.summarizer.provider = val;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_SUMMARIZER_URL") {
            self.summarizer.endpoint = val;
        }
        if let Ok(val) = std::env::var("QUICKNOTE_API_KEY") {
            self.summarizer.api_key = Some(val);
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = QuicknoteConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.summarizer.provider, "heuristic");
        assert!(config.summarizer.api_key.is_none());
        assert!(config.storage.db_path.ends_with("notes.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9090
log_level = "debug"

[storage]
db_path = "/tmp/notes-test.db"

[summarizer]
provider = "huggingface"
api_key = "hf_test"
"#;
        let config: QuicknoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/notes-test.db");
        assert_eq!(config.summarizer.provider, "huggingface");
        assert_eq!(config.summarizer.api_key.as_deref(), Some("hf_test"));
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.summarizer.endpoint, DEFAULT_HF_ENDPOINT);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = QuicknoteConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.max_text_chars, 20_000);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = QuicknoteConfig::default();
        std::env::set_var("QUICKNOTE_DB", "/tmp/override.db");
        std::env::set_var("QUICKNOTE_PORT", "7070");
        std::env::set_var("QUICKNOTE_SUMMARIZER", "huggingface");

        config.apply_env_overrides().unwrap();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.summarizer.provider, "huggingface");
        assert_eq!(config.bind_addr(), "0.0.0.0:7070");

        std::env::remove_var("QUICKNOTE_DB");
        std::env::remove_var("QUICKNOTE_PORT");
        std::env::remove_var("QUICKNOTE_SUMMARIZER");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/notes.db"), PathBuf::from("/var/lib/notes.db"));
    }
}
