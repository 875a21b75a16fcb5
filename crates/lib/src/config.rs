//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.bihua/config.json`) and environment.
//! Every section has defaults so an empty `{}` file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::i18n::Language;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Matrix homeserver and room used by the chat panel.
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// Chat panel behaviour (navigation commands, connect retry).
    #[serde(default)]
    pub chat: ChatConfig,

    /// Desktop presentation settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// REST backend base URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL every relative API path is joined to (default "http://127.0.0.1:8000/api").
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

/// Matrix account and default room. The password is never compiled in; set it here or via BIHUA_MATRIX_PASSWORD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixConfig {
    pub homeserver_url: Option<String>,
    /// Full user id, e.g. "@admin:example.org".
    pub user_id: Option<String>,
    /// Overridden by BIHUA_MATRIX_PASSWORD env when set.
    pub password: Option<String>,
    /// Room the chat panel mirrors and sends to, e.g. "!abc:example.org".
    pub default_room_id: Option<String>,
    /// Homeserver name that qualifies a bare `userId` localpart, e.g. "example.org".
    pub server_name: Option<String>,
    /// Servers asked to route the join when the account is not yet in the room.
    #[serde(default)]
    pub known_servers: Vec<String>,
}

/// Chat panel settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// When true, inbound messages such as "go to resident R1" navigate the console. Off by default.
    #[serde(default)]
    pub navigation_commands: bool,

    /// Retry policy for rate-limited connect attempts.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Raw retry configuration; see `chat::RetryPolicy` for how it is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Consecutive rate-limited connect failures tolerated before giving up (default 5).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay used when the server does not say how long to wait (default 5000).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound for the backoff delay (default 60000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied per consecutive attempt (default 2.0).
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    5000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

/// Desktop UI settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Initial language ("en" or "zh"). Toggled at runtime, not written back.
    #[serde(default)]
    pub language: Language,

    /// Width bounds of the list panel in the list+detail split.
    #[serde(default)]
    pub list_width: ListWidthConfig,

    /// Optional TTF/OTF file with CJK glyphs; the default egui fonts have none.
    #[serde(default)]
    pub cjk_font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWidthConfig {
    #[serde(default = "default_list_min")]
    pub min: f32,
    #[serde(default = "default_list_max")]
    pub max: f32,
    #[serde(default = "default_list_initial")]
    pub initial: f32,
}

fn default_list_min() -> f32 {
    240.0
}

fn default_list_max() -> f32 {
    640.0
}

fn default_list_initial() -> f32 {
    320.0
}

impl Default for ListWidthConfig {
    fn default() -> Self {
        Self {
            min: default_list_min(),
            max: default_list_max(),
            initial: default_list_initial(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the API base URL: env BIHUA_API_BASE_URL overrides config.
pub fn resolve_api_base_url(config: &Config) -> String {
    non_empty_env("BIHUA_API_BASE_URL").unwrap_or_else(|| config.api.base_url.trim().to_string())
}

/// Resolve the Matrix password: env BIHUA_MATRIX_PASSWORD overrides config. Blank counts as unset.
pub fn resolve_matrix_password(config: &Config) -> Option<String> {
    non_empty_env("BIHUA_MATRIX_PASSWORD").or_else(|| {
        config
            .matrix
            .password
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Full Matrix user id: `userId` as given when it starts with '@', else qualified with
/// `serverName` when one is set.
pub fn resolve_matrix_user_id(config: &Config) -> Option<String> {
    let user = config.matrix.user_id.as_deref()?.trim();
    if user.is_empty() {
        return None;
    }
    let server = config
        .matrix
        .server_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    Some(match server {
        Some(server) if !user.starts_with('@') => format!("@{}:{}", user, server),
        _ => user.to_string(),
    })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("BIHUA_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".bihua").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Directory holding the config file (and the auth token file).
pub fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Load config from the default path (or BIHUA_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Create the config directory and a default `config.json` if they do not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let dir = config_dir(config_path);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating config directory {}", dir.display()))?;

    if !config_path.exists() {
        let default_config = serde_json::to_string_pretty(&Config::default())
            .context("serializing default config")?;
        std::fs::write(config_path, default_config)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
        assert!(!config.chat.navigation_commands);
        assert_eq!(config.chat.retry.max_retries, 5);
        assert_eq!(config.chat.retry.initial_delay_ms, 5000);
        assert_eq!(config.ui.language, Language::En);
        assert_eq!(config.ui.list_width.initial, 320.0);
    }

    #[test]
    fn camel_case_keys_are_read() {
        let json = r#"{
            "api": { "baseUrl": "https://admin.example.org/api" },
            "matrix": { "homeserverUrl": "https://m.example.org", "defaultRoomId": "!r:example.org" },
            "chat": { "navigationCommands": true, "retry": { "maxRetries": 2 } },
            "ui": { "language": "zh", "listWidth": { "min": 200 } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api.base_url, "https://admin.example.org/api");
        assert_eq!(config.matrix.homeserver_url.as_deref(), Some("https://m.example.org"));
        assert_eq!(config.matrix.default_room_id.as_deref(), Some("!r:example.org"));
        assert!(config.chat.navigation_commands);
        assert_eq!(config.chat.retry.max_retries, 2);
        assert_eq!(config.chat.retry.max_delay_ms, 60_000);
        assert_eq!(config.ui.language, Language::Zh);
        assert_eq!(config.ui.list_width.min, 200.0);
        assert_eq!(config.ui.list_width.max, 640.0);
    }

    #[test]
    fn blank_matrix_password_counts_as_unset() {
        let mut config = Config::default();
        config.matrix.password = Some("   ".to_string());
        if std::env::var("BIHUA_MATRIX_PASSWORD").is_err() {
            assert_eq!(resolve_matrix_password(&config), None);
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("bihua-config-test-missing").join("config.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.api.base_url, ApiConfig::default().base_url);
    }

    #[test]
    fn matrix_user_id_is_qualified_with_server_name() {
        let mut config = Config::default();
        assert_eq!(resolve_matrix_user_id(&config), None);
        config.matrix.user_id = Some("admin".to_string());
        assert_eq!(resolve_matrix_user_id(&config).as_deref(), Some("admin"));
        config.matrix.server_name = Some("example.org".to_string());
        assert_eq!(
            resolve_matrix_user_id(&config).as_deref(),
            Some("@admin:example.org")
        );
        config.matrix.user_id = Some("@ops:other.org".to_string());
        assert_eq!(
            resolve_matrix_user_id(&config).as_deref(),
            Some("@ops:other.org")
        );
    }

    #[test]
    fn config_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(config_dir(Path::new("config.json")), PathBuf::from("."));
        assert_eq!(
            config_dir(Path::new("/home/user/.bihua/config.json")),
            PathBuf::from("/home/user/.bihua")
        );
    }
}
