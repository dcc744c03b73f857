//! Application configuration for tubedigest.
//!
//! User config lives at `~/.tubedigest/tubedigest.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file, only the *names* of the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TubedigestError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tubedigest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tubedigest";

// ---------------------------------------------------------------------------
// Config structs (matching tubedigest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Summarization backend settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Outgoing mail settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Version-control settings for the summary store.
    #[serde(default)]
    pub git: GitConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory the per-channel summary directories live under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Minimum spacing between consecutive summarization calls, in ms.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_pacing_ms() -> u64 {
    1000
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for transcript and digest summarization.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; any OpenAI-compatible endpoint works.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com".into()
}

/// `[smtp]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP relay port (implicit TLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Name of the env var holding the account username (also the sender).
    #[serde(default = "default_smtp_username_env")]
    pub username_env: String,

    /// Name of the env var holding the account password.
    #[serde(default = "default_smtp_password_env")]
    pub password_env: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username_env: default_smtp_username_env(),
            password_env: default_smtp_password_env(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    465
}
fn default_smtp_username_env() -> String {
    "GMAIL_USERNAME".into()
}
fn default_smtp_password_env() -> String {
    "GMAIL_PASSWORD".into()
}

/// `[git]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitConfig {
    /// Commit and push the channel directory after each successful run.
    #[serde(default)]
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tubedigest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TubedigestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tubedigest/tubedigest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TubedigestError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TubedigestError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TubedigestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TubedigestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TubedigestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a required environment variable named by config, erroring if unset or empty.
pub fn require_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(TubedigestError::config(format!(
            "{var_name} not set in environment"
        ))),
    }
}

/// Check that every credential env var named by the config is set and
/// non-empty. Called before the run starts so a half-configured environment
/// fails before any network or storage work happens.
pub fn validate_credentials(config: &AppConfig) -> Result<()> {
    require_env(&config.openai.api_key_env)?;
    require_env(&config.smtp.username_env)?;
    require_env(&config.smtp.password_env)?;
    Ok(())
}
