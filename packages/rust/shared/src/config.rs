//! Application configuration for askmail.
//!
//! User config lives at `~/.askmail/askmail.toml`.
//! Secrets are never stored there: the file names the environment variables
//! that hold them. CLI flags override config file values, which override
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AskmailError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "askmail.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".askmail";

/// Env var overriding the SMTP host from the config file.
const HOST_OVERRIDE_ENV: &str = "EMAIL_HOST";

/// Env var overriding the SMTP port from the config file.
const PORT_OVERRIDE_ENV: &str = "EMAIL_PORT";

/// Credential values shipped in sample `.env` files. Treated as absent.
pub const PLACEHOLDER_CREDENTIALS: &[&str] = &["tu_correo@gmail.com"];

// ---------------------------------------------------------------------------
// Config structs (matching askmail.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Outgoing mail settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Rendered document settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature; omitted from requests when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

fn default_base_url() -> String {
    "https://models.github.ai/inference".into()
}
fn default_model() -> String {
    "openai/gpt-4o".into()
}
fn default_api_key_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[mail]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Env var holding the sender address (also the SMTP login).
    #[serde(default = "default_sender_env")]
    pub sender_env: String,

    /// Env var holding the SMTP password.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,

    /// SMTP relay host. `EMAIL_HOST` overrides it.
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP submission port. `EMAIL_PORT` overrides it.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender_env: default_sender_env(),
            secret_env: default_secret_env(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_sender_env() -> String {
    "EMAIL_HOST_USER".into()
}
fn default_secret_env() -> String {
    "EMAIL_HOST_PASSWORD".into()
}
fn default_host() -> String {
    "smtp.gmail.com".into()
}
fn default_port() -> u16 {
    587
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for rendered documents. Empty means the system temp dir.
    #[serde(default)]
    pub dir: String,

    /// Attachment name shown to the recipient.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    "respuesta_ia.pdf".into()
}

impl OutputConfig {
    /// Directory rendered documents are written to.
    pub fn resolved_dir(&self) -> PathBuf {
        if self.dir.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.dir)
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved settings (runtime, merged from config + environment)
// ---------------------------------------------------------------------------

/// Language model settings with the API key already read from the environment.
#[derive(Clone)]
pub struct LlmSettings {
    /// Validated base URL.
    pub base_url: Url,
    /// Model identifier.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// HTTP client timeout.
    pub timeout: Duration,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Mail settings as found in the environment. Any piece may be missing;
/// the dispatcher reports that at send time.
#[derive(Clone, Default)]
pub struct MailSettings {
    /// Sender address, also used as the SMTP login.
    pub sender: Option<String>,
    /// SMTP password.
    pub secret: Option<String>,
    /// SMTP relay host.
    pub host: Option<String>,
    /// SMTP port.
    pub port: Option<u16>,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("sender", &self.sender)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Read the LLM API key from the environment and validate the endpoint.
///
/// A missing key is a startup error: without it no run can succeed.
pub fn resolve_llm_settings(
    config: &AppConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<LlmSettings> {
    let var_name = &config.llm.api_key_env;
    let api_key = match env(var_name) {
        Some(val) if !val.trim().is_empty() => val,
        _ => {
            return Err(AskmailError::config(format!(
                "language model API key not found. Set the {var_name} environment variable."
            )));
        }
    };

    let base_url = Url::parse(&config.llm.base_url).map_err(|e| {
        AskmailError::config(format!("invalid llm.base_url '{}': {e}", config.llm.base_url))
    })?;

    Ok(LlmSettings {
        base_url,
        model: config.llm.model.clone(),
        api_key,
        timeout: Duration::from_secs(config.llm.timeout_secs),
        temperature: config.llm.temperature,
    })
}

/// Collect mail settings from config and environment. Never fails.
pub fn resolve_mail_settings(
    config: &AppConfig,
    env: impl Fn(&str) -> Option<String>,
) -> MailSettings {
    let non_empty = |v: String| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    };

    let host = env(HOST_OVERRIDE_ENV)
        .and_then(non_empty)
        .or_else(|| non_empty(config.mail.host.clone()));

    let port = match env(PORT_OVERRIDE_ENV) {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "ignoring unparsable {PORT_OVERRIDE_ENV}");
                None
            }
        },
        None => Some(config.mail.port),
    }
    .filter(|port| *port != 0);

    MailSettings {
        sender: env(&config.mail.sender_env).and_then(non_empty),
        secret: env(&config.mail.secret_env).and_then(non_empty),
        host,
        port,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.askmail/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AskmailError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.askmail/askmail.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| AskmailError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AskmailError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AskmailError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AskmailError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AskmailError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
