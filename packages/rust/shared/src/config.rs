//! Application configuration for qaforge.
//!
//! User config lives at `~/.qaforge/qaforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::error::{QaForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "qaforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".qaforge";

// ---------------------------------------------------------------------------
// Config structs (matching qaforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion service settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Question generation behaviour.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Export file locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API; `chat/completions` is joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for question generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1/".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// What the generator does when the service fails or returns nothing usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    /// Substitute `default question 1..N` and keep going.
    #[default]
    Placeholder,
    /// Surface the failure to the caller.
    Fail,
}

impl std::str::FromStr for FallbackStrategy {
    type Err = QaForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "placeholder" => Ok(Self::Placeholder),
            "fail" => Ok(Self::Fail),
            other => Err(QaForgeError::validation(format!(
                "unknown fallback strategy '{other}': expected 'placeholder' or 'fail'"
            ))),
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub fallback: FallbackStrategy,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the three dataset files are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Line-delimited `{question, answer}` file.
    #[serde(default = "default_jsonl_file")]
    pub jsonl_file: String,

    /// Line-delimited chat-style training file.
    #[serde(default = "default_openai_file")]
    pub openai_file: String,

    /// Pretty-printed `{input, output}` array file.
    #[serde(default = "default_gemini_file")]
    pub gemini_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            jsonl_file: default_jsonl_file(),
            openai_file: default_openai_file(),
            gemini_file: default_gemini_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_jsonl_file() -> String {
    "qa_dataset.jsonl".into()
}
fn default_openai_file() -> String {
    "qa_dataset_openai.jsonl".into()
}
fn default_gemini_file() -> String {
    "qa_dataset_gemini.json".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.qaforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| QaForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.qaforge/qaforge.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| QaForgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| QaForgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| QaForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QaForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QaForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the configured env var.
///
/// A missing key is only an error under [`FallbackStrategy::Fail`]; with
/// placeholders the run proceeds and the unauthenticated request falls back.
pub fn resolve_api_key(config: &AppConfig) -> Result<Option<String>> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(Some(val)),
        _ if config.generation.fallback == FallbackStrategy::Fail => {
            Err(QaForgeError::config(format!(
                "API key not found. Set the {var_name} environment variable."
            )))
        }
        _ => {
            tracing::warn!(
                env = %var_name,
                "API key not set; generation will fall back to placeholder questions"
            );
            Ok(None)
        }
    }
}
