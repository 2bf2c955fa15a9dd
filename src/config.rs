use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::prompt::NoteStyle;

/// Config file the CLI looks for when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./scribe.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Endpoint and credential for the remote service.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// API key; falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

impl ServiceConfig {
    /// Resolve the credential: config value first, then `GEMINI_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.trim().is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!(
                "No API key configured. Set [service] api_key in the config file \
                 or the GEMINI_API_KEY environment variable."
            ),
        }
    }
}

/// Model selection and retry policy for generation.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Note register: `general`, `academic`, or `exam`.
    #[serde(default = "default_style")]
    pub style: String,
    /// Maximum underlying generation calls when rate limited.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay; doubles on each further rate-limited attempt.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            style: default_style(),
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_style() -> String {
    "general".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_base_delay_secs() -> u64 {
    5
}

impl GenerationConfig {
    /// The configured style as a [`NoteStyle`]. Unknown names (rejected by
    /// [`load_config`] anyway) fall back to the default register.
    pub fn note_style(&self) -> NoteStyle {
        NoteStyle::from_name(&self.style).unwrap_or_default()
    }
}

/// Poll pacing while the uploaded file is processed server-side.
#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Maximum status re-fetches before giving up.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_polls: default_max_polls(),
        }
    }
}

fn default_interval_secs() -> u64 {
    2
}
fn default_max_polls() -> u32 {
    30
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate service
    if config.service.base_url.trim().is_empty() {
        bail!("service.base_url must not be empty");
    }
    if config.service.timeout_secs == 0 {
        bail!("service.timeout_secs must be > 0");
    }

    // Validate generation
    if config.generation.model.trim().is_empty() {
        bail!("generation.model must not be empty");
    }
    if NoteStyle::from_name(&config.generation.style).is_none() {
        bail!(
            "Unknown note style: '{}'. Must be general, academic, or exam.",
            config.generation.style
        );
    }
    if config.generation.max_retries == 0 {
        bail!("generation.max_retries must be >= 1");
    }
    if config.generation.base_delay_secs == 0 {
        bail!("generation.base_delay_secs must be >= 1");
    }

    // Validate polling
    if config.polling.interval_secs == 0 {
        bail!("polling.interval_secs must be >= 1");
    }
    if config.polling.max_polls == 0 {
        bail!("polling.max_polls must be >= 1");
    }

    Ok(config)
}

/// Resolve the effective config for a CLI invocation.
///
/// An explicit `--config` path must exist and parse. Without one, the
/// default path is used when present; otherwise built-in defaults apply.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Write a starter `scribe.toml` into the current directory.
pub fn scaffold_config(force: bool) -> Result<()> {
    let path = Path::new("scribe.toml");
    if path.exists() && !force {
        bail!("scribe.toml already exists (pass --force to overwrite)");
    }

    let template = r#"# lecture-scribe configuration

[service]
# API key for generativelanguage.googleapis.com. May be omitted here and
# supplied via the GEMINI_API_KEY environment variable instead.
# api_key = "..."
base_url = "https://generativelanguage.googleapis.com"
timeout_secs = 120

[generation]
# Known-good models: gemini-2.0-flash, gemini-2.0-flash-exp, gemini-1.5-flash.
# Run `scribe models` for the live list available to your key.
model = "gemini-2.0-flash"
# Note register: general, academic, or exam.
style = "general"
max_retries = 5
base_delay_secs = 5

[polling]
interval_secs = 2
max_polls = 30
"#;

    std::fs::write(path, template)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
