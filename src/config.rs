use anyhow::{Context, Result};
use content_manifest_core::manifest::{BuildOptions, ValidationMode};
use content_manifest_core::resolve::Precedence;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.markdown".to_string()]
}

/// Repository docs at the root are not site content.
fn default_exclude_globs() -> Vec<String> {
    vec!["README.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    50
}
fn default_concurrency() -> usize {
    16
}
fn default_timeout_secs() -> u64 {
    60
}

impl IngestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ManifestConfig {
    #[serde(default)]
    pub mode: ValidationMode,
    #[serde(default)]
    pub precedence: Precedence,
    /// Output file. Stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl ManifestConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            mode: self.mode,
            precedence: self.precedence,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` when it exists, otherwise fall back to built-in defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

const CONFIG_TEMPLATE: &str = r#"# Content Manifest configuration.

[content]
root = "."
include_globs = ["**/*.md", "**/*.markdown"]
exclude_globs = ["README.md"]
follow_symlinks = false

[ingest]
max_attempts = 3
retry_backoff_ms = 50
concurrency = 16
timeout_secs = 60

[manifest]
# strict: the first invalid document fails the build.
# lenient: invalid documents are excluded and listed under "diagnostics".
mode = "strict"
# last-seen | first-seen | newest-date
precedence = "last-seen"
# output = "_data/manifest.json"

[logging]
level = "info"
format = "compact"
"#;

/// Write a commented starter config to `path`. Refuses to overwrite.
pub fn scaffold_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists: {}", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    if config.content.include_globs.is_empty() {
        anyhow::bail!("content.include_globs must not be empty");
    }

    if config.ingest.max_attempts == 0 {
        anyhow::bail!("ingest.max_attempts must be >= 1");
    }
    if config.ingest.concurrency == 0 {
        anyhow::bail!("ingest.concurrency must be >= 1");
    }
    if config.ingest.timeout_secs == 0 {
        anyhow::bail!("ingest.timeout_secs must be >= 1");
    }

    match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!(
            "Unknown logging.level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    Ok(())
}
