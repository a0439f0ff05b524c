//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` (or one explicit
//! file) + `APP_*` env vars, with `__` separating nested keys
//! (`APP_CLASSIFIER__THRESHOLD=0.6`).

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MAX_LEN: usize = 96;
pub const DEFAULT_SNIPPET_CHARS: usize = 300;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
    env_name: String,
}

impl Config {
    /// Load `config.toml` + `config.<env>.toml` from the working directory,
    /// then `APP_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        Self::finish(figment, PathBuf::from("."), env_name)
    }

    /// Load an explicit config file, then `APP_*` environment variables.
    /// Relative paths inside the file resolve against its directory.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidConfig(format!("config file {} not found", path.display())).into());
        }
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        Self::finish(Figment::new().merge(Toml::file(path)), base_dir, env_name)
    }

    fn finish(figment: Figment, base_dir: PathBuf, env_name: String) -> anyhow::Result<Self> {
        let figment = figment.merge(Env::prefixed("APP_").split("__"));
        let config = Self { figment, base_dir, env_name };
        config.validate_for_env(&config.env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed view of the whole configuration, with defaults for missing keys.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn base_dir(&self) -> &Path { &self.base_dir }

    pub fn env_name(&self) -> &str { &self.env_name }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                let backend: Option<Backend> = self.figment.extract_inner("classifier.backend").ok();
                if backend == Some(Backend::Fake) {
                    return Err(Error::InvalidConfig("the fake classifier is not allowed in production".into()).into());
                }
            }
            "dev" | "development" => {}
            "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Which oracle backend the host constructs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Model,
    Fake,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub model: ModelSettings,
    pub normalizer: NormalizerSettings,
    pub scan: ScanSettings,
    pub transport: TransportSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::Result<()> {
        let labels = &self.classifier.type_labels;
        if labels.len() != 5 {
            return Err(Error::InvalidConfig(format!("expected 5 type labels, got {}", labels.len())));
        }
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("type label {} is empty", i)));
            }
            if labels[..i].contains(label) {
                return Err(Error::InvalidConfig(format!("duplicate type label '{}'", label)));
            }
        }
        if let Some(t) = self.classifier.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::InvalidConfig(format!("classifier.threshold {} outside [0, 1]", t)));
            }
        }
        if self.classifier.max_len == Some(0) {
            return Err(Error::InvalidConfig("classifier.max_len must be positive".into()));
        }
        if self.scan.max_chars == 0 {
            return Err(Error::InvalidConfig("scan.max_chars must be positive".into()));
        }
        if self.scan.snippet_chars == 0 {
            return Err(Error::InvalidConfig("scan.snippet_chars must be positive".into()));
        }
        if self.transport.max_frame_bytes == 0 {
            return Err(Error::InvalidConfig("transport.max_frame_bytes must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub backend: Backend,
    /// Decision boundary; falls back to the artifacts' training config, then 0.5.
    pub threshold: Option<f32>,
    /// Token budget of the model; falls back to the training config, then 96.
    pub max_len: Option<usize>,
    pub type_labels: Vec<String>,
}

impl ClassifierSettings {
    /// Configured threshold, else `fallback` (the training config), else 0.5.
    pub fn resolve_threshold(&self, fallback: Option<f32>) -> f32 {
        self.threshold.or(fallback).unwrap_or(DEFAULT_THRESHOLD)
    }

    /// Configured token budget, else `fallback`, else 96.
    pub fn resolve_max_len(&self, fallback: Option<usize>) -> usize {
        self.max_len.or(fallback).unwrap_or(DEFAULT_MAX_LEN)
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Model,
            threshold: None,
            max_len: None,
            type_labels: ["age", "ethnicity", "gender", "religion", "other"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub artifacts_dir: String,
    pub weights: String,
    pub tokenizer: String,
    pub encoder_config: String,
    pub training_config: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            weights: "model_state_dict.pt".to_string(),
            tokenizer: "tokenizer.json".to_string(),
            encoder_config: "encoder_config.json".to_string(),
            training_config: "config.json".to_string(),
        }
    }
}

impl ModelSettings {
    /// Resolve the artifacts directory against `base`.
    pub fn artifacts_path(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.artifacts_dir) }

    /// Resolve one artifact file (relative names live in the artifacts directory).
    pub fn artifact(&self, base: &Path, file: &str) -> PathBuf { resolve_with_base(&self.artifacts_path(base), file) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Replacement word-segmentation dictionary (`word<TAB>count` or one word per line).
    pub dictionary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub max_chars: usize,
    pub min_chunk_len: usize,
    pub snippet_chars: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_chars: crate::chunker::DEFAULT_MAX_CHARS,
            min_chunk_len: crate::chunker::DEFAULT_MIN_CHUNK_LEN,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub max_frame_bytes: usize,
}

impl Default for TransportSettings {
    fn default() -> Self { Self { max_frame_bytes: DEFAULT_MAX_FRAME_BYTES } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self { Self { level: "info".to_string() } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
