//! Store configuration for yolo-weights.
//!
//! Loads [`StoreConfig`] from a TOML file with environment variable overrides
//! via `YOLO_WEIGHTS_*` prefixed variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "yolov2weights";

/// Where serialized weight resources are resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Files under a root directory.
    Directory,
    /// Resources registered in memory, typically via `include_bytes!`.
    Embedded,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "directory" | "dir" => Ok(Self::Directory),
            "embedded" => Ok(Self::Embedded),
            other => Err(format!("unknown weight source: {other}")),
        }
    }
}

/// Numeric backend for the matrices handed back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    RowMajor,
    Candle,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowMajor => write!(f, "row-major"),
            Self::Candle => write!(f, "candle"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "row-major" | "rowmajor" => Ok(Self::RowMajor),
            "candle" => Ok(Self::Candle),
            other => Err(format!("unknown matrix backend: {other}")),
        }
    }
}

/// Weight store configuration loaded from TOML with environment variable overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Byte source variant.
    /// Override: `YOLO_WEIGHTS_SOURCE`
    pub source: SourceKind,

    /// Root directory for the directory source.
    /// Override: `YOLO_WEIGHTS_ROOT`
    pub root: Option<PathBuf>,

    /// First path segment of every resource address.
    /// Override: `YOLO_WEIGHTS_NAMESPACE`
    pub namespace: String,

    /// Backend for returned matrices.
    /// Override: `YOLO_WEIGHTS_BACKEND`
    pub backend: BackendKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Directory,
            root: Some(PathBuf::from(".")),
            namespace: DEFAULT_NAMESPACE.to_string(),
            backend: BackendKind::RowMajor,
        }
    }
}

/// Errors that can occur when loading or validating a [`StoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride { key: String, value: String, reason: String },
}

impl StoreConfig {
    /// Render the default configuration as TOML.
    pub fn default_toml() -> Result<String, ConfigError> {
        Self::default().to_toml()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields, then apply environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: StoreConfig = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::Validation("namespace must not be empty".into()));
        }
        if self.namespace.contains(['/', '\\']) || self.namespace == ".." {
            return Err(ConfigError::Validation(format!(
                "namespace must be a single path segment, got {:?}",
                self.namespace
            )));
        }
        if self.source == SourceKind::Directory && self.root.is_none() {
            return Err(ConfigError::Validation("directory source requires a root".into()));
        }
        Ok(())
    }

    /// Apply `YOLO_WEIGHTS_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("YOLO_WEIGHTS_SOURCE") {
            self.source = val.parse::<SourceKind>().map_err(|reason| ConfigError::EnvOverride {
                key: "YOLO_WEIGHTS_SOURCE".into(),
                value: val.clone(),
                reason,
            })?;
        }

        if let Ok(val) = std::env::var("YOLO_WEIGHTS_ROOT") {
            if val.is_empty() {
                return Err(ConfigError::EnvOverride {
                    key: "YOLO_WEIGHTS_ROOT".into(),
                    value: val,
                    reason: "root must not be empty".into(),
                });
            }
            self.root = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("YOLO_WEIGHTS_NAMESPACE") {
            self.namespace = val;
        }

        if let Ok(val) = std::env::var("YOLO_WEIGHTS_BACKEND") {
            self.backend =
                val.parse::<BackendKind>().map_err(|reason| ConfigError::EnvOverride {
                    key: "YOLO_WEIGHTS_BACKEND".into(),
                    value: val.clone(),
                    reason,
                })?;
        }

        Ok(())
    }
}
