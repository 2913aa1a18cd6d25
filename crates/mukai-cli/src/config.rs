//! Configuration for the mukai CLI
//!
//! Sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`MUKAI_*`)
//! 3. Configuration file (`.mukai.toml`, `.mukai.yaml`, `.mukai.json`, ...)
//! 4. Built-in defaults

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use mukai_core::{ChargeMode, Scalar, StabilityCondition};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MukaiConfig {
    /// Ambient surface
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Default stability parameters for `charge`
    #[serde(default)]
    pub stability: StabilityConfig,
    /// Output rendering
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Self-intersection `H²` of the polarization
    #[serde(default = "default_degree")]
    pub degree: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Mumford or Bridgeland central charge
    #[serde(default)]
    pub mode: ChargeMode,
    /// Bridgeland `α`
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Twist `β`, written as an integer, fraction or decimal
    #[serde(default = "default_beta")]
    pub beta: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Shorthand for `level = "debug"`
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_degree() -> i64 {
    1
}

fn default_alpha() -> f64 {
    1.0
}

fn default_beta() -> String {
    "0".to_string()
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            degree: default_degree(),
        }
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            mode: ChargeMode::Mumford,
            alpha: default_alpha(),
            beta: default_beta(),
        }
    }
}

impl StabilityConfig {
    pub fn to_condition(&self) -> Result<StabilityCondition> {
        let beta: Scalar = self
            .beta
            .parse()
            .with_context(|| format!("Invalid stability beta '{}'", self.beta))?;
        if !beta.is_finite() {
            bail!("Stability beta must be finite, got '{}'", self.beta);
        }
        Ok(match self.mode {
            ChargeMode::Mumford => StabilityCondition::mumford(beta),
            ChargeMode::Bridgeland => StabilityCondition::bridgeland(self.alpha, beta),
        })
    }
}

impl MukaiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.surface.degree <= 0 {
            bail!(
                "Surface degree must be positive, got {}",
                self.surface.degree
            );
        }
        if !self.stability.alpha.is_finite() {
            bail!("Stability alpha must be finite");
        }
        self.stability.to_condition()?;
        Ok(())
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        if self.logging.debug {
            log::LevelFilter::Debug
        } else {
            self.logging.level.to_filter()
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<MukaiConfig> {
        let mut config = match explicit {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => Self::load_from_files()?,
        };
        Self::apply_environment_variables(&mut config)?;
        Ok(config)
    }

    fn load_from_files() -> Result<MukaiConfig> {
        for path in Self::find_config_files() {
            if path.is_file() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(&path);
            }
        }
        debug!("No configuration file found, using defaults");
        Ok(MukaiConfig::default())
    }

    fn find_config_files() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(config_path) = env::var("MUKAI_CONFIG") {
            paths.push(PathBuf::from(config_path));
        }

        if let Ok(current_dir) = env::current_dir() {
            for name in [
                ".mukai",
                ".mukai.toml",
                ".mukai.yaml",
                ".mukai.yml",
                ".mukai.json",
                "mukai.config.toml",
            ] {
                paths.push(current_dir.join(name));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".mukai.toml"));
            paths.push(home_dir.join(".config/mukai/config.toml"));
            paths.push(home_dir.join(".config/mukai/config.yaml"));
            paths.push(home_dir.join(".config/mukai/config.json"));
        }

        paths
    }

    pub fn load_from_file(path: &Path) -> Result<MukaiConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            // `.mukai` and unknown extensions are TOML
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
        };

        Ok(config)
    }

    fn apply_environment_variables(config: &mut MukaiConfig) -> Result<()> {
        if let Ok(degree) = env::var("MUKAI_DEGREE") {
            config.surface.degree = degree
                .trim()
                .parse()
                .with_context(|| format!("Invalid MUKAI_DEGREE '{degree}'"))?;
        }

        if let Ok(alpha) = env::var("MUKAI_ALPHA") {
            config.stability.alpha = alpha
                .trim()
                .parse()
                .with_context(|| format!("Invalid MUKAI_ALPHA '{alpha}'"))?;
        }

        if let Ok(beta) = env::var("MUKAI_BETA") {
            config.stability.beta = beta.trim().to_string();
        }

        if let Some(flag) = env::var("MUKAI_BRIDGELAND")
            .ok()
            .and_then(|v| parse_bool(&v))
        {
            config.stability.mode = if flag {
                ChargeMode::Bridgeland
            } else {
                ChargeMode::Mumford
            };
        }

        if let Ok(format) = env::var("MUKAI_OUTPUT") {
            if let Ok(format) = OutputFormat::from_str(format.trim(), true) {
                config.output.format = format;
            }
        }

        if let Ok(level) = env::var("MUKAI_LOG_LEVEL") {
            if let Ok(level) = LogLevel::from_str(level.trim(), true) {
                config.logging.level = level;
            }
        }

        if let Ok(debug) = env::var("MUKAI_DEBUG") {
            config.logging.debug = parse_bool(&debug).unwrap_or(false);
        }

        Ok(())
    }

    pub fn generate_sample_config() -> String {
        let config = MukaiConfig::default();
        let body = toml::to_string_pretty(&config)
            .unwrap_or_else(|_| "# Failed to generate config\n".to_string());
        format!("# mukai configuration (save as .mukai.toml)\n\n{body}")
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
