//! Pipeline Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `PV_DETECT_*` environment variables. Nested keys use a double
//! underscore, e.g. `PV_DETECT_BENCHMARK__CV_FOLDS=5`.

use classifier_bench::BenchmarkConfig;
use config::{Config, ConfigError, Environment, File};
use feature_engine::ExtractorConfig;
use feature_ranker::RankerConfig;
use load_profile::ReshapeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input files and the train/test split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Wide readings table: `date,slot,<household>...`
    pub readings: PathBuf,
    /// `household,label` table
    pub labels: PathBuf,
    /// Share of households held out for testing
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            readings: PathBuf::from("readings.csv"),
            labels: PathBuf::from("labels.csv"),
            test_fraction: 0.3,
            split_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Everything one pipeline run needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub reshape: ReshapeConfig,
    pub extractor: ExtractorConfig,
    pub ranker: RankerConfig,
    pub benchmark: BenchmarkConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("PV_DETECT")
            .prefix_separator("_")
            .separator("__")
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder.add_source(env).build()?.try_deserialize()
    }
}
