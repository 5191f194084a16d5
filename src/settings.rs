use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_INPUT: &str = "./data/raw/GDPR_Art_1_21.pdf";
pub const DEFAULT_OUTPUT_DIR: &str = "./data/extracted_articles";
const ENV_PREFIX: &str = "ARTICLES";

/// Where `extraction_timestamp` comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampMode {
    /// One timestamp taken at startup, shared by every file
    Run,
    /// A fresh timestamp for each file as it is written
    PerFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub timestamp: TimestampMode,
}

impl Settings {
    /// Defaults, then `ARTICLES_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("input", DEFAULT_INPUT)?
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("timestamp", "run")?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Command-line flags win over everything else.
    pub fn with_overrides(
        mut self,
        input: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        timestamp: Option<TimestampMode>,
    ) -> Self {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
        if let Some(timestamp) = timestamp {
            self.timestamp = timestamp;
        }
        self
    }
}
