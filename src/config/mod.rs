pub mod cli;
pub mod harvest;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::JobSource;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::config::toml_config::FileConfig;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_OUTPUT_DIR: &str = "./web/public/data";
pub const DEFAULT_COMPANIES_FILE: &str = "companies.json";
pub const DEFAULT_OUTPUT_FILE: &str = "matched_jobs.json";
pub const DEFAULT_SOURCES: [JobSource; 3] =
    [JobSource::Saramin, JobSource::Jobkorea, JobSource::Wanted];

/// Resolved settings for one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub data_dir: String,
    pub output_dir: String,
    pub companies_file: String,
    pub output_file: String,
    pub sources: Vec<JobSource>,
    pub monitor: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            companies_file: DEFAULT_COMPANIES_FILE.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            sources: DEFAULT_SOURCES.to_vec(),
            monitor: false,
        }
    }
}

impl ConfigProvider for AggregateConfig {
    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn companies_file(&self) -> &str {
        &self.companies_file
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn sources(&self) -> &[JobSource] {
        &self.sources
    }
}

impl Validate for AggregateConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_path("output_dir", &self.output_dir)?;
        validation::validate_path("companies_file", &self.companies_file)?;
        validation::validate_path("output_file", &self.output_file)?;
        validation::validate_non_empty_list("sources", &self.sources)?;
        validation::validate_unique("sources", &self.sources)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "jobmatch-etl")]
#[command(about = "Match scraped job postings against the designated-company registry")]
pub struct AggregateArgs {
    /// Directory holding companies.json and the jobs_<source>.json files [default: ./data]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory the merged dataset is written to [default: ./web/public/data]
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Registry file name inside the data directory [default: companies.json]
    #[arg(long)]
    pub companies_file: Option<String>,

    /// Merged dataset file name inside the output directory [default: matched_jobs.json]
    #[arg(long)]
    pub output_file: Option<String>,

    /// Job sources to merge, in output order [default: saramin,jobkorea,wanted]
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<JobSource>,

    /// Optional TOML settings file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log resource usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl AggregateArgs {
    /// Flags first, then the settings file, then built-in defaults.
    pub fn resolve(&self, file: Option<&FileConfig>) -> AggregateConfig {
        let defaults = AggregateConfig::default();
        let paths = file.map(|f| &f.paths);
        let aggregate = file.map(|f| &f.aggregate);

        AggregateConfig {
            data_dir: pick(&self.data_dir, paths.and_then(|p| p.data_dir.as_ref()), defaults.data_dir),
            output_dir: pick(
                &self.output_dir,
                paths.and_then(|p| p.output_dir.as_ref()),
                defaults.output_dir,
            ),
            companies_file: pick(
                &self.companies_file,
                paths.and_then(|p| p.companies_file.as_ref()),
                defaults.companies_file,
            ),
            output_file: pick(
                &self.output_file,
                aggregate.and_then(|a| a.output_file.as_ref()),
                defaults.output_file,
            ),
            sources: if !self.sources.is_empty() {
                self.sources.clone()
            } else {
                aggregate
                    .and_then(|a| a.sources.clone())
                    .unwrap_or(defaults.sources)
            },
            monitor: self.monitor || file.is_some_and(|f| f.monitoring.enabled),
        }
    }
}

#[cfg(feature = "cli")]
pub(crate) fn pick<T: Clone>(flag: &Option<T>, file: Option<&T>, default: T) -> T {
    flag.clone().or_else(|| file.cloned()).unwrap_or(default)
}
