use crate::adapters::mma::{
    MmaSourceConfig, DEFAULT_DETAIL_CONCURRENCY, DEFAULT_DETAIL_URL, DEFAULT_SEARCH_URL,
    DEFAULT_TIMEOUT_SECS,
};
use crate::config::{DEFAULT_COMPANIES_FILE, DEFAULT_DATA_DIR};
use crate::core::scheduler::{
    SchedulerConfig, DEFAULT_CONCURRENCY, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_UNIT,
};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "cli")]
use crate::config::{pick, toml_config::FileConfig};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_PAGE_DELAY_MS: u64 = 3_000;
/// Upper bound on parallel list-page requests against the registry site.
pub const MAX_CONCURRENCY: usize = 16;

/// Resolved settings for one registry harvest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub pages: u32,
    pub concurrency: usize,
    pub page_unit: u32,
    pub detail_concurrency: usize,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub endpoint: String,
    pub detail_endpoint: String,
    pub data_dir: String,
    pub output_file: String,
    pub monitor: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            pages: DEFAULT_PAGE_COUNT,
            concurrency: DEFAULT_CONCURRENCY,
            page_unit: DEFAULT_PAGE_UNIT,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint: DEFAULT_SEARCH_URL.to_string(),
            detail_endpoint: DEFAULT_DETAIL_URL.to_string(),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            output_file: DEFAULT_COMPANIES_FILE.to_string(),
            monitor: false,
        }
    }
}

impl HarvestConfig {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.pages, self.concurrency, self.output_file.clone())
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
    }

    pub fn source_config(&self) -> MmaSourceConfig {
        MmaSourceConfig {
            search_url: self.endpoint.clone(),
            detail_url: self.detail_endpoint.clone(),
            page_unit: self.page_unit,
            detail_concurrency: self.detail_concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("pages", self.pages as usize, 1)?;
        validation::validate_range("concurrency", self.concurrency, 1, MAX_CONCURRENCY)?;
        validation::validate_positive_number("page_unit", self.page_unit as usize, 1)?;
        validation::validate_positive_number("detail_concurrency", self.detail_concurrency, 1)?;
        validation::validate_positive_number("timeout_secs", self.timeout_secs as usize, 1)?;
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_url("detail_endpoint", &self.detail_endpoint)?;
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_path("output_file", &self.output_file)?;

        tracing::debug!("✅ Harvest configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "fetch-companies")]
#[command(about = "Harvest the designated-company registry into companies.json")]
pub struct HarvestArgs {
    /// Highest registry page to request [default: 50]
    #[arg(long)]
    pub pages: Option<u32>,

    /// Pages fetched in parallel [default: 2]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Rows requested per page [default: 1000]
    #[arg(long)]
    pub page_unit: Option<u32>,

    /// Detail pages fetched in parallel within one page [default: 10]
    #[arg(long)]
    pub detail_concurrency: Option<usize>,

    /// Fixed pause after each page, in milliseconds [default: 3000]
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// Per-request timeout in seconds [default: 15]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Registry search endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Registry detail endpoint
    #[arg(long)]
    pub detail_endpoint: Option<String>,

    /// Directory the registry file is written to [default: ./data]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Registry file name [default: companies.json]
    #[arg(long)]
    pub output_file: Option<String>,

    /// Optional TOML settings file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log resource usage at each checkpoint")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl HarvestArgs {
    /// Flags first, then the settings file, then built-in defaults.
    pub fn resolve(&self, file: Option<&FileConfig>) -> HarvestConfig {
        let d = HarvestConfig::default();
        let h = file.map(|f| &f.harvest);
        let paths = file.map(|f| &f.paths);

        HarvestConfig {
            pages: pick(&self.pages, h.and_then(|h| h.pages.as_ref()), d.pages),
            concurrency: pick(&self.concurrency, h.and_then(|h| h.concurrency.as_ref()), d.concurrency),
            page_unit: pick(&self.page_unit, h.and_then(|h| h.page_unit.as_ref()), d.page_unit),
            detail_concurrency: pick(
                &self.detail_concurrency,
                h.and_then(|h| h.detail_concurrency.as_ref()),
                d.detail_concurrency,
            ),
            page_delay_ms: pick(
                &self.page_delay_ms,
                h.and_then(|h| h.page_delay_ms.as_ref()),
                d.page_delay_ms,
            ),
            timeout_secs: pick(&self.timeout_secs, h.and_then(|h| h.timeout_secs.as_ref()), d.timeout_secs),
            endpoint: pick(&self.endpoint, h.and_then(|h| h.endpoint.as_ref()), d.endpoint),
            detail_endpoint: pick(
                &self.detail_endpoint,
                h.and_then(|h| h.detail_endpoint.as_ref()),
                d.detail_endpoint,
            ),
            data_dir: pick(&self.data_dir, paths.and_then(|p| p.data_dir.as_ref()), d.data_dir),
            output_file: pick(
                &self.output_file,
                paths.and_then(|p| p.companies_file.as_ref()),
                d.output_file,
            ),
            monitor: self.monitor || file.is_some_and(|f| f.monitoring.enabled),
        }
    }
}
