use crate::domain::model::JobSource;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Optional settings file shared by both binaries. Every key is optional;
/// command-line flags override whatever is set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub aggregate: AggregateSection,
    #[serde(default)]
    pub harvest: HarvestSection,
    #[serde(default)]
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsSection {
    pub data_dir: Option<String>,
    pub output_dir: Option<String>,
    pub companies_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateSection {
    pub output_file: Option<String>,
    pub sources: Option<Vec<JobSource>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestSection {
    pub pages: Option<u32>,
    pub concurrency: Option<usize>,
    pub page_unit: Option<u32>,
    pub detail_concurrency: Option<usize>,
    pub page_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub endpoint: Option<String>,
    pub detail_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    #[serde(default)]
    pub enabled: bool,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with the environment value. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.harvest.endpoint {
            validation::validate_url("harvest.endpoint", endpoint)?;
        }
        if let Some(endpoint) = &self.harvest.detail_endpoint {
            validation::validate_url("harvest.detail_endpoint", endpoint)?;
        }
        if let Some(sources) = &self.aggregate.sources {
            validation::validate_non_empty_list("aggregate.sources", sources)?;
            validation::validate_unique("aggregate.sources", sources)?;
        }
        Ok(())
    }
}
