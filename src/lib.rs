pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{MmaRegistrySource, MmaSourceConfig};
pub use crate::config::{cli::LocalStorage, harvest::HarvestConfig, AggregateConfig};
pub use crate::core::{
    aggregator::{aggregate, aggregate_with_report},
    deadline::{parse_deadline, reference_now},
    etl::EtlEngine,
    normalize::normalize,
    pipeline::AggregatePipeline,
    scheduler::{HarvestResult, PageFetchScheduler, SchedulerConfig},
};
pub use crate::domain::model::{Company, JobPosting, JobSource, MatchedJob};
pub use crate::utils::error::{EtlError, Result};

#[cfg(feature = "cli")]
pub use crate::config::{harvest::HarvestArgs, AggregateArgs};
