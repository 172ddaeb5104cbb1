use crate::domain::model::Company;
use crate::domain::ports::{PageSource, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Rough size of the designated-company registry.
pub const ESTIMATED_REGISTRY_SIZE: u32 = 25_000;
/// Rows requested per registry page.
pub const DEFAULT_PAGE_UNIT: u32 = 1_000;
/// Twice the pages the estimated registry needs; trailing pages come back empty.
pub const DEFAULT_PAGE_COUNT: u32 = ESTIMATED_REGISTRY_SIZE / DEFAULT_PAGE_UNIT * 2;
pub const DEFAULT_CONCURRENCY: usize = 2;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub page_count: u32,
    pub concurrency: usize,
    /// Pause before each page request, inside the page task. A finished page is
    /// recorded without waiting on it.
    pub page_delay: Duration,
    /// Storage path the accumulated registry is checkpointed to.
    pub output_file: String,
}

impl SchedulerConfig {
    pub fn new(page_count: u32, concurrency: usize, output_file: impl Into<String>) -> Self {
        Self {
            page_count,
            concurrency,
            page_delay: Duration::ZERO,
            output_file: output_file.into(),
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_COUNT, DEFAULT_CONCURRENCY, "companies.json")
    }
}

#[derive(Debug, Clone, Default)]
pub struct HarvestResult {
    /// Completion order, not page order.
    pub companies: Vec<Company>,
    pub pages_with_records: u32,
    pub empty_pages: u32,
    pub failed_pages: u32,
    pub checkpoints: u32,
}

/// Fetches registry pages `1..=page_count` with at most `concurrency` in flight,
/// checkpointing the accumulated companies after every page that yielded records.
pub struct PageFetchScheduler<P: PageSource, S: Storage> {
    source: P,
    storage: S,
    config: SchedulerConfig,
    monitor: Option<SystemMonitor>,
}

impl<P: PageSource, S: Storage> PageFetchScheduler<P, S> {
    pub fn new(source: P, storage: S, config: SchedulerConfig) -> Self {
        Self {
            source,
            storage,
            config,
            monitor: None,
        }
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub async fn run(&self) -> Result<HarvestResult> {
        tracing::info!(
            pages = self.config.page_count,
            concurrency = self.config.concurrency,
            output = %self.config.output_file,
            "🚀 Starting registry harvest"
        );

        let mut result = HarvestResult::default();
        let mut pages = stream::iter(1..=self.config.page_count)
            .map(|page| self.fetch_page(page))
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((page, outcome)) = pages.next().await {
            match outcome {
                Ok(batch) if !batch.is_empty() => {
                    tracing::debug!(page, records = batch.len(), "page complete");
                    result.pages_with_records += 1;
                    result.companies.extend(batch);
                    // A failed checkpoint is not fatal; the next one or the final flush retries.
                    match self.checkpoint(&result.companies).await {
                        Ok(()) => result.checkpoints += 1,
                        Err(e) => tracing::warn!(page, "Checkpoint write failed: {}", e),
                    }
                }
                Ok(_) => {
                    tracing::debug!(page, "page returned no records");
                    result.empty_pages += 1;
                }
                Err(e) => {
                    tracing::warn!(page, "Page fetch failed, treating as empty: {}", e);
                    result.failed_pages += 1;
                }
            }
        }

        self.checkpoint(&result.companies).await?;
        result.checkpoints += 1;

        tracing::info!(
            companies = result.companies.len(),
            pages_with_records = result.pages_with_records,
            empty_pages = result.empty_pages,
            failed_pages = result.failed_pages,
            "✅ Registry harvest complete"
        );
        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        Ok(result)
    }

    async fn fetch_page(&self, page: u32) -> (u32, Result<Vec<Company>>) {
        if !self.config.page_delay.is_zero() {
            tokio::time::sleep(self.config.page_delay).await;
        }
        tracing::debug!(page, "fetching registry page");
        (page, self.source.fetch_page(page).await)
    }

    async fn checkpoint(&self, companies: &[Company]) -> Result<()> {
        let json = serde_json::to_vec_pretty(companies)?;
        self.storage.write_file(&self.config.output_file, &json).await?;
        tracing::info!(companies = companies.len(), "💾 Progress saved");
        if let Some(monitor) = &self.monitor {
            monitor.log_stats("checkpoint");
        }
        Ok(())
    }
}
