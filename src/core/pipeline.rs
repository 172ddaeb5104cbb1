use crate::core::aggregator::aggregate_with_report;
use crate::core::deadline::reference_now;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{AggregateInput, AggregateOutput, Company, JobPosting, JobSource};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::path::Path;

/// Reads the registry and per-source job files, joins them, and writes the merged dataset.
///
/// `data` holds the inputs, `output` receives the merged file. They may point at
/// the same directory.
pub struct AggregatePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) data: S,
    pub(crate) output: S,
    pub(crate) config: C,
    reference_time: Option<DateTime<FixedOffset>>,
}

impl<S: Storage, C: ConfigProvider> AggregatePipeline<S, C> {
    pub fn new(data: S, output: S, config: C) -> Self {
        Self {
            data,
            output,
            config,
            reference_time: None,
        }
    }

    /// Pin "now" instead of reading the clock at transform time.
    pub fn with_reference_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.reference_time = Some(now);
        self
    }

    async fn load_registry(&self) -> Result<Vec<Company>> {
        let path = self.config.companies_file();
        if !self.data.exists(path).await {
            tracing::error!("❌ Company registry missing: {}", path);
            return Err(EtlError::MissingRegistry {
                path: path.to_string(),
            });
        }
        let bytes = self.data.read_file(path).await?;
        let companies: Vec<Company> = serde_json::from_slice(&bytes)?;
        tracing::info!("Loaded {} designated companies", companies.len());
        Ok(companies)
    }

    async fn load_jobs(&self, source: JobSource) -> Vec<JobPosting> {
        let path = source.file_name();
        if !self.data.exists(&path).await {
            tracing::warn!("⚠️ {} missing, continuing without {} postings", path, source);
            return Vec::new();
        }

        let parsed = self.data.read_file(&path).await.and_then(|bytes| {
            serde_json::from_slice::<Vec<SourceFileRecord>>(&bytes).map_err(EtlError::from)
        });

        match parsed {
            Ok(records) => {
                let jobs: Vec<JobPosting> = records
                    .into_iter()
                    .map(|record| record.into_posting(source))
                    .collect();
                tracing::info!("Loaded {} jobs from {}", jobs.len(), source);
                jobs
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not read {}, treating as empty: {}", path, e);
                Vec::new()
            }
        }
    }
}

/// Posting as found on disk; older scraper output omits `source`.
#[derive(Debug, Deserialize)]
struct SourceFileRecord {
    company: String,
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    deadline: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    source: Option<JobSource>,
    #[serde(default)]
    salary: Option<String>,
}

impl SourceFileRecord {
    fn into_posting(self, file_source: JobSource) -> JobPosting {
        JobPosting {
            company: self.company,
            title: self.title,
            link: self.link,
            deadline: self.deadline,
            sector: self.sector,
            source: self.source.unwrap_or(file_source),
            salary: self.salary,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AggregatePipeline<S, C> {
    async fn extract(&self) -> Result<AggregateInput> {
        let companies = self.load_registry().await?;

        let mut job_lists = Vec::with_capacity(self.config.sources().len());
        for source in self.config.sources() {
            job_lists.push(self.load_jobs(*source).await);
        }

        let total: usize = job_lists.iter().map(Vec::len).sum();
        tracing::info!("Total jobs to process: {}", total);

        Ok(AggregateInput {
            companies,
            job_lists,
        })
    }

    async fn transform(&self, data: AggregateInput) -> Result<AggregateOutput> {
        let now = self.reference_time.unwrap_or_else(reference_now);
        tracing::debug!("Reference time: {}", now.to_rfc3339());

        let output = aggregate_with_report(&data.companies, &data.job_lists, now);
        let report = &output.report;

        tracing::info!(
            matched = report.matched,
            jobs = report.jobs_loaded,
            expired = report.expired_filtered,
            unmatched = report.unmatched,
            companies = report.matched_companies,
            active_to = report.personnel.active,
            supplementary_to = report.personnel.supplementary,
            "Matched {} jobs out of {}. (Filtered {} expired jobs)",
            report.matched,
            report.jobs_loaded,
            report.expired_filtered
        );

        Ok(output)
    }

    async fn load(&self, result: AggregateOutput) -> Result<String> {
        let json = serde_json::to_vec_pretty(&result.matched_jobs)?;

        tracing::debug!("Writing {} bytes of matched jobs", json.len());
        self.output.write_file(self.config.output_file(), &json).await?;

        let output_path = Path::new(self.config.output_dir())
            .join(self.config.output_file())
            .display()
            .to_string();
        tracing::info!("Saved matched jobs to {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deadline::reference_offset;
    use crate::domain::model::MatchedJob;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, value: serde_json::Value) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), serde_json::to_vec(&value).unwrap());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    struct MockConfig {
        sources: Vec<JobSource>,
    }

    impl ConfigProvider for MockConfig {
        fn data_dir(&self) -> &str {
            "data"
        }

        fn output_dir(&self) -> &str {
            "public"
        }

        fn companies_file(&self) -> &str {
            "companies.json"
        }

        fn output_file(&self) -> &str {
            "matched_jobs.json"
        }

        fn sources(&self) -> &[JobSource] {
            &self.sources
        }
    }

    fn pipeline(data: MockStorage, output: MockStorage) -> AggregatePipeline<MockStorage, MockConfig> {
        let config = MockConfig {
            sources: vec![JobSource::Saramin, JobSource::Jobkorea, JobSource::Wanted],
        };
        AggregatePipeline::new(data, output, config).with_reference_time(
            reference_offset()
                .with_ymd_and_hms(2025, 6, 10, 12, 0, 0)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_extract_fails_without_registry() {
        let data = MockStorage::default();
        data.put("jobs_saramin.json", serde_json::json!([])).await;

        let err = pipeline(data, MockStorage::default())
            .extract()
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::MissingRegistry { .. }));
    }

    #[tokio::test]
    async fn test_extract_treats_missing_sources_as_empty() {
        let data = MockStorage::default();
        data.put("companies.json", serde_json::json!([{"name": "테크코", "sector": "", "location": "서울"}]))
            .await;
        data.put(
            "jobs_wanted.json",
            serde_json::json!([{"company": "테크코", "title": "개발자", "link": "https://w/1", "deadline": "D-1", "sector": "IT", "source": "wanted"}]),
        )
        .await;

        let input = pipeline(data, MockStorage::default()).extract().await.unwrap();

        assert_eq!(input.companies.len(), 1);
        assert_eq!(input.job_lists.len(), 3);
        assert!(input.job_lists[0].is_empty());
        assert!(input.job_lists[1].is_empty());
        assert_eq!(input.job_lists[2].len(), 1);
    }

    #[tokio::test]
    async fn test_extract_fills_missing_source_tag_from_file() {
        let data = MockStorage::default();
        data.put("companies.json", serde_json::json!([])).await;
        data.put(
            "jobs_jobkorea.json",
            serde_json::json!([{"company": "테크코", "title": "개발자", "link": "", "deadline": "", "sector": ""}]),
        )
        .await;

        let input = pipeline(data, MockStorage::default()).extract().await.unwrap();

        assert_eq!(input.job_lists[1][0].source, JobSource::Jobkorea);
    }

    #[tokio::test]
    async fn test_extract_skips_malformed_job_file() {
        let data = MockStorage::default();
        data.put("companies.json", serde_json::json!([])).await;
        data.put("jobs_saramin.json", serde_json::json!({"not": "a list"})).await;

        let input = pipeline(data, MockStorage::default()).extract().await.unwrap();

        assert!(input.job_lists.iter().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_full_run_writes_matched_jobs() {
        let data = MockStorage::default();
        let output = MockStorage::default();
        data.put(
            "companies.json",
            serde_json::json!([{"name": "(주)테크코", "sector": "정보처리", "location": "서울"}]),
        )
        .await;
        data.put(
            "jobs_saramin.json",
            serde_json::json!([
                {"company": "테크코", "title": "백엔드", "link": "https://s/1", "deadline": "D-3", "sector": "IT", "source": "saramin"},
                {"company": "다른회사", "title": "백엔드", "link": "https://s/2", "deadline": "D-3", "sector": "IT", "source": "saramin"},
                {"company": "테크코", "title": "마감됨", "link": "https://s/3", "deadline": "2025.06.01", "sector": "IT", "source": "saramin"}
            ]),
        )
        .await;

        let pipeline = pipeline(data, output.clone());
        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        assert_eq!(result.report.expired_filtered, 1);

        let path = pipeline.load(result).await.unwrap();
        assert_eq!(path, Path::new("public").join("matched_jobs.json").display().to_string());

        let written = output.get_file("matched_jobs.json").await.unwrap();
        let matched: Vec<MatchedJob> = serde_json::from_slice(&written).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].job.link, "https://s/1");
        assert_eq!(matched[0].designated_company_info.location, "서울");
        assert!(String::from_utf8(written).unwrap().contains("\n  {\n"));
    }
}
