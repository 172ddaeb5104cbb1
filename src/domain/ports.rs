use crate::domain::model::{AggregateInput, AggregateOutput, Company, JobSource};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Paths and source selection for one aggregation run.
pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn companies_file(&self) -> &str;
    fn output_file(&self) -> &str;
    fn sources(&self) -> &[JobSource];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AggregateInput>;
    async fn transform(&self, data: AggregateInput) -> Result<AggregateOutput>;
    async fn load(&self, result: AggregateOutput) -> Result<String>;
}

/// One page of the paginated company registry.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Company>>;
}
