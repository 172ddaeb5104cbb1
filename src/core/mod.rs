pub mod aggregator;
pub mod deadline;
pub mod etl;
pub mod normalize;
pub mod pipeline;
pub mod scheduler;

pub use crate::domain::model::{
    AggregateInput, AggregateOutput, AggregationReport, Company, JobPosting, JobSource, MatchedJob,
};
pub use crate::domain::ports::{ConfigProvider, PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
