use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load in order. Nothing is written unless
    /// the first two phases succeed.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Aggregating data from multiple sources...");
        self.monitor.log_stats("start");

        let input = self.pipeline.extract().await?;
        self.monitor.log_stats("extract");

        let output = self.pipeline.transform(input).await?;
        self.monitor.log_stats("transform");

        let output_path = self.pipeline.load(output).await?;
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
