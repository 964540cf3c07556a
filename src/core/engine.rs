use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct IbEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> IbEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Reading granule and reanalysis fields...");
        let bundle = self.pipeline.extract().await?;
        tracing::info!(
            "Read {} beams and {} pressure levels",
            bundle.granule.beams.len(),
            bundle.series.levels.len()
        );
        self.monitor.log_stats("extract");

        tracing::info!("Computing inverse-barometer response...");
        let result = self.pipeline.transform(bundle).await?;
        let corrected: usize = result.summaries.iter().map(|s| s.corrected).sum();
        let total: usize = result.summaries.iter().map(|s| s.total).sum();
        tracing::info!("Corrected {} of {} segments", corrected, total);
        self.monitor.log_stats("transform");

        tracing::info!("Writing corrected granule...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
