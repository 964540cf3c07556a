use crate::domain::model::{CorrectionResult, ExtractBundle};
use crate::reanalysis::Reanalysis;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn file_exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Path of the input granule, relative to the data directory unless absolute.
    fn granule(&self) -> &str;
    /// Directory holding reanalysis fields and receiving the output granule.
    fn data_directory(&self) -> &str;
    fn reanalysis(&self) -> Reanalysis;
    /// Seawater density in kg/m³.
    fn density(&self) -> f64;
    /// First and last year of the long-term mean pressure field, if configured.
    fn mean_range(&self) -> Option<(i32, i32)>;
    /// Base URL for fetching missing reanalysis files.
    fn endpoint(&self) -> Option<&str>;
    fn clobber(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractBundle>;
    async fn transform(&self, bundle: ExtractBundle) -> Result<CorrectionResult>;
    async fn load(&self, result: CorrectionResult) -> Result<String>;
}
