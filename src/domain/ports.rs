use crate::domain::model::{OnInvalid, RawEntry, RoundingOutcome, WorkdayConfig};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn days_back(&self) -> i64;
    fn on_invalid(&self) -> OnInvalid;
    fn start_column(&self) -> &str;
    fn stop_column(&self) -> &str;
    fn duration_column(&self) -> &str;
    fn workday(&self) -> Option<&WorkdayConfig>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawEntry>>;
    async fn transform(&self, entries: Vec<RawEntry>) -> Result<RoundingOutcome>;
    async fn load(&self, outcome: RoundingOutcome) -> Result<String>;
}
