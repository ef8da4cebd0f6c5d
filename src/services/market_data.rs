//! Bar source interface for market data collaborators.

use crate::models::bar::Bar;
use async_trait::async_trait;

#[async_trait]
pub trait BarSource: Send + Sync {
    /// Daily bars for `ticker`, ascending by date with no duplicate dates.
    async fn fetch_bars(
        &self,
        ticker: &str,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
