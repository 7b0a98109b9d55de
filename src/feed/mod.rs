pub mod api_sports;
pub mod simulated;
pub mod source;
pub mod types;

use crate::engine::SportKind;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use source::DataSource;

/// Raw access to the remote sports API.
///
/// Implementations return the decoded `response` array; transport errors,
/// non-2xx statuses and payload `errors` all come back as `Err`.
#[async_trait]
pub trait SportsApi: Send + Sync {
    async fn get(
        &self,
        sport: SportKind,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>>;
}
