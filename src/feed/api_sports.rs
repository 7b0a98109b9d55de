use super::types::ApiEnvelope;
use super::SportsApi;
use crate::config::SportsApiConfig;
use crate::engine::SportKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const KEY_HEADER: &str = "x-rapidapi-key";

/// API-Sports client: one base URL per sport, key sent as a header.
pub struct ApiSportsClient {
    client: Client,
    api_key: String,
    football_url: String,
    tennis_url: String,
    basketball_url: String,
}

impl ApiSportsClient {
    pub fn new(api_key: String, config: &SportsApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build api-sports HTTP client")?;
        Ok(Self {
            client,
            api_key,
            football_url: config.football_url.trim_end_matches('/').to_string(),
            tennis_url: config.tennis_url.trim_end_matches('/').to_string(),
            basketball_url: config.basketball_url.trim_end_matches('/').to_string(),
        })
    }

    fn base_url(&self, sport: SportKind) -> &str {
        match sport {
            SportKind::Football => &self.football_url,
            SportKind::Tennis => &self.tennis_url,
            SportKind::Basketball => &self.basketball_url,
        }
    }
}

#[async_trait]
impl SportsApi for ApiSportsClient {
    async fn get(
        &self,
        sport: SportKind,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.base_url(sport), endpoint);

        let resp = self
            .client
            .get(&url)
            .header(KEY_HEADER, &self.api_key)
            .query(params)
            .send()
            .await
            .with_context(|| format!("api-sports {sport}/{endpoint} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("api-sports {}/{} ({}): {}", sport, endpoint, status, body);
        }

        let envelope: ApiEnvelope = resp
            .json()
            .await
            .with_context(|| format!("failed to parse api-sports {sport}/{endpoint} response"))?;

        envelope.into_response()
    }
}
