use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;

use weighin_core::models::{
    ErrorResponse, Goal, GoalInput, NewWeightEntry, WeightEntry, WeightInput, WeightsResponse,
};
use weighin_core::range::DateWindow;

/// Client for the weights/goal REST API. Units on the wire are always pounds.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "weighin-cli/{} (weight tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a 2xx body, or turn a failure into the server's `error` text, falling back to
    /// `fallback` when the body carries none.
    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<T> {
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp, fallback).await);
        }
        resp.json::<T>()
            .await
            .with_context(|| format!("{fallback}: unreadable response"))
    }

    async fn error_from_response(resp: reqwest::Response, fallback: &str) -> anyhow::Error {
        let status = resp.status();
        let message = resp
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.error)
            .filter(|msg| !msg.is_empty());
        tracing::debug!(%status, ?message, "request failed");
        anyhow!(message.unwrap_or_else(|| fallback.to_string()))
    }

    pub async fn list_weights(&self, window: &DateWindow) -> Result<Vec<WeightEntry>> {
        const FALLBACK: &str = "Failed to fetch weights";
        let (start, end) = window.as_query_strings();
        let request = self
            .client
            .get(self.url("/weights"))
            .query(&[("start_date", start), ("end_date", end)]);
        let resp = request.send().await.context(FALLBACK)?;
        let body: WeightsResponse = Self::handle_response(resp, FALLBACK).await?;
        Ok(body.weights)
    }

    pub async fn get_weight(&self, id: i64) -> Result<WeightEntry> {
        const FALLBACK: &str = "Failed to fetch weight entry";
        let resp = self
            .client
            .get(self.url(&format!("/weights/{id}")))
            .send()
            .await
            .context(FALLBACK)?;
        Self::handle_response(resp, FALLBACK).await
    }

    pub async fn create_weight(&self, entry: &NewWeightEntry) -> Result<WeightEntry> {
        const FALLBACK: &str = "Failed to create weight entry";
        let resp = self
            .client
            .post(self.url("/weights"))
            .json(&WeightInput::from(entry))
            .send()
            .await
            .context(FALLBACK)?;
        Self::handle_response(resp, FALLBACK).await
    }

    pub async fn update_weight(&self, id: i64, entry: &NewWeightEntry) -> Result<WeightEntry> {
        const FALLBACK: &str = "Failed to update weight entry";
        let resp = self
            .client
            .put(self.url(&format!("/weights/{id}")))
            .json(&WeightInput::from(entry))
            .send()
            .await
            .context(FALLBACK)?;
        Self::handle_response(resp, FALLBACK).await
    }

    pub async fn delete_weight(&self, id: i64) -> Result<()> {
        const FALLBACK: &str = "Failed to delete weight entry";
        let resp = self
            .client
            .delete(self.url(&format!("/weights/{id}")))
            .send()
            .await
            .context(FALLBACK)?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp, FALLBACK).await);
        }
        Ok(())
    }

    pub async fn get_goal(&self) -> Result<Goal> {
        const FALLBACK: &str = "Failed to fetch goal";
        let resp = self
            .client
            .get(self.url("/goal"))
            .send()
            .await
            .context(FALLBACK)?;
        Self::handle_response(resp, FALLBACK).await
    }

    /// Replace the goal. `None` clears it.
    pub async fn set_goal(&self, pounds: Option<f64>) -> Result<Goal> {
        const FALLBACK: &str = "Failed to update goal";
        let resp = self
            .client
            .put(self.url("/goal"))
            .json(&GoalInput { pounds })
            .send()
            .await
            .context(FALLBACK)?;
        Self::handle_response(resp, FALLBACK).await
    }
}
