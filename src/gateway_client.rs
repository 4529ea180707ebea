use async_trait::async_trait;
use std::time::Duration;

use crate::errors::LeadError;
use crate::lead_sink::LeadSink;
use crate::models::{NormalizedLead, Submission};

/// Forwards validated leads to the external lead API.
#[derive(Clone)]
pub struct LeadApiClient {
    client: reqwest::Client,
    url: String,
}

impl LeadApiClient {
    /// Creates a new `LeadApiClient`.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint that receives `POST`ed leads.
    /// * `timeout` - Overall timeout for each request.
    pub fn new(url: String, timeout: Duration) -> Result<Self, LeadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadError::Transport(format!("Failed to create lead API client: {}", e)))?;

        Ok(Self { client, url })
    }

    /// Sends a lead upstream.
    ///
    /// A 2xx answer whose body is not JSON still counts as success and yields
    /// an empty object.
    ///
    /// # Returns
    ///
    /// * `Result<serde_json::Value, LeadError>` - The upstream response body.
    pub async fn forward_lead(&self, lead: &NormalizedLead) -> Result<serde_json::Value, LeadError> {
        tracing::info!("Forwarding lead {} to {}", lead.email(), self.url);

        let response = self
            .client
            .post(&self.url)
            .json(lead)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LeadError::UpstreamRejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let data = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            tracing::debug!("Lead API returned a non-JSON body ({} bytes)", bytes.len());
            serde_json::json!({})
        });

        tracing::info!("✅ Lead accepted by lead API ({})", status);
        Ok(data)
    }
}

#[async_trait]
impl LeadSink for LeadApiClient {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn submit(&self, lead: &NormalizedLead) -> Result<Submission, LeadError> {
        self.forward_lead(lead).await.map(Submission::Forwarded)
    }
}
