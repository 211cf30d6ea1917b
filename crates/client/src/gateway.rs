//! Transport for checkout submissions.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use domain::{CheckoutRequest, OrderId};

use crate::config::ClientConfig;
use crate::error::GatewayError;

/// Sends a checkout request and returns the new order's id.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn submit(&self, request: &CheckoutRequest) -> Result<OrderId, GatewayError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accepted {
    order_id: OrderId,
}

#[derive(Deserialize)]
struct Refused {
    message: Option<String>,
}

/// Posts to `/api/checkout` over HTTP. One attempt, no retry.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    url: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            url: config.url("/api/checkout"),
        }
    }
}

#[async_trait]
impl CheckoutGateway for HttpGateway {
    #[tracing::instrument(skip(self, request), fields(url = %self.url, items = request.items.len()))]
    async fn submit(&self, request: &CheckoutRequest) -> Result<OrderId, GatewayError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Refused>(&text)
                .ok()
                .and_then(|r| r.message)
                .filter(|m| !m.trim().is_empty());
            tracing::debug!(status = status.as_u16(), ?message, "checkout refused");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: Accepted = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(body.order_id)
    }
}
