//! HTTP/JSON implementation of [`FinanceApi`]

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{ApiError, CategorizeRequest, EnrichedPayload, FinanceApi, TransactionQuery, error_detail};
use crate::config::ClientConfig;
use crate::projection::{ProjectionParameters, ProjectionResult};
use crate::transactions::{EnrichmentResult, NewTransaction, TransactionId, TransactionRecord};

/// Backend client over reqwest
#[derive(Debug, Clone)]
pub struct HttpFinanceApi {
    client: reqwest::Client,
    base_url: String,
    list_limit: u32,
}

impl HttpFinanceApi {
    /// Build a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            list_limit: config.list_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a response into `T`, mapping non-2xx statuses to [`ApiError::Status`]
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ApiError::status(status.as_u16(), message));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FinanceApi for HttpFinanceApi {
    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>, ApiError> {
        let limit = query.limit.unwrap_or(self.list_limit);
        let mut params = vec![("limit", limit.to_string())];
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }

        log::debug!("GET /transactions q={:?} limit={}", query.q, limit);
        let response = self
            .client
            .get(self.url("/transactions"))
            .query(&params)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_enrichment(&self, id: TransactionId) -> Result<Option<EnrichmentResult>, ApiError> {
        log::debug!("GET /transactions/{}/enriched", id);
        let response = self
            .client
            .get(self.url(&format!("/transactions/{}/enriched", id)))
            .send()
            .await?;
        let payload: Option<EnrichedPayload> = Self::decode(response).await?;
        Ok(payload.map(EnrichedPayload::into_result))
    }

    async fn categorize(&self, request: &CategorizeRequest) -> Result<EnrichmentResult, ApiError> {
        log::debug!("POST /categorize transaction_id={:?}", request.transaction_id);
        let response = self
            .client
            .post(self.url("/categorize"))
            .json(request)
            .send()
            .await?;
        let payload: EnrichedPayload = Self::decode(response).await?;
        Ok(payload.into_categorized())
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<TransactionRecord, ApiError> {
        log::debug!("POST /transactions description={:?}", transaction.description);
        let response = self
            .client
            .post(self.url("/transactions"))
            .json(transaction)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn simulate(&self, params: &ProjectionParameters) -> Result<ProjectionResult, ApiError> {
        log::debug!("POST /simulate/coffee {:?}", params);
        let response = self
            .client
            .post(self.url("/simulate/coffee"))
            .json(params)
            .send()
            .await?;
        Self::decode(response).await
    }
}
