//! HTTP client for the sentiment service

mod error;

pub use error::{ApiError, ApiErrorKind};

use crate::auth::BearerToken;
use crate::runtime::SentimentApi;
use crate::sentiment::{AnalyzeResponse, HistoryPage, HistoryQuery};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// `SentimentApi` over HTTP
#[derive(Clone)]
pub struct HttpSentimentApi {
    client: Client,
    base_url: String,
}

impl HttpSentimentApi {
    /// `timeout` bounds each request; `None` waits as long as the service takes
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `GET /api/health`; returns the reported status
    pub async fn health(&self) -> Result<String, ApiError> {
        let request = self.client.get(self.url("/api/health"));
        let response: HealthResponse = self.fetch_json(request, "health").await?;
        Ok(response.status)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn history_entry_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url("/api/history"))
            .map_err(|e| ApiError::unknown(format!("Invalid service URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::unknown("Service URL cannot take a path"))?
            .push(id);
        Ok(url)
    }

    fn authorize(request: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<String, ApiError> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ApiError::network(format!("Connection failed: {e}"))
            } else {
                ApiError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

        tracing::debug!(
            operation,
            status = status.as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "Sentiment service responded"
        );

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }
        Ok(body)
    }

    async fn fetch_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<R, ApiError> {
        let body = self.send(request, operation).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::decode(format!("Failed to parse {operation} response: {e} - body: {body}"))
        })
    }
}

#[async_trait]
impl SentimentApi for HttpSentimentApi {
    async fn analyze(
        &self,
        text: &str,
        token: Option<&BearerToken>,
    ) -> Result<AnalyzeResponse, ApiError> {
        let request = self
            .client
            .post(self.url("/api/analyze"))
            .json(&AnalyzeRequest { text });
        self.fetch_json(Self::authorize(request, token), "analyze")
            .await
    }

    async fn list_history(
        &self,
        query: HistoryQuery,
        token: Option<&BearerToken>,
    ) -> Result<HistoryPage, ApiError> {
        let request = self
            .client
            .get(self.url("/api/history"))
            .query(&[("page", query.page), ("limit", query.limit)]);
        self.fetch_json(Self::authorize(request, token), "history")
            .await
    }

    async fn delete_history(&self, id: &str, token: Option<&BearerToken>) -> Result<(), ApiError> {
        let request = self.client.delete(self.history_entry_url(id)?);
        self.send(Self::authorize(request, token), "delete").await?;
        Ok(())
    }
}
