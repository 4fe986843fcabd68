//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::auth::BearerToken;
use crate::client::ApiError;
use crate::sentiment::{AnalyzeResponse, HistoryPage, HistoryQuery};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote sentiment service
#[async_trait]
pub trait SentimentApi: Send + Sync {
    /// Analyze `text` exactly as typed
    async fn analyze(
        &self,
        text: &str,
        token: Option<&BearerToken>,
    ) -> Result<AnalyzeResponse, ApiError>;

    /// Fetch one page of stored analyses
    async fn list_history(
        &self,
        query: HistoryQuery,
        token: Option<&BearerToken>,
    ) -> Result<HistoryPage, ApiError>;

    /// Delete a stored analysis
    async fn delete_history(&self, id: &str, token: Option<&BearerToken>) -> Result<(), ApiError>;
}

/// Source of the bearer credential attached to each call
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<BearerToken>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SentimentApi + ?Sized> SentimentApi for Arc<T> {
    async fn analyze(
        &self,
        text: &str,
        token: Option<&BearerToken>,
    ) -> Result<AnalyzeResponse, ApiError> {
        (**self).analyze(text, token).await
    }

    async fn list_history(
        &self,
        query: HistoryQuery,
        token: Option<&BearerToken>,
    ) -> Result<HistoryPage, ApiError> {
        (**self).list_history(query, token).await
    }

    async fn delete_history(&self, id: &str, token: Option<&BearerToken>) -> Result<(), ApiError> {
        (**self).delete_history(id, token).await
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn bearer_token(&self) -> Option<BearerToken> {
        (**self).bearer_token()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    fn bearer_token(&self) -> Option<BearerToken> {
        (**self).bearer_token()
    }
}
