use std::time::Duration;

use async_trait::async_trait;

use crate::contract::{ResultsResponse, SuggestionsResponse};
use crate::model::EntityFilter;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch_suggestions(
        &self,
        partial: Option<&str>,
        role: Option<&str>,
    ) -> Result<SuggestionsResponse, SourceError>;
}

#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch_results(
        &self,
        query: &str,
        filter: EntityFilter,
        cap: usize,
    ) -> Result<ResultsResponse, SourceError>;
}
