use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::contract::{
    ErrorBody, ResultsQuery, ResultsResponse, SuggestionsQuery, SuggestionsResponse,
};
use crate::model::EntityFilter;
use crate::source::{ResultSource, SourceError, SuggestionSource};

pub const SUGGESTIONS_PATH: &str = "/api/search/suggestions";
pub const RESULTS_PATH: &str = "/api/search";

#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        Self::with_timeout(base_url, None)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, SourceError> {
        Self::with_timeout(&cfg.service_url, Some(cfg.fetch_timeout()))
    }

    fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, SourceError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(SourceError::Rejected("service url is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SuggestionSource for HttpSearchClient {
    async fn fetch_suggestions(
        &self,
        partial: Option<&str>,
        role: Option<&str>,
    ) -> Result<SuggestionsResponse, SourceError> {
        let query = SuggestionsQuery {
            q: partial.filter(|value| !value.trim().is_empty()),
            role,
        };
        self.get_json(SUGGESTIONS_PATH, &query).await
    }
}

#[async_trait]
impl ResultSource for HttpSearchClient {
    async fn fetch_results(
        &self,
        query: &str,
        filter: EntityFilter,
        cap: usize,
    ) -> Result<ResultsResponse, SourceError> {
        let params = ResultsQuery {
            q: query,
            entity_type: filter.as_param(),
            limit: cap,
        };
        self.get_json(RESULTS_PATH, &params).await
    }
}

fn map_reqwest_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        return SourceError::Transport(format!("request timed out: {error}"));
    }
    if error.is_decode() {
        return SourceError::Decode(error.to_string());
    }
    SourceError::Transport(error.to_string())
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
