//! HTTP client for the TMDB catalog API.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses and undecodable bodies all surface as
//! [`ApiError`]. List queries made without a credential degrade to an empty
//! page instead, and credential probes collapse every failure to `false`.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::credential::Credential;
use super::query::{self, RequestDescriptor};
use super::types::{Genre, GenreList, MoviePage};
use crate::config::ApiConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("upstream unavailable: {0}")]
    Request(String),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

/// Checks whether a candidate credential is accepted upstream.
#[async_trait::async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate_credential(&self, candidate: &str) -> bool;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl ApiClient {
    /// Build a client from typed API config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            language: config.language.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parameters merged into every request ahead of the descriptor's own.
    #[must_use]
    pub fn base_params(&self, credential: Option<&Credential>) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(credential) = credential {
            params.push(("api_key", credential.as_str().to_owned()));
        }
        params.push(("language", self.language.clone()));
        params
    }

    /// Fetch one page of movies for `request`.
    ///
    /// Without a credential any upstream failure yields an empty page for the
    /// requested page number.
    ///
    /// # Errors
    ///
    /// Returns an error only when a credential was supplied and the request
    /// failed.
    pub async fn movies(
        &self,
        request: &RequestDescriptor,
        credential: Option<&Credential>,
    ) -> Result<MoviePage, ApiError> {
        match self.get_json::<MoviePage>(request, credential).await {
            Ok(page) => Ok(page),
            Err(e) if credential.is_none() => {
                tracing::warn!(path = request.path, error = %e, "catalog request failed without credential");
                Ok(MoviePage::empty(request.page()))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the movie genre list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn genres(&self, credential: Option<&Credential>) -> Result<Vec<Genre>, ApiError> {
        let list: GenreList = self.get_json(&query::genres(), credential).await?;
        Ok(list.genres)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError> {
        let mut params = self.base_params(credential);
        params.extend(request.params.iter().cloned());
        let text = self.send(request.path, &params).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send(&self, path: &str, params: &[(&'static str, String)]) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%path, "catalog request");
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl CredentialValidator for ApiClient {
    /// Probe `/movie/popular` with `candidate` in isolation.
    ///
    /// Success is judged purely on a 200 status; every error is `false`.
    async fn validate_credential(&self, candidate: &str) -> bool {
        let url = format!("{}{}", self.base_url, query::popular(1).path);
        let params = [("api_key", candidate), ("language", self.language.as_str())];
        match self.http.get(url).query(&params).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(error = %e, "credential probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
