//! HTTP client for library service requests.
//!
//! This module provides a thin wrapper around `reqwest` that attaches the
//! bearer token when asked to, and turns non-success responses into
//! `ApiError::Rejected` carrying the service's own error text.

use super::ApiError;
use log::*;
use reqwest::{Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Makes JSON requests to the service and conforms responses to the
/// requested type.
///
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given base URL and request timeout.
    ///
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Send `body` as JSON to `path` with `POST` and decode the response as
    /// `T`. The bearer token is attached when supplied.
    ///
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self.call(Method::POST, path, body, bearer).await?;
        let bytes = Self::check(response).await?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    }

    /// Make request and return the raw response or a transport error.
    ///
    async fn call<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let request_url = format!("{}{}", self.base_url, path);
        debug!("API {} {}", method, request_url);

        let mut request = self
            .http_client
            .request(method, &request_url)
            .header("Accept", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        Ok(request.send().await?)
    }

    /// Return the response body for a success status, otherwise the error
    /// message found in the body's `error` field.
    ///
    async fn check(response: Response) -> Result<Vec<u8>, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message = serde_json::from_slice::<serde_json::Value>(&bytes)
            .ok()
            .and_then(|body| {
                body.get("error")
                    .or_else(|| body.get("message"))
                    .and_then(|e| e.as_str())
                    .map(str::to_owned)
            })
            .unwrap_or_default();
        warn!(
            "API request failed with status {}: {}",
            status,
            String::from_utf8_lossy(&bytes)
        );
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
