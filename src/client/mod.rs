//! # Client Facade
//!
//! Single choke point for outbound calls to the expense API. Every request
//! carries a JSON content type and, when a session is held, a bearer token.
//!
//! ## Error Handling
//!
//! - Non-success responses become [`ClientError::Status`] carrying the status
//!   code and the server's `error` message, or a generic message when the body
//!   cannot be read.
//! - Network failures, timeouts and undecodable success bodies become
//!   [`ClientError::Transport`].
//!
//! ## Submodules
//!
//! - [`expenses`] - list, create, update and delete
//! - [`auth`] - signup, login and logout

pub mod auth;
pub mod expenses;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::{config, error::ClientError, types::ErrorResponse};

#[derive(Debug, Clone)]
pub struct ExpenseClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ExpenseClient {
    /// Builds a client for `base_url` without a session.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root such as `http://127.0.0.1:3001`; a trailing
    ///   slash is ignored
    /// * `timeout` - Applied to every request, connect through body
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the HTTP client cannot be built,
    /// e.g. when no TLS backend is available.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Client pointed at `EXPENSES_API_URL` with the configured timeout.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(config::api_base_url(), config::request_timeout())
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

// Decodes a success body as `T`, or turns the response into a status error.
async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
    let response = builder.send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("Request failed with status {}", status.as_u16()),
        };
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}
