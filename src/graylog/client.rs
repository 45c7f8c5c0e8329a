//! Graylog REST API client.
//!
//! This module provides the HTTP client for the Graylog `system/sessions`
//! and `system/inputs` endpoints, and implements [`RemoteState`] on top of
//! them. Requests are never retried: any failure is reported to the caller.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::config::{ApiConfig, InputSpec};
use crate::error::{ApiError, GraylogStateError, Result};
use crate::remote::RemoteState;

use super::types::{
    ErrorResponse, InputIdResponse, InputListResponse, ObservedInput, SessionRequest,
    SessionResponse,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Value of the `X-Requested-By` header Graylog requires on mutating calls.
const REQUESTED_BY: &str = "graylog-state";

/// Password paired with a session token in basic auth.
const SESSION_PASSWORD: &str = "session";

/// Graylog API client.
#[derive(Debug, Clone)]
pub struct GraylogClient {
    /// HTTP client.
    client: Client,
    /// API base URL without trailing slash.
    base_url: String,
    /// Session token, once authenticated.
    token: Option<String>,
}

impl GraylogClient {
    /// Creates an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates an unauthenticated client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Creates a client and opens a session with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created or authentication fails.
    pub async fn connect(api: &ApiConfig) -> Result<Self> {
        let mut client = Self::with_timeout(&api.url, api.timeout_secs)?;
        client.authenticate(&api.user, &api.pass).await?;
        Ok(client)
    }

    /// Uses an existing session token instead of authenticating.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns true once a session token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Opens a session and stores its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials or returns no token.
    pub async fn authenticate(&mut self, user: &str, pass: &str) -> Result<()> {
        debug!("Opening Graylog session for user {user}");

        let request = SessionRequest {
            username: user,
            password: pass,
            host: "",
        };

        let response = self
            .client
            .post(self.endpoint("system/sessions"))
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Requested-By", REQUESTED_BY)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(GraylogStateError::Api(ApiError::AuthenticationFailed {
                message: format!("{status}: {message}"),
            }));
        }

        let session: SessionResponse = decode(response).await?;
        if session.token.is_empty() {
            return Err(GraylogStateError::Api(ApiError::AuthenticationFailed {
                message: String::from("server returned no session token"),
            }));
        }

        info!(
            "Authenticated against {} (valid until {})",
            self.base_url,
            session.valid_until.as_deref().unwrap_or("unknown")
        );
        self.token = Some(session.token);
        Ok(())
    }

    /// Lists every input on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an input's attributes are
    /// not a key/value mapping.
    pub async fn list_inputs(&self) -> Result<Vec<ObservedInput>> {
        let response = self.send(self.request(Method::GET, "system/inputs")?, None).await?;
        let list: InputListResponse = decode(response).await?;

        debug!("Server reports {} inputs", list.total);

        list.inputs
            .into_iter()
            .map(|summary| ObservedInput::try_from(summary).map_err(GraylogStateError::from))
            .collect()
    }

    /// Creates an input and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no identifier is returned.
    pub async fn create_input(&self, input: &InputSpec) -> Result<String> {
        let builder = self.request(Method::POST, "system/inputs")?.json(input);
        let response = self.send(builder, None).await?;
        let created: InputIdResponse = decode(response).await?;

        if created.id.is_empty() {
            return Err(GraylogStateError::Api(ApiError::invalid_response(format!(
                "no id returned for created input '{}'",
                input.title
            ))));
        }

        Ok(created.id)
    }

    /// Replaces an input's definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not exist or the request fails.
    pub async fn update_input(&self, id: &str, input: &InputSpec) -> Result<()> {
        let builder = self
            .request(Method::PUT, &format!("system/inputs/{id}"))?
            .json(input);
        self.send(builder, Some(id)).await?;
        Ok(())
    }

    /// Deletes an input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not exist or the request fails.
    pub async fn delete_input(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("system/inputs/{id}"))?;
        self.send(builder, Some(id)).await?;
        Ok(())
    }

    /// Builds an absolute endpoint URL.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds an authenticated request.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or_else(|| ApiError::AuthenticationFailed {
            message: String::from("no session; call authenticate first"),
        })?;

        trace!("{method} {path}");

        Ok(self
            .client
            .request(method, self.endpoint(path))
            .basic_auth(token, Some(SESSION_PASSWORD))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header("X-Requested-By", REQUESTED_BY))
    }

    /// Sends a request and maps non-success statuses to errors.
    ///
    /// `input_id` turns a 404 into [`ApiError::InputNotFound`].
    async fn send(&self, builder: RequestBuilder, input_id: Option<&str>) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = error_message(response).await;
            return Err(GraylogStateError::Api(ApiError::AuthenticationFailed {
                message: format!("{status}: {message}"),
            }));
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = input_id {
                return Err(GraylogStateError::Api(ApiError::InputNotFound {
                    input_id: id.to_string(),
                }));
            }
        }

        let message = error_message(response).await;
        Err(GraylogStateError::Api(ApiError::request_failed(
            status.as_u16(),
            message,
        )))
    }
}

#[async_trait]
impl RemoteState for GraylogClient {
    async fn fetch_all(&self) -> Result<Vec<ObservedInput>> {
        self.list_inputs().await
    }

    async fn create(&self, input: &InputSpec) -> Result<String> {
        self.create_input(input).await
    }

    async fn update(&self, id: &str, input: &InputSpec) -> Result<()> {
        self.update_input(id, input).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_input(id).await
    }

    fn backend_type(&self) -> &'static str {
        "graylog"
    }
}

/// Decodes a JSON response body.
async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

    serde_json::from_str(&body).map_err(|e| {
        GraylogStateError::Api(ApiError::invalid_response(format!(
            "Failed to decode response: {e}"
        )))
    })
}

/// Extracts the most useful message from an error response.
async fn error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) if !err.message.is_empty() => err.message,
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = GraylogClient::new("http://localhost:9000/api/").unwrap();
        assert_eq!(
            client.endpoint("system/inputs"),
            "http://localhost:9000/api/system/inputs"
        );
        assert_eq!(
            client.endpoint("/system/sessions"),
            "http://localhost:9000/api/system/sessions"
        );
    }

    #[test]
    fn test_request_requires_session() {
        let client = GraylogClient::new("http://localhost:9000/api").unwrap();
        assert!(!client.is_authenticated());
        assert!(client.request(Method::GET, "system/inputs").is_err());

        let client = client.with_token("abc");
        assert!(client.is_authenticated());
        assert!(client.request(Method::GET, "system/inputs").is_ok());
    }
}
