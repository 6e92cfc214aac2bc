//! Request/response gateway shared by every view.
//!
//! # Design
//! - Every outbound call ends as a [`RawResponse`]; a call that never got an
//!   HTTP answer is recorded as status `-1` with no body.
//! - [`classify`] is the single, pure classification step from a raw
//!   response to an [`ApiOutcome`]. It performs no side effects; the console
//!   context decides what to show or where to navigate.
//! - No retries and no cancellation: each call is issued once and its result
//!   handed back as-is.

use std::error::Error as StdError;
use std::time::Duration;

use authbox_api_models::ErrorBody;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Prefix shared by every management API path.
pub const API_PREFIX: &str = "/api";
/// Start of the login page the server returns instead of JSON once the session is gone.
pub const LOGIN_PAGE_MARKER: &str = "<!DOCTYPE html>";
/// Navigation target after a payload-level session expiry.
pub const LOGOUT_PATH: &str = "/logout";
/// Form login endpoint.
pub const LOGIN_PATH: &str = "/login";
/// Self-service registration endpoint (outside `/api`).
pub const REGISTRATION_PATH: &str = "/registration";
/// Status recorded when no HTTP response was received at all.
pub const NO_RESPONSE_STATUS: i32 = -1;
/// Header carrying the per-process trace identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

const STATUS_FORBIDDEN: i32 = 403;
const HEADER_CONTENT_TYPE: &str = "content-type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// How an expired session was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySignal {
    /// A 2xx response carried the login page instead of JSON.
    LoginPage,
    /// No HTTP response and no body: the connection-level session is gone.
    ConnectionLost,
}

/// Result of one gateway call, consumed exhaustively by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// The call succeeded and the body decoded into `T`.
    Ok(T),
    /// The session expired; no data is delivered.
    SessionExpired(ExpirySignal),
    /// The server answered 403.
    AccessDenied,
    /// The server rejected the call with a structured error body.
    BusinessError(ErrorBody),
    /// Anything else: undecodable bodies, unexpected statuses, local failures.
    TransportError(String),
}

impl<T> ApiOutcome<T> {
    /// Transform the success payload, keeping every failure untouched.
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            Self::Ok(value) => ApiOutcome::Ok(op(value)),
            Self::SessionExpired(signal) => ApiOutcome::SessionExpired(signal),
            Self::AccessDenied => ApiOutcome::AccessDenied,
            Self::BusinessError(body) => ApiOutcome::BusinessError(body),
            Self::TransportError(detail) => ApiOutcome::TransportError(detail),
        }
    }

    /// Whether the call delivered data.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Status and body of a finished call, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status, or [`NO_RESPONSE_STATUS`].
    pub status: i32,
    /// Raw body text, if any was read.
    pub body: Option<String>,
}

impl RawResponse {
    /// Response with a status and body.
    #[must_use]
    pub fn new(status: i32, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    /// Marker for a call that never produced an HTTP response.
    #[must_use]
    pub const fn no_response() -> Self {
        Self {
            status: NO_RESPONSE_STATUS,
            body: None,
        }
    }

    fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|body| !body.trim().is_empty())
    }
}

/// Classify a raw response, decoding a success body as JSON into `T`.
///
/// An empty success body decodes as JSON `null`.
pub fn classify<T: DeserializeOwned>(raw: RawResponse) -> ApiOutcome<T> {
    classify_with(raw, |body| {
        serde_json::from_str(body).map_err(|err| err.to_string())
    })
}

/// Classify a raw response whose success body is irrelevant.
pub fn classify_discard(raw: RawResponse) -> ApiOutcome<()> {
    classify_with(raw, |_| Ok(()))
}

/// Classify a raw response with a caller-supplied success decoder.
pub fn classify_with<T, F>(raw: RawResponse, decode: F) -> ApiOutcome<T>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    if raw.is_success() {
        let text = raw.body.as_deref().unwrap_or_default();
        if text.starts_with(LOGIN_PAGE_MARKER) {
            return ApiOutcome::SessionExpired(ExpirySignal::LoginPage);
        }
        let payload = if text.trim().is_empty() { "null" } else { text };
        return match decode(payload) {
            Ok(value) => ApiOutcome::Ok(value),
            Err(detail) => {
                ApiOutcome::TransportError(format!("failed to decode response body: {detail}"))
            }
        };
    }

    if raw.status == STATUS_FORBIDDEN {
        return ApiOutcome::AccessDenied;
    }
    if raw.status == NO_RESPONSE_STATUS && !raw.has_body() {
        return ApiOutcome::SessionExpired(ExpirySignal::ConnectionLost);
    }

    match raw
        .body
        .as_deref()
        .and_then(|body| serde_json::from_str::<ErrorBody>(body).ok())
    {
        Some(body) => ApiOutcome::BusinessError(body),
        None => ApiOutcome::TransportError(format!("request failed with status {}", raw.status)),
    }
}

/// Errors raised while building the gateway or preparing a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The base URL cannot carry request paths.
    #[error("invalid base URL")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
    /// A request path could not be resolved against the base URL.
    #[error("invalid request path")]
    InvalidPath {
        /// Offending path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// A header value contained characters HTTP does not allow.
    #[error("invalid header value")]
    InvalidHeader {
        /// Header the value was meant for.
        name: &'static str,
    },
    /// The request body could not be encoded.
    #[error("failed to encode request body")]
    EncodeBody {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The sign-in request itself failed.
    #[error("sign-in request failed")]
    SignIn {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The server refused the credentials.
    #[error("sign-in was rejected")]
    SignInRejected {
        /// Account that attempted to sign in.
        username: String,
    },
}

/// Settings needed to construct a [`Gateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server root; API paths are resolved against it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value sent in the `x-request-id` header.
    pub trace_id: String,
    /// Optional bearer token.
    pub access_token: Option<String>,
}

/// One outbound call: method, path, query, extra headers and an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl ApiRequest {
    /// Request for a path relative to the server root.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Request for a management API path (prefixed with [`API_PREFIX`]).
    #[must_use]
    pub fn api(method: Method, path: &str) -> Self {
        Self::new(method, format!("{API_PREFIX}{path}"))
    }

    /// `GET` on a management API path.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::api(Method::GET, path)
    }

    /// `POST` on a management API path.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::api(Method::POST, path)
    }

    /// `DELETE` on a management API path.
    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::api(Method::DELETE, path)
    }

    /// Append one path segment, percent-encoded.
    #[must_use]
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body and set `Content-Type: application/json` explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialised.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, GatewayError> {
        let encoded =
            serde_json::to_string(body).map_err(|source| GatewayError::EncodeBody { source })?;
        self.body = Some(encoded);
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE));
        self.headers
            .push((HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE.to_string()));
        Ok(self)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path without the encoded segments.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encoded JSON body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn resolve(&self, base: &Url) -> Result<Url, GatewayError> {
        let mut url = base
            .join(&self.path)
            .map_err(|source| GatewayError::InvalidPath {
                path: self.path.clone(),
                source,
            })?;
        if !self.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| GatewayError::InvalidBaseUrl {
                    url: base.to_string(),
                })?
                .pop_if_empty()
                .extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Shared HTTP client plus the base URL every call is resolved against.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl Gateway {
    /// Build a gateway with a cookie-holding client, timeout and trace header.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace id is not a valid header value, the base
    /// URL cannot carry paths, or the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(&config.trace_id).map_err(|_| {
            GatewayError::InvalidHeader {
                name: HEADER_REQUEST_ID,
            }
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(default_headers)
            .build()
            .map_err(|source| GatewayError::ClientBuild { source })?;

        Self::with_client(client, config.base_url.clone(), config.access_token.clone())
    }

    /// Wrap an existing client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry paths (e.g. `mailto:`).
    pub fn with_client(
        client: Client,
        base_url: Url,
        access_token: Option<String>,
    ) -> Result<Self, GatewayError> {
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        Ok(Self {
            client,
            base_url,
            access_token: access_token.filter(|token| !token.trim().is_empty()),
        })
    }

    /// Server root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue the request once and record what came back.
    ///
    /// Returns an error only when the request could not be prepared; network
    /// failures are reported as [`RawResponse::no_response`].
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved against the base URL.
    pub async fn send(&self, request: &ApiRequest) -> Result<RawResponse, GatewayError> {
        let url = request.resolve(&self.base_url)?;
        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(token) = &self.access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    error = %err,
                    "api call produced no response"
                );
                return Ok(RawResponse::no_response());
            }
        };

        let status = i32::from(response.status().as_u16());
        let body = match response.text().await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read response body");
                None
            }
        };
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "api call completed"
        );
        Ok(RawResponse { status, body })
    }

    /// Send and classify, decoding the success body into `T`.
    pub async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiOutcome<T> {
        match self.send(request).await {
            Ok(raw) => classify(raw),
            Err(err) => ApiOutcome::TransportError(error_chain(&err)),
        }
    }

    /// Send and classify, ignoring the success body.
    pub async fn call_discard(&self, request: &ApiRequest) -> ApiOutcome<()> {
        match self.send(request).await {
            Ok(raw) => classify_discard(raw),
            Err(err) => ApiOutcome::TransportError(error_chain(&err)),
        }
    }

    /// Establish a session through the form login endpoint.
    ///
    /// The session cookie is kept by the client. A redirect back to the
    /// sign-in page with an `error` query marks rejected credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), GatewayError> {
        let url = self
            .base_url
            .join(LOGIN_PATH)
            .map_err(|source| GatewayError::InvalidPath {
                path: LOGIN_PATH.to_string(),
                source,
            })?;
        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|source| GatewayError::SignIn { source })?;

        let rejected_by_redirect = response
            .url()
            .query_pairs()
            .any(|(key, _)| key == "error");
        if rejected_by_redirect || !response.status().is_success() {
            return Err(GatewayError::SignInRejected {
                username: username.to_string(),
            });
        }
        tracing::debug!(username, "signed in");
        Ok(())
    }
}

fn error_chain(err: &GatewayError) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    message
}
