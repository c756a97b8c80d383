// ABOUTME: Minimal typed HTTP client for the WorkSphere REST backends
// ABOUTME: JSON headers, per-request timeouts, optional bearer injection and typed error mapping

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Source of the bearer token attached to outgoing requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current access token, or `None` when no session is established.
    async fn bearer_token(&self) -> Option<String>;
}

/// A single call against an [`ApiClient`]. Built per call, never persisted.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Serialize `body` as the JSON payload of this request.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Header override; replaces any default with the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// REST client bound to one backend base URL.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    default_timeout: Duration,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .field("bearer", &self.token_provider.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Share a connection pool between several service clients.
    pub fn with_http_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            token_provider: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Attach `Authorization: Bearer <token>` whenever the provider yields a
    /// token. An explicit `Authorization` override on a request still wins.
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// `{base_url}/{endpoint}` with exactly one separating slash
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send(ApiRequest::new(Method::GET, endpoint)).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::POST, endpoint).json(body)?)
            .await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PUT, endpoint).json(body)?)
            .await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PATCH, endpoint).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send(ApiRequest::new(Method::DELETE, endpoint)).await
    }

    /// Execute a fully specified request.
    ///
    /// The timeout covers connecting, sending and reading the whole body. On
    /// expiry the in-flight request is dropped and [`ApiError::Timeout`] is
    /// returned.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let method = request.method.clone();
        let url = self.url_for(&request.endpoint);

        match tokio::time::timeout(timeout, self.dispatch(request, &url)).await {
            Ok(Ok((status, body))) => decode_response(status, &body),
            Ok(Err(e)) => {
                warn!("{} {} failed: {}", method, url, e);
                Err(e)
            }
            Err(_) => {
                warn!("{} {} timed out after {:?}", method, url, timeout);
                Err(ApiError::Timeout)
            }
        }
    }

    async fn dispatch(&self, request: ApiRequest, url: &str) -> ApiResult<(StatusCode, Vec<u8>)> {
        let headers = self.build_headers(request.headers).await;

        debug!("{} {}", request.method, url);

        let mut builder = self
            .http_client
            .request(request.method, url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("{} responded with {} ({} bytes)", url, status, body.len());
        Ok((status, body.to_vec()))
    }

    /// Defaults, then bearer token, then caller overrides; later entries win.
    async fn build_headers(&self, overrides: HeaderMap) -> HeaderMap {
        let mut headers = default_headers();

        if let Some(provider) = &self.token_provider {
            if let Some(token) = provider.bearer_token().await {
                match HeaderValue::from_str(&format!("Bearer {}", token)) {
                    Ok(value) => {
                        headers.insert(AUTHORIZATION, value);
                    }
                    Err(_) => warn!("Stored access token is not a valid header value, skipping"),
                }
            }
        }

        for (name, value) in overrides.iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

/// `Content-Type` and `Accept` both set to `application/json`
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Map a completed exchange onto the typed result.
///
/// Failure statuses carry the server's `message` field when the body has one.
/// An empty success body decodes as JSON `null`, so `()` and `Option<T>`
/// targets accept it; a non-empty body that does not parse is an error.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ApiResult<T> {
    if !status.is_success() {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            });
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    let payload: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };

    serde_json::from_slice(payload).map_err(|e| ApiError::Parse {
        status: status.as_u16(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let client = ApiClient::new("https://employees.example.com/");
        assert_eq!(client.base_url(), "https://employees.example.com");
        assert_eq!(
            client.url_for("employee"),
            "https://employees.example.com/employee"
        );
        assert_eq!(
            client.url_for("/asset/employee?employeeId=42"),
            "https://employees.example.com/asset/employee?employeeId=42"
        );
    }

    #[test]
    fn test_default_timeout() {
        let client = ApiClient::new("http://localhost");
        assert_eq!(client.default_timeout(), Duration::from_secs(30));

        let client = client.with_timeout(Duration::from_millis(50));
        assert_eq!(client.default_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_decode_success_body() {
        let named: Named = decode_response(StatusCode::OK, br#"{"name":"acme"}"#).unwrap();
        assert_eq!(named.name, "acme");
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        decode_response::<()>(StatusCode::NO_CONTENT, b"").unwrap();

        let missing: Option<Named> = decode_response(StatusCode::OK, b"  ").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_decode_empty_body_into_struct_is_parse_error() {
        let err = decode_response::<Named>(StatusCode::OK, b"").unwrap_err();
        assert!(matches!(err, ApiError::Parse { status: 200, .. }));
    }

    #[test]
    fn test_decode_garbage_body_is_parse_error() {
        let err = decode_response::<Named>(StatusCode::OK, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse { status: 200, .. }));
    }

    #[test]
    fn test_decode_failure_uses_server_message() {
        let err =
            decode_response::<Named>(StatusCode::UNPROCESSABLE_ENTITY, br#"{"message":"bad domain"}"#)
                .unwrap_err();
        assert_eq!(err, ApiError::server(422, "bad domain"));
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, b"upstream down".as_slice())]
    #[case(StatusCode::NOT_FOUND, br#"{"message":""}"#.as_slice())]
    #[case(StatusCode::UNAUTHORIZED, br#"{"error":"expired"}"#.as_slice())]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, b"".as_slice())]
    fn test_decode_failure_synthesizes_message(#[case] status: StatusCode, #[case] body: &[u8]) {
        let err = decode_response::<Named>(status, body).unwrap_err();
        assert_eq!(err, ApiError::rejected(status.as_u16()));
        assert_eq!(
            err.to_string(),
            format!("Request failed with status {}", status.as_u16())
        );
        assert_eq!(err.status_code(), status.as_u16());
    }

    #[test]
    fn test_request_builder_overrides() {
        let request = ApiRequest::new(Method::POST, "employee")
            .json(&serde_json::json!({ "name": "Ada" }))
            .unwrap()
            .header(ACCEPT, HeaderValue::from_static("text/plain"))
            .timeout(Duration::from_millis(50));

        assert_eq!(request.body.as_deref(), Some(br#"{"name":"Ada"}"#.as_slice()));
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "text/plain");
        assert_eq!(request.timeout, Some(Duration::from_millis(50)));
    }
}
