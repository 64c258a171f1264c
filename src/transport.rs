use crate::client::create_rest_client;
use crate::error::{BoxError, RestError, Result};
use crate::options::Method;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A fully merged request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub json: Option<Value>,
}

impl PreparedRequest {
    /// Add `Authorization: Bearer <token>` unless the caller already set one.
    pub fn authorize(&mut self, access_token: &str) -> Result<()> {
        if self.headers.contains_key(AUTHORIZATION) {
            return Ok(());
        }

        let value = HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(|_| {
            RestError::RequestBuild("access token is not a valid header value".to_string())
        })?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Serialized request body, if any
    pub fn body_bytes(&self) -> std::result::Result<Option<Vec<u8>>, serde_json::Error> {
        self.json.as_ref().map(serde_json::to_vec).transpose()
    }
}

/// Raw outcome of a successful HTTP exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Performs the actual HTTP exchange for a prepared request
pub trait Transport: Send + Sync {
    fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, BoxError>;
}

/// Transport backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport using the default REST client settings
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(create_rest_client()?))
    }

    /// Transport on an existing client
    pub fn with_client(client: Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = request.body_bytes()? {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text()?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Debug-level trace of one exchange
pub(crate) fn log_exchange(
    request: &PreparedRequest,
    outcome: &std::result::Result<TransportResponse, BoxError>,
    elapsed: Duration,
) {
    match outcome {
        Ok(response) => log::debug!(
            "[rest] {} {} => {:?} (status: {})",
            request.method,
            request.url,
            elapsed,
            response.status
        ),
        Err(e) => log::debug!(
            "[rest] {} {} => {:?} (failed: {})",
            request.method,
            request.url,
            elapsed,
            e
        ),
    }
}
