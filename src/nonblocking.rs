//! Future-based flavour of the client, enabled with the `async` feature.
//!
//! Every call awaits the auth provider first and only then the transport, so
//! the two steps of one request never overlap. Independent calls can be
//! driven concurrently from the same [`AsyncRestClient`].

use crate::auth::{parse_token_response, AuthConfig, AuthError, TokenResult};
use crate::client::{create_async_client, Config};
use crate::error::{BoxError, Result};
use crate::options::{merge_post_data, prepare_request, ApiOptions, AuthOptions, Headers, Method, RequestOptions};
use crate::response::{deliver_response, deliver_token, ApiResponse};
use crate::transport::{log_exchange, PreparedRequest, TransportResponse};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Async source of bearer tokens
#[async_trait]
pub trait AsyncAuthProvider: Send + Sync {
    async fn get_access_token(&self, options: &AuthOptions) -> std::result::Result<TokenResult, BoxError>;
}

/// Async HTTP exchange for a prepared request
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, BoxError>;
}

/// Async twin of [`crate::auth::ClientCredentialsAuth`]
pub struct AsyncClientCredentialsAuth {
    config: AuthConfig,
    auth_url: Url,
    client: reqwest::Client,
}

impl AsyncClientCredentialsAuth {
    /// Validate the credentials and build the HTTP client used for token requests
    pub fn new(config: AuthConfig) -> std::result::Result<Self, AuthError> {
        let auth_url = config.validate()?;
        let client = create_async_client()?;
        Ok(AsyncClientCredentialsAuth {
            config,
            auth_url,
            client,
        })
    }

    /// Credentials this provider sends
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[async_trait]
impl AsyncAuthProvider for AsyncClientCredentialsAuth {
    async fn get_access_token(&self, options: &AuthOptions) -> std::result::Result<TokenResult, BoxError> {
        let response = self
            .client
            .post(self.auth_url.clone())
            .json(&self.config.token_request_body(options))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(parse_token_response(status, &body)?)
    }
}

/// Transport backed by an async reqwest client
#[derive(Debug, Clone)]
pub struct AsyncReqwestTransport {
    client: reqwest::Client,
}

impl AsyncReqwestTransport {
    /// Transport on a freshly built pooled client
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(create_async_client()?))
    }

    /// Transport on an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        AsyncReqwestTransport { client }
    }
}

#[async_trait]
impl AsyncTransport for AsyncReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = request.body_bytes()? {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Async REST client, see [`crate::RestClient`] for the request semantics.
#[derive(Clone)]
pub struct AsyncRestClient {
    auth: Arc<dyn AsyncAuthProvider>,
    transport: Arc<dyn AsyncTransport>,
    config: Config,
    default_headers: Headers,
    default_options: RequestOptions,
}

impl AsyncRestClient {
    /// Create a client that obtains tokens with the given client credentials
    pub fn new(auth_config: AuthConfig, base_uri: Option<&str>) -> Result<Self> {
        let auth = AsyncClientCredentialsAuth::new(auth_config).map_err(|e| {
            log::error!("failed to create auth provider: {}", e);
            e
        })?;
        Self::with_provider(Arc::new(auth), base_uri)
    }

    /// Create a client around an existing auth provider
    pub fn with_provider(auth: Arc<dyn AsyncAuthProvider>, base_uri: Option<&str>) -> Result<Self> {
        let config = base_uri.map(Config::new).unwrap_or_default();
        let transport = AsyncReqwestTransport::new()?;
        Self::with_parts(auth, Arc::new(transport), config)
    }

    /// Create a client from explicit collaborators
    ///
    /// Fails if the configured base URI cannot serve as a base for request paths.
    pub fn with_parts(
        auth: Arc<dyn AsyncAuthProvider>,
        transport: Arc<dyn AsyncTransport>,
        config: Config,
    ) -> Result<Self> {
        config.base_url()?;
        Ok(AsyncRestClient {
            auth,
            transport,
            default_headers: config.default_headers(),
            default_options: config.default_request_options(),
            config,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make an authorized API request, see [`crate::RestClient::api_request`]
    pub async fn api_request(&self, method: Method, uri: &str, options: ApiOptions) -> Result<ApiResponse> {
        let ApiOptions {
            request_options,
            auth_options,
        } = options;

        let mut request = prepare_request(
            &self.default_options,
            &self.default_headers,
            method,
            uri,
            &request_options,
        )?;

        let access_token = deliver_token(self.auth.get_access_token(&auth_options).await)?;
        request.authorize(&access_token)?;

        let start = Instant::now();
        let outcome = self.transport.send(&request).await;
        log_exchange(&request, &outcome, start.elapsed());

        deliver_response(outcome)
    }

    /// GET `uri`
    pub async fn get(&self, uri: &str, options: ApiOptions) -> Result<ApiResponse> {
        self.api_request(Method::Get, uri, options).await
    }

    /// POST `data` to `uri`
    pub async fn post<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Post, uri, options).await
    }

    /// PUT `data` to `uri`
    pub async fn put<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Put, uri, options).await
    }

    /// DELETE `uri`
    pub async fn delete<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Delete, uri, options).await
    }
}
