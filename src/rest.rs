use crate::auth::{AuthConfig, AuthProvider, ClientCredentialsAuth};
use crate::client::Config;
use crate::error::Result;
use crate::options::{merge_post_data, prepare_request, ApiOptions, Headers, Method, RequestOptions};
use crate::response::{deliver_response, deliver_token, ApiResponse};
use crate::transport::{log_exchange, ReqwestTransport, Transport};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// REST client that authorizes every request with a bearer token.
///
/// The client holds no per-call state; it can be cloned cheaply and shared
/// between threads.
#[derive(Clone)]
pub struct RestClient {
    auth: Arc<dyn AuthProvider>,
    transport: Arc<dyn Transport>,
    config: Config,
    default_headers: Headers,
    default_options: RequestOptions,
}

impl RestClient {
    /// Create a client that obtains tokens with the given client credentials
    ///
    /// # Arguments
    /// * `auth_config` - Client id, secret and optional token endpoint
    /// * `base_uri` - API host; defaults to [`crate::client::DEFAULT_BASE_URI`]
    pub fn new(auth_config: AuthConfig, base_uri: Option<&str>) -> Result<Self> {
        let auth = ClientCredentialsAuth::new(auth_config).map_err(|e| {
            log::error!("failed to create auth provider: {}", e);
            e
        })?;
        Self::with_provider(Arc::new(auth), base_uri)
    }

    /// Create a client around an existing auth provider
    pub fn with_provider(auth: Arc<dyn AuthProvider>, base_uri: Option<&str>) -> Result<Self> {
        let config = base_uri.map(Config::new).unwrap_or_default();
        let transport = ReqwestTransport::new()?;
        Self::with_parts(auth, Arc::new(transport), config)
    }

    /// Create a client from explicit collaborators
    ///
    /// Fails if the configured base URI cannot serve as a base for request paths.
    pub fn with_parts(
        auth: Arc<dyn AuthProvider>,
        transport: Arc<dyn Transport>,
        config: Config,
    ) -> Result<Self> {
        config.base_url()?;
        Ok(RestClient {
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

    /// Headers merged under every request
    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Options merged under every request
    pub fn default_request_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Make an authorized API request
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `uri` - Path or URI, resolved against the base URI
    /// * `options` - Request options merged over the defaults, and options
    ///   for the auth provider
    ///
    /// # Returns
    /// The response metadata together with the parsed body
    pub fn api_request(&self, method: Method, uri: &str, options: ApiOptions) -> Result<ApiResponse> {
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

        let access_token = deliver_token(self.auth.get_access_token(&auth_options))?;
        request.authorize(&access_token)?;

        let start = Instant::now();
        let outcome = self.transport.send(&request);
        log_exchange(&request, &outcome, start.elapsed());

        deliver_response(outcome)
    }

    /// GET `uri`
    pub fn get(&self, uri: &str, options: ApiOptions) -> Result<ApiResponse> {
        self.api_request(Method::Get, uri, options)
    }

    /// POST `data` to `uri`, merged over any JSON body already in `options`
    pub fn post<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Post, uri, options)
    }

    /// PUT `data` to `uri`, merged over any JSON body already in `options`
    pub fn put<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Put, uri, options)
    }

    /// DELETE `uri`, sending `data` as the body when it is not empty
    pub fn delete<P: Serialize>(&self, uri: &str, data: P, options: ApiOptions) -> Result<ApiResponse> {
        let options = merge_post_data(serde_json::to_value(data)?, options);
        self.api_request(Method::Delete, uri, options)
    }
}
