use crate::client::create_rest_client;
use crate::error::BoxError;
use crate::options::{AuthOptions, JsonMap};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Token endpoint used when the configuration does not name one
pub const DEFAULT_AUTH_URL: &str = "https://auth.exacttargetapis.com/v1/requestToken";

/// Errors raised by the built-in client credentials provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("clientId is required")]
    MissingClientId,

    #[error("clientSecret is required")]
    MissingClientSecret,

    #[error("invalid auth URL: {0}")]
    InvalidAuthUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client credentials used to obtain access tokens
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

impl AuthConfig {
    /// Credentials for the default token endpoint
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        AuthConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: None,
        }
    }

    /// Override the token endpoint
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Check the credentials are present and return the token endpoint
    pub fn validate(&self) -> Result<Url, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::MissingClientId);
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::MissingClientSecret);
        }
        Ok(Url::parse(
            self.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL),
        )?)
    }

    /// Body of a token request: auth options first, credentials on top
    pub(crate) fn token_request_body(&self, options: &AuthOptions) -> Value {
        let mut body = options.clone();
        body.insert("clientId".to_string(), Value::String(self.client_id.clone()));
        body.insert(
            "clientSecret".to_string(),
            Value::String(self.client_secret.clone()),
        );
        Value::Object(body)
    }
}

/// What an auth provider hands back. Unknown fields are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    #[serde(flatten)]
    pub extra: JsonMap,
}

impl TokenResult {
    /// Token result carrying `access_token`
    pub fn new(access_token: impl Into<String>) -> Self {
        TokenResult {
            access_token: Some(access_token.into()),
            ..TokenResult::default()
        }
    }

    /// Set the token lifetime in seconds
    pub fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// The access token, if one was issued and it is not empty
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Source of bearer tokens for outgoing requests
pub trait AuthProvider: Send + Sync {
    fn get_access_token(&self, options: &AuthOptions) -> Result<TokenResult, BoxError>;
}

/// Exchanges a client id and secret for an access token on every call.
pub struct ClientCredentialsAuth {
    config: AuthConfig,
    auth_url: Url,
    client: Client,
}

impl ClientCredentialsAuth {
    /// Create a provider, failing if the credentials are incomplete
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let auth_url = config.validate()?;
        let client = create_rest_client()?;
        Ok(ClientCredentialsAuth {
            config,
            auth_url,
            client,
        })
    }

    /// Credentials this provider sends
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Token endpoint requests are POSTed to
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }
}

impl AuthProvider for ClientCredentialsAuth {
    fn get_access_token(&self, options: &AuthOptions) -> Result<TokenResult, BoxError> {
        let response = self
            .client
            .post(self.auth_url.clone())
            .json(&self.config.token_request_body(options))
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(parse_token_response(status, &body)?)
    }
}

/// Turn a token endpoint reply into a token result
pub(crate) fn parse_token_response(status: u16, body: &str) -> Result<TokenResult, AuthError> {
    if !(200..300).contains(&status) {
        return Err(AuthError::Status {
            status,
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}
