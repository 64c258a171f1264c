use crate::auth::{AuthError, TokenResult};
use crate::response::HttpResponse;
use std::fmt;
use thiserror::Error;

/// Boxed error returned by pluggable collaborators (auth providers, transports)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Collaborator a failure was propagated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorOrigin {
    /// The token could not be obtained
    AuthProvider,
    /// The HTTP exchange itself failed
    Transport,
    /// The response was received but rejected by this client
    RestClient,
}

impl ErrorOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorOrigin::AuthProvider => "AuthProvider",
            ErrorOrigin::Transport => "transport layer error",
            ErrorOrigin::RestClient => "REST client",
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for REST API operations
#[derive(Debug, Error)]
pub enum RestError {
    /// Auth provider reported a failure
    #[error("{0}")]
    AuthProvider(#[source] BoxError),

    /// Auth provider succeeded but handed back no usable access token
    #[error("No access token")]
    NoAccessToken {
        /// Raw token result as returned by the provider
        res: TokenResult,
    },

    /// HTTP transport error
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// Response content-type was not application/json
    #[error("API did not return JSON")]
    NotJson {
        content_type: Option<String>,
        response: HttpResponse,
    },

    /// The auth provider could not be built from its configuration
    #[error("failed to create auth provider: {0}")]
    AuthSetup(#[from] AuthError),

    /// HTTP client could not be created
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl RestError {
    /// Which collaborator the error was propagated from, if any.
    ///
    /// Errors raised while shaping the request locally carry no origin.
    pub fn propagated_from(&self) -> Option<ErrorOrigin> {
        match self {
            RestError::AuthProvider(_) | RestError::NoAccessToken { .. } => {
                Some(ErrorOrigin::AuthProvider)
            }
            RestError::Transport(_) => Some(ErrorOrigin::Transport),
            RestError::NotJson { .. } => Some(ErrorOrigin::RestClient),
            _ => None,
        }
    }

    /// Check if this error came from the auth provider
    pub fn is_auth_failure(&self) -> bool {
        self.propagated_from() == Some(ErrorOrigin::AuthProvider)
    }

    /// Get the HTTP status code of the rejected response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::NotJson { response, .. } => Some(response.status),
            _ => None,
        }
    }
}

/// Result type for REST operations
pub type Result<T> = std::result::Result<T, RestError>;
