//! # fuel-rest - bearer-token REST client
//!
//! A small client for JSON REST APIs that sit behind an OAuth-style token
//! endpoint. Every request is shaped from the client defaults, authorized
//! with a freshly obtained bearer token and checked for a JSON response.
//!
//! ## Features
//!
//! - Per-call options merged over client defaults (headers, body, query)
//! - Relative paths resolved against a configured base URI
//! - Pluggable auth providers and transports
//! - One error type for auth, transport and content-type failures, each
//!   tagged with the collaborator it came from
//! - Blocking client by default, async client behind the `async` feature
//!
//! ## Basic Usage
//!
//! ```no_run
//! use fuel_rest::{ApiOptions, AuthConfig, RestClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new(
//!         AuthConfig::new("client_id", "client_secret"),
//!         Some("https://www.exacttargetapis.com"),
//!     )?;
//!
//!     let response = client.get("/platform/v1/endpoints", ApiOptions::new())?;
//!     println!("{}: {}", response.res.status, response.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Sending data
//!
//! ```no_run
//! use fuel_rest::{json, ApiOptions, AuthConfig, RequestOptions, RestClient};
//!
//! let client = RestClient::new(AuthConfig::new("client_id", "client_secret"), None)?;
//!
//! let options = ApiOptions::new()
//!     .with_request_options(RequestOptions::new().with_header("X-Request-Source", "docs"));
//!
//! client.post("/contacts/v1/contacts", json!({"contactKey": "abc"}), options)?;
//! # Ok::<(), fuel_rest::RestError>(())
//! ```
//!
//! ## Error origins
//!
//! ```no_run
//! use fuel_rest::{ApiOptions, AuthConfig, ErrorOrigin, RestClient};
//!
//! let client = RestClient::new(AuthConfig::new("client_id", "client_secret"), None)?;
//!
//! match client.get("/messages", ApiOptions::new()) {
//!     Ok(response) => println!("{}", response.body),
//!     Err(e) if e.propagated_from() == Some(ErrorOrigin::AuthProvider) => {
//!         eprintln!("could not authenticate: {}", e)
//!     }
//!     Err(e) => eprintln!("request failed: {}", e),
//! }
//! # Ok::<(), fuel_rest::RestError>(())
//! ```

pub mod auth;
pub mod client;
pub mod error;
#[cfg(feature = "async")]
pub mod nonblocking;
pub mod options;
pub mod response;
pub mod rest;
pub mod transport;

// Re-export main types for convenience
pub use auth::{AuthConfig, AuthError, AuthProvider, ClientCredentialsAuth, TokenResult};
pub use client::Config;
pub use error::{BoxError, ErrorOrigin, RestError, Result};
pub use options::{ApiOptions, AuthOptions, Headers, JsonMap, Method, RequestOptions};
pub use response::{ApiResponse, HttpResponse};
pub use rest::RestClient;
pub use transport::{PreparedRequest, ReqwestTransport, Transport, TransportResponse};

#[cfg(feature = "async")]
pub use nonblocking::{AsyncAuthProvider, AsyncRestClient, AsyncTransport};

// Re-export serde_json for convenience
pub use serde_json::json;
