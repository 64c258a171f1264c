use crate::error::Result;
use crate::options::{Headers, RequestOptions};
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// API host used when no base URI is configured
pub const DEFAULT_BASE_URI: &str = "https://www.exacttargetapis.com";

/// Create the default HTTP client for REST API requests
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client() -> reqwest::Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Same settings as [`create_rest_client`] for the async flavour
#[cfg(feature = "async")]
pub fn create_async_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300))
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Configuration for REST API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URI relative request paths are resolved against
    pub base_uri: String,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_uri: DEFAULT_BASE_URI.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Create a new configuration for the given base URI
    pub fn new(base_uri: impl Into<String>) -> Self {
        Config {
            base_uri: base_uri.into(),
            ..Config::default()
        }
    }

    /// Set the User-Agent header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse the base URI; it must be absolute and able to carry a path
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_uri)?;
        if url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(url)
    }

    /// Headers every request starts from
    pub fn default_headers(&self) -> Headers {
        [
            ("User-Agent", self.user_agent.as_str()),
            ("Content-Type", "application/json"),
        ]
        .into_iter()
        .collect()
    }

    /// Request options every request starts from
    pub fn default_request_options(&self) -> RequestOptions {
        RequestOptions::new().with_uri(self.base_uri.clone())
    }
}

fn default_user_agent() -> String {
    format!("fuel-rest-rs/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_uri, "https://www.exacttargetapis.com");
        assert!(config.user_agent.starts_with("fuel-rest-rs/"));
        assert!(config.user_agent.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_base_url() {
        let url = Config::new("http://localhost:8080").base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
        assert!(Config::default().base_url().is_ok());
    }

    #[test]
    fn test_base_url_rejects_unusable_base() {
        assert!(matches!(
            Config::new("host.example").base_url(),
            Err(RestError::UrlParse(url::ParseError::RelativeUrlWithoutBase))
        ));
        assert!(matches!(
            Config::new("mailto:ops@host.example").base_url(),
            Err(RestError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))
        ));
    }

    #[test]
    fn test_default_headers() {
        let headers = Config::new("http://localhost:8080").default_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert!(headers.get("user-agent").is_some());
    }

    #[test]
    fn test_default_request_options() {
        let options = Config::new("http://localhost:8080").default_request_options();
        assert_eq!(options.uri.as_deref(), Some("http://localhost:8080"));
        assert!(options.headers.is_empty());
        assert!(options.json.is_none());
    }
}
