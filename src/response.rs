use crate::auth::TokenResult;
use crate::error::{BoxError, RestError, Result};
use crate::transport::TransportResponse;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;

/// Metadata of the HTTP response an API call produced
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
}

impl HttpResponse {
    /// Get a header value as a string, if present and printable
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of the `Content-Type` header
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Successful result of an API call: the response metadata and its body.
///
/// `body` holds the parsed JSON document, or the raw text as a JSON string
/// when the server sent something that does not parse.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub res: HttpResponse,
    pub body: Value,
}

impl ApiResponse {
    /// Deserialize the body into the target type
    pub fn apply<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.body.clone()).map_err(|e| e.into())
    }

    /// Get a value from the body by a slash-separated path.
    /// For example, "items/0/name" reads the "name" field of the first item.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.body;

        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the body by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

/// Whether a content-type header names JSON. Parameters after `;` and case
/// are ignored; the media type itself must match exactly.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

// Both client flavours funnel their collaborator outcomes through the two
// functions below, so every failure carries the same variants and origins.

/// Resolve the auth provider's answer into an access token
pub(crate) fn deliver_token(
    outcome: std::result::Result<TokenResult, BoxError>,
) -> Result<String> {
    let token = outcome.map_err(RestError::AuthProvider)?;
    match token.access_token() {
        Some(access_token) => Ok(access_token.to_string()),
        None => Err(RestError::NoAccessToken { res: token }),
    }
}

/// Resolve the transport's answer into the caller's result
pub(crate) fn deliver_response(
    outcome: std::result::Result<TransportResponse, BoxError>,
) -> Result<ApiResponse> {
    let TransportResponse {
        status,
        headers,
        body,
    } = outcome.map_err(RestError::Transport)?;

    let res = HttpResponse { status, headers };

    if !is_json_content_type(res.content_type()) {
        return Err(RestError::NotJson {
            content_type: res.content_type().map(|ct| ct.to_string()),
            response: res,
        });
    }

    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));

    Ok(ApiResponse { res, body })
}
