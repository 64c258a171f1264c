use crate::error::{RestError, Result};
use crate::transport::PreparedRequest;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// JsonMap is a convenience type for free-form JSON objects.
pub type JsonMap = serde_json::Map<String, Value>;

/// Options handed untouched to the auth provider.
pub type AuthOptions = JsonMap;

/// HTTP verbs understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(RestError::RequestBuild(format!(
                "Unsupported HTTP method: {}",
                s
            ))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Ordered header mapping. Names compare ASCII case-insensitively, and the
/// first spelling seen for a name is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers(IndexMap<String, String>);

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl Headers {
    /// Empty header set
    pub fn new() -> Self {
        Headers(IndexMap::new())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.keys().position(|k| k.eq_ignore_ascii_case(name))
    }

    /// Get a header value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.0.get_index(i))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a header with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a header, replacing the value of any existing header with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => {
                if let Some((_, slot)) = self.0.get_index_mut(i) {
                    *slot = value;
                }
            }
            None => {
                self.0.insert(name, value);
            }
        }
    }

    /// Overlay `other` on top of `self`; values from `other` win per name.
    pub fn merge(&self, other: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }

    /// Headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct header names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no header is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate every entry and convert into a reqwest header map
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.len());
        for (name, value) in self.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RestError::RequestBuild(format!("invalid header name: {}", name)))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                RestError::RequestBuild(format!("invalid value for header {}", name))
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Request shaping options. Every field is optional so that caller options
/// can be overlaid on the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Base or absolute URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    #[serde(skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,

    /// Query string parameters appended to the resolved URI
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, String>,

    /// JSON request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl RequestOptions {
    /// Empty options; every field falls through to the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set a header, replacing any existing header with the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a query string parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the JSON body
    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Shallow merge: scalar fields from `overlay` replace ours when set,
    /// while `headers`, `query` and an object `json` merge one key at a time.
    pub fn merge(&self, overlay: &RequestOptions) -> RequestOptions {
        let mut query = self.query.clone();
        for (key, value) in &overlay.query {
            query.insert(key.clone(), value.clone());
        }

        RequestOptions {
            uri: overlay.uri.clone().or_else(|| self.uri.clone()),
            method: overlay.method.or(self.method),
            headers: self.headers.merge(&overlay.headers),
            query,
            json: merge_json(self.json.as_ref(), overlay.json.as_ref()),
        }
    }
}

/// Options accepted by every request method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiOptions {
    pub request_options: RequestOptions,
    pub auth_options: AuthOptions,
}

impl ApiOptions {
    /// Empty request and auth options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request shaping options
    pub fn with_request_options(mut self, request_options: RequestOptions) -> Self {
        self.request_options = request_options;
        self
    }

    /// Set the options forwarded to the auth provider
    pub fn with_auth_options(mut self, auth_options: AuthOptions) -> Self {
        self.auth_options = auth_options;
        self
    }
}

/// Overlay two JSON bodies. Objects merge key by key (top level only),
/// anything else is replaced by the overlay.
pub fn merge_json(base: Option<&Value>, overlay: Option<&Value>) -> Option<Value> {
    match (base, overlay) {
        (Some(Value::Object(base)), Some(Value::Object(overlay))) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Some(Value::Object(merged))
        }
        (_, Some(overlay)) => Some(overlay.clone()),
        (base, None) => base.cloned(),
    }
}

/// Whether a value counts as "no data" for body merging
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Fold `data` into `options.request_options.json`, `data` winning per key.
/// Falsy data leaves the options untouched.
pub fn merge_post_data(data: Value, mut options: ApiOptions) -> ApiOptions {
    if is_falsy(&data) {
        return options;
    }

    options.request_options.json = merge_json(options.request_options.json.as_ref(), Some(&data));
    options
}

/// Resolve `uri` against `base` the way a browser resolves links.
pub fn resolve_uri(base: Option<&str>, uri: &str) -> Result<Url> {
    match base {
        Some(base) => Ok(Url::parse(base)?.join(uri)?),
        None => Ok(Url::parse(uri)?),
    }
}

/// Merge caller options over the client defaults and produce the request
/// that will be handed to the transport (still without credentials).
pub fn prepare_request(
    defaults: &RequestOptions,
    default_headers: &Headers,
    method: Method,
    uri: &str,
    request_options: &RequestOptions,
) -> Result<PreparedRequest> {
    let merged = defaults.merge(request_options);

    let mut url = resolve_uri(merged.uri.as_deref(), uri)?;
    if !merged.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &merged.query {
            pairs.append_pair(key, value);
        }
    }

    let headers = default_headers.merge(&merged.headers);

    Ok(PreparedRequest {
        method,
        url,
        headers: headers.to_header_map()?,
        json: merged.json,
    })
}
