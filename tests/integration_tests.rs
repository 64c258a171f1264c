use fuel_rest::{json, ApiOptions, AuthConfig, AuthOptions, ErrorOrigin, RequestOptions, RestClient, RestError};
use mockito::{Matcher, Mock, ServerGuard};

fn client_for(server: &ServerGuard) -> RestClient {
    let auth = AuthConfig::new("id", "secret")
        .with_auth_url(format!("{}/v1/requestToken", server.url()));
    RestClient::new(auth, Some(server.url().as_str())).expect("failed to create client")
}

fn mock_token(server: &mut ServerGuard, body: &str) -> Mock {
    server
        .mock("POST", "/v1/requestToken")
        .match_body(Matcher::PartialJson(json!({"clientId": "id", "clientSecret": "secret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

#[test]
fn test_get_with_bearer_token() {
    let mut server = mockito::Server::new();
    let token = mock_token(&mut server, r#"{"accessToken":"abc","expiresIn":3600}"#);
    let api = server
        .mock("GET", "/messages")
        .match_header("authorization", "Bearer abc")
        .match_header("content-type", "application/json")
        .match_header("user-agent", Matcher::Regex("^fuel-rest-rs/".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"a":1}"#)
        .create();

    let response = client_for(&server)
        .get("/messages", ApiOptions::new())
        .expect("request failed");

    assert_eq!(response.body, json!({"a": 1}));
    assert_eq!(response.res.status, 200);
    token.assert();
    api.assert();
}

#[test]
fn test_missing_access_token() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"message":"no token for you"}"#);
    let api = server.mock("GET", "/messages").expect(0).create();

    let error = client_for(&server)
        .get("/messages", ApiOptions::new())
        .unwrap_err();

    assert_eq!(error.to_string(), "No access token");
    assert_eq!(error.propagated_from(), Some(ErrorOrigin::AuthProvider));
    match error {
        RestError::NoAccessToken { res } => {
            assert_eq!(res.extra.get("message"), Some(&json!("no token for you")))
        }
        other => panic!("expected RestError::NoAccessToken, got {:?}", other),
    }
    api.assert();
}

#[test]
fn test_token_endpoint_rejects_credentials() {
    let mut server = mockito::Server::new();
    let _token = server
        .mock("POST", "/v1/requestToken")
        .with_status(401)
        .with_body("Unauthorized")
        .create();

    let error = client_for(&server)
        .get("/messages", ApiOptions::new())
        .unwrap_err();

    assert!(matches!(error, RestError::AuthProvider(_)));
    assert_eq!(error.propagated_from(), Some(ErrorOrigin::AuthProvider));
    assert!(error.to_string().contains("401"));
}

#[test]
fn test_auth_options_forwarded() {
    let mut server = mockito::Server::new();
    let token = server
        .mock("POST", "/v1/requestToken")
        .match_body(Matcher::Json(json!({
            "clientId": "id",
            "clientSecret": "secret",
            "accessType": "offline"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"abc"}"#)
        .create();
    let _api = server
        .mock("GET", "/messages")
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create();

    let mut auth_options = AuthOptions::new();
    auth_options.insert("accessType".to_string(), json!("offline"));

    client_for(&server)
        .get("/messages", ApiOptions::new().with_auth_options(auth_options))
        .expect("request failed");

    token.assert();
}

#[test]
fn test_non_json_response() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let _api = server
        .mock("GET", "/page")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html></html>")
        .create();

    let error = client_for(&server).get("/page", ApiOptions::new()).unwrap_err();

    assert_eq!(error.to_string(), "API did not return JSON");
    assert_eq!(error.propagated_from(), Some(ErrorOrigin::RestClient));
    assert_eq!(error.status_code(), Some(200));
}

#[test]
fn test_unparseable_json_passes_through() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let _api = server
        .mock("GET", "/broken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not-json")
        .create();

    let response = client_for(&server)
        .get("/broken", ApiOptions::new())
        .expect("request failed");

    assert_eq!(response.body, json!("not-json"));
}

#[test]
fn test_error_status_with_json_is_delivered() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let _api = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Not Found"}"#)
        .create();

    let response = client_for(&server)
        .get("/missing", ApiOptions::new())
        .expect("request failed");

    assert_eq!(response.res.status, 404);
    assert!(!response.res.is_success());
    assert_eq!(response.get_string("message").as_deref(), Some("Not Found"));
}

#[test]
fn test_post_merges_body() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let api = server
        .mock("POST", "/x")
        .match_body(Matcher::Json(json!({"foo": 1, "bar": "kept"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"new"}"#)
        .create();

    let options = ApiOptions::new().with_request_options(
        RequestOptions::new().with_json(json!({"foo": 0, "bar": "kept"})),
    );

    let response = client_for(&server)
        .post("/x", json!({"foo": 1}), options)
        .expect("request failed");

    assert_eq!(response.res.status, 201);
    assert_eq!(response.get_string("id").as_deref(), Some("new"));
    api.assert();
}

#[test]
fn test_caller_authorization_header_wins() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let api = server
        .mock("DELETE", "/items/1")
        .match_header("authorization", "Bearer caller-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create();

    let options = ApiOptions::new().with_request_options(
        RequestOptions::new().with_header("Authorization", "Bearer caller-token"),
    );

    client_for(&server)
        .delete("/items/1", json!(null), options)
        .expect("request failed");

    api.assert();
}

#[test]
fn test_put_with_query() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);
    let api = server
        .mock("PUT", "/items/1")
        .match_query(Matcher::UrlEncoded("upsert".to_string(), "true".to_string()))
        .match_body(Matcher::Json(json!({"name": "renamed"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create();

    let options = ApiOptions::new()
        .with_request_options(RequestOptions::new().with_query("upsert", "true"));

    client_for(&server)
        .put("/items/1", json!({"name": "renamed"}), options)
        .expect("request failed");

    api.assert();
}

#[test]
fn test_transport_failure() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, r#"{"accessToken":"abc"}"#);

    let auth = AuthConfig::new("id", "secret")
        .with_auth_url(format!("{}/v1/requestToken", server.url()));
    // nothing listens on port 1
    let client = RestClient::new(auth, Some("http://127.0.0.1:1")).expect("failed to create client");

    let error = client.get("/messages", ApiOptions::new()).unwrap_err();

    assert!(matches!(error, RestError::Transport(_)));
    assert_eq!(
        error.propagated_from().map(|o| o.to_string()).as_deref(),
        Some("transport layer error")
    );
}

#[test]
fn test_invalid_configuration() {
    let result = RestClient::new(AuthConfig::new("", "secret"), None);
    assert!(matches!(result, Err(RestError::AuthSetup(_))));
}

#[test]
fn test_relative_base_uri_rejected_at_construction() {
    let result = RestClient::new(AuthConfig::new("id", "secret"), Some("host.example"));
    match result {
        Err(RestError::UrlParse(_)) => {}
        Err(e) => panic!("unexpected error: {:?}", e),
        Ok(_) => panic!("client built with a relative base URI"),
    }
}
