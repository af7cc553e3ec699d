//! Shared helpers for PostgREST integration tests
//!
//! Each test starts its own mock server and a RestGateway pointing at it.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mindlog_remote::{RestClient, RestGateway};

/// Project key used by every test gateway
pub const TEST_KEY: &str = "test-anon-key";

/// Starts a mock server and returns it with a gateway that targets it
pub async fn setup_rest_mock() -> (MockServer, RestGateway) {
    let server = MockServer::start().await;
    let client = RestClient::new(&server.uri(), TEST_KEY).expect("valid mock url");
    (server, RestGateway::new(client))
}

/// Path of a relation below the REST prefix
pub fn rest_path(relation: &str) -> String {
    format!("/rest/v1/{relation}")
}

/// Mounts a GET on `relation` answering with `rows`, requiring the key headers
pub async fn mount_select(server: &MockServer, relation: &str, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(rest_path(relation)))
        .and(header("apikey", TEST_KEY))
        .and(header("authorization", format!("Bearer {TEST_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Mounts a failing POST on `relation`
#[allow(dead_code)]
pub async fn mount_post_failure(server: &MockServer, relation: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(rest_path(relation)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "code": "PGRST000",
            "message": "simulated failure"
        })))
        .mount(server)
        .await;
}
