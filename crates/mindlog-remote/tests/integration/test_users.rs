//! User lookup and creation against the `users` relation

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use mindlog_core::domain::Username;
use mindlog_core::ports::{IRemoteGateway, RemoteErrorKind};
use mindlog_core::usecases::IdentityResolver;
use mindlog_remote::{RestClient, RestGateway};

use crate::common;

#[tokio::test]
async fn test_find_user_returns_row() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("GET"))
        .and(path(common::rest_path("users")))
        .and(query_param("username", "eq.hanako"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "7f6c2a10-0000-4000-8000-000000000001",
            "username": "hanako",
            "created_at": "2026-09-01T10:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let user = gateway
        .find_user_by_username(&Username::new("hanako").unwrap())
        .await
        .expect("lookup failed");
    assert_eq!(user.id.as_str(), "7f6c2a10-0000-4000-8000-000000000001");
}

#[tokio::test]
async fn test_find_user_empty_result_is_not_found() {
    let (server, gateway) = common::setup_rest_mock().await;
    common::mount_select(&server, "users", json!([])).await;

    let err = gateway
        .find_user_by_username(&Username::new("nobody").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_relation_is_rejected_without_create() {
    let (server, gateway) = common::setup_rest_mock().await;
    Mock::given(method("GET"))
        .and(path(common::rest_path("users")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "PGRST205",
            "message": "Could not find the table 'public.users' in the schema cache"
        })))
        .mount(&server)
        .await;
    // A create must never follow a 404 lookup
    Mock::given(method("POST"))
        .and(path(common::rest_path("users")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let username = Username::new("hanako").unwrap();
    let err = gateway.find_user_by_username(&username).await.unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Rejected);

    let resolver = IdentityResolver::new(std::sync::Arc::new(gateway));
    assert!(resolver.resolve(&username).await.is_none());
}

#[tokio::test]
async fn test_find_user_server_error_is_rejected() {
    let (server, gateway) = common::setup_rest_mock().await;
    Mock::given(method("GET"))
        .and(path(common::rest_path("users")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway
        .find_user_by_username(&Username::new("hanako").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Rejected);
}

#[tokio::test]
async fn test_find_user_garbage_body_is_invalid_response() {
    let (server, gateway) = common::setup_rest_mock().await;
    Mock::given(method("GET"))
        .and(path(common::rest_path("users")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = gateway
        .find_user_by_username(&Username::new("hanako").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_create_user_posts_username() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("users")))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "username": "taro" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "u-new",
            "username": "taro",
            "created_at": "2026-10-19T08:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let user = gateway
        .create_user(&Username::new("taro").unwrap())
        .await
        .expect("create failed");
    assert_eq!(user.id.as_str(), "u-new");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on the discard port
    let client = RestClient::new("http://127.0.0.1:9", common::TEST_KEY).unwrap();
    let gateway = RestGateway::new(client);

    let err = gateway
        .find_user_by_username(&Username::new("hanako").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Network);
}
