//! Consent history, chat and unfiltered relation reads

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use mindlog_core::domain::{ChatMessage, ConsentRecord, UserId, Username};
use mindlog_core::ports::{IRemoteGateway, Relation, RemoteErrorKind};

use crate::common;

fn hanako() -> Username {
    Username::new("hanako").unwrap()
}

#[tokio::test]
async fn test_sync_consents_ignores_duplicates() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("consent_histories")))
        .and(query_param("on_conflict", "username,consent_date"))
        .and(header(
            "prefer",
            "resolution=ignore-duplicates,return=minimal",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![
        ConsentRecord::new(hanako(), true, "mindlog-cli"),
        ConsentRecord::new(hanako(), false, "mindlog-cli"),
    ];
    assert_eq!(gateway.sync_consent_histories(&records).await.unwrap(), 2);
}

#[tokio::test]
async fn test_save_consent_inserts_one_row() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("consent_histories")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
        .expect(1)
        .mount(&server)
        .await;

    let record = ConsentRecord::new(hanako(), true, "mindlog-cli").with_ip_address("127.0.0.1");
    gateway.save_consent_history(&record).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["username"], "hanako");
    assert_eq!(body["ip_address"], "127.0.0.1");
}

#[tokio::test]
async fn test_list_consents_newest_first() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("GET"))
        .and(path(common::rest_path("consent_histories")))
        .and(query_param("username", "eq.hanako"))
        .and(query_param("order", "consent_date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "username": "hanako",
            "is_consented": true,
            "consent_date": "2026-10-02T00:00:00Z",
            "ip_address": null,
            "user_agent": "browser",
            "created_at": "2026-10-02T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let consents = gateway.list_consent_histories(&hanako()).await.unwrap();
    assert_eq!(consents.len(), 1);
    assert!(consents[0].is_consented);
}

#[tokio::test]
async fn test_list_messages_oldest_first() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("GET"))
        .and(path(common::rest_path("messages")))
        .and(query_param("chat_room_id", "eq.room-1"))
        .and(query_param("order", "created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "m-1",
                "chat_room_id": "room-1",
                "sender_id": "u-1",
                "counselor_id": null,
                "content": "hello",
                "is_counselor": false,
                "created_at": "2026-10-01T00:00:00Z"
            },
            {
                "id": "m-2",
                "chat_room_id": "room-1",
                "sender_id": null,
                "counselor_id": "c-1",
                "content": "hi there",
                "is_counselor": true,
                "created_at": "2026-10-01T00:01:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let messages = gateway.list_messages("room-1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.validate().is_ok()));
}

#[tokio::test]
async fn test_invalid_message_is_not_sent() {
    let (server, gateway) = common::setup_rest_mock().await;

    let mut message = ChatMessage::from_user("room-1", "u-1", "hello");
    message.counselor_id = Some("c-1".to_string());

    let err = gateway.send_message(&message).await.unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Rejected);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_message_returns_stored_row() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("messages")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "m-9",
            "chat_room_id": "room-1",
            "sender_id": "u-1",
            "counselor_id": null,
            "content": "hello",
            "is_counselor": false,
            "created_at": "2026-10-19T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let stored = gateway
        .send_message(&ChatMessage::from_user("room-1", "u-1", "hello"))
        .await
        .unwrap();
    assert_eq!(stored.id.as_deref(), Some("m-9"));
}

#[tokio::test]
async fn test_active_counselors_and_rooms() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("GET"))
        .and(path(common::rest_path("counselors")))
        .and(query_param("is_active", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c-1", "name": "Sato", "email": "sato@example.com", "is_active": true }
        ])))
        .mount(&server)
        .await;
    common::mount_select(
        &server,
        "chat_rooms",
        json!([{ "id": "room-1", "user_id": "u-1", "counselor_id": "c-1", "status": "active" }]),
    )
    .await;

    assert_eq!(gateway.list_counselors().await.unwrap().len(), 1);
    let rooms = gateway
        .list_chat_rooms(&UserId::new("u-1").unwrap())
        .await
        .unwrap();
    assert_eq!(rooms[0].id, "room-1");
}

#[tokio::test]
async fn test_fetch_relation_is_unfiltered() {
    let (server, gateway) = common::setup_rest_mock().await;
    common::mount_select(&server, "users", json!([{ "id": "a" }, { "id": "b" }])).await;

    let rows = gateway.fetch_relation(Relation::Users).await.unwrap();
    assert_eq!(rows.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("select=*"));
}
