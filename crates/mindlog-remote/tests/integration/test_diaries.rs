//! Diary reads and upserts against the `diary_entries` relation

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use mindlog_core::domain::{DiaryRecord, EntryId, UserId};
use mindlog_core::ports::{DiaryUpsert, IRemoteGateway, RemoteErrorKind};

use crate::common;

fn upsert_row(id: &str) -> DiaryUpsert {
    DiaryUpsert {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        date: "2026-10-18".to_string(),
        emotion: "anxiety".to_string(),
        event: "exam".to_string(),
        realization: "breathing helps".to_string(),
        self_esteem_score: 45,
        worthlessness_score: 55,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_list_diaries_orders_by_date_desc_and_normalizes() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("GET"))
        .and(path(common::rest_path("diary_entries")))
        .and(query_param("user_id", "eq.u-1"))
        .and(query_param("order", "date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "d-2",
                "user_id": "u-1",
                "date": "2026-10-18",
                "emotion": "joy",
                "self_esteem_score": 80,
                "worthlessness_score": 10,
                "counselor_memo": "good progress",
                "is_visible_to_user": true,
                "urgency_level": "low",
                "created_at": "2026-10-18T09:00:00+00:00"
            },
            {
                "id": "d-1",
                "user_id": "u-1",
                "date": "2026-10-17",
                "emotion": "sadness",
                "self_esteem_score": null,
                "created_at": "2026-10-17T09:00:00+00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = gateway
        .list_diaries(&UserId::new("u-1").unwrap())
        .await
        .expect("list failed");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_str(), "d-2");
    assert_eq!(records[0].counselor_memo.as_deref(), Some("good progress"));
    assert_eq!(records[1].self_esteem_score, 50);
}

#[tokio::test]
async fn test_bulk_upsert_merges_on_id() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("diary_entries")))
        .and(query_param("on_conflict", "id"))
        .and(header(
            "prefer",
            "resolution=merge-duplicates,return=minimal",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sent = gateway
        .upsert_diaries(&[upsert_row("a"), upsert_row("b")])
        .await
        .expect("upsert failed");
    assert_eq!(sent, 2);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["user_id"], "u-1");
    assert!(body[0].get("counselor_memo").is_none());
}

#[tokio::test]
async fn test_empty_batch_makes_no_request() {
    let (server, gateway) = common::setup_rest_mock().await;

    assert_eq!(gateway.upsert_diaries(&[]).await.unwrap(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_upsert_failure_is_reported() {
    let (server, gateway) = common::setup_rest_mock().await;
    common::mount_post_failure(&server, "diary_entries", 400).await;

    let err = gateway
        .upsert_diaries(&[upsert_row("a")])
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Rejected);
    assert!(err.message.contains("simulated failure"));
}

#[tokio::test]
async fn test_single_upsert_sends_object() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("POST"))
        .and(path(common::rest_path("diary_entries")))
        .and(query_param("on_conflict", "id"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let record = DiaryRecord::new("calm", "walk", "", 60, 20);
    let row = DiaryUpsert::from_record(&record, &UserId::new("u-1").unwrap());
    gateway.upsert_diary(&row).await.expect("upsert failed");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["id"], record.id.as_str());
}

#[tokio::test]
async fn test_delete_diary_filters_by_id() {
    let (server, gateway) = common::setup_rest_mock().await;

    Mock::given(method("DELETE"))
        .and(path(common::rest_path("diary_entries")))
        .and(query_param("id", "eq.d-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway
        .delete_diary(&EntryId::new("d-9").unwrap())
        .await
        .expect("delete failed");
}
