//! End-to-end sync passes over the SQLite store and a mocked backend
//!
//! Each test opens a fresh in-memory database and, where the backend is
//! involved, its own wiremock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mindlog_cache::{DatabasePool, SqliteKeyValueStore};
use mindlog_core::domain::{DiaryRecord, Username};
use mindlog_core::ports::IRemoteGateway;
use mindlog_core::usecases::LocalStore;
use mindlog_remote::{OfflineGateway, RestClient, RestGateway};
use mindlog_sync::{SyncOutcome, Synchronizer};

// ============================================================================
// Test helpers
// ============================================================================

async fn sqlite_store(entries: &[DiaryRecord]) -> LocalStore {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let store = LocalStore::new(Arc::new(SqliteKeyValueStore::new(pool.pool().clone())));
    store
        .set_current_username(&Username::new("hanako").unwrap())
        .await
        .unwrap();
    store.save_diaries(entries).await.unwrap();
    store
}

fn rest_gateway(server: &MockServer) -> Arc<dyn IRemoteGateway + Send + Sync> {
    let client = RestClient::new(&server.uri(), "test-anon-key").expect("valid mock url");
    Arc::new(RestGateway::new(client))
}

async fn mount_known_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.hanako"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-1", "username": "hanako", "created_at": "2026-10-01T00:00:00+00:00" }
        ])))
        .mount(server)
        .await;
}

fn entries() -> Vec<DiaryRecord> {
    vec![
        DiaryRecord::new("anxiety", "exam", "", 40, 60).with_date("2026-10-17"),
        DiaryRecord::new("joy", "walk", "sun helps", 80, 10).with_date("2026-10-18"),
    ]
}

// ============================================================================
// Passes
// ============================================================================

#[tokio::test]
async fn test_first_pass_creates_user_and_pushes_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_json(json!({ "username": "hanako" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "u-9", "username": "hanako", "created_at": "2026-10-19T00:00:00+00:00" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/diary_entries"))
        .and(query_param("on_conflict", "id"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = sqlite_store(&entries()).await;
    let sync = Synchronizer::new(store.clone(), rest_gateway(&server));

    match sync.run_pass().await.unwrap() {
        SyncOutcome::Completed(report) => {
            assert_eq!((report.synced, report.total), (2, 2));
            assert!(!report.fell_back);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(store.last_sync().await.unwrap().is_some());

    let requests = server.received_requests().await.unwrap();
    let batch = requests
        .iter()
        .find(|r| r.url.path() == "/rest/v1/diary_entries")
        .expect("batch request");
    let rows: serde_json::Value = serde_json::from_slice(&batch.body).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["user_id"] == "u-9"));
    assert!(rows.iter().all(|row| row.get("counselor_memo").is_none()));
}

#[tokio::test]
async fn test_rejected_batch_falls_back_to_single_rows() {
    let server = MockServer::start().await;
    mount_known_user(&server).await;

    // First POST (the batch) fails, every later one succeeds
    Mock::given(method("POST"))
        .and(path("/rest/v1/diary_entries"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "PGRST102",
            "message": "All object keys must match"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/diary_entries"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let store = sqlite_store(&entries()).await;
    let sync = Synchronizer::new(store.clone(), rest_gateway(&server));

    let outcome = sync.run_pass().await.unwrap();
    assert_eq!(outcome.message(), "2/2 entries synced");
    assert!(store.last_sync().await.unwrap().is_some());
}

#[tokio::test]
async fn test_consents_pushed_after_diaries() {
    let server = MockServer::start().await;
    mount_known_user(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/diary_entries"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consent_histories"))
        .and(query_param("on_conflict", "username,consent_date"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = sqlite_store(&[]).await;
    store
        .append_consent(mindlog_core::domain::ConsentRecord::new(
            Username::new("hanako").unwrap(),
            true,
            "mindlog-cli",
        ))
        .await
        .unwrap();
    let sync = Synchronizer::new(store, rest_gateway(&server));

    match sync.run_pass().await.unwrap() {
        SyncOutcome::Completed(report) => {
            assert_eq!(report.total, 0);
            assert_eq!(report.consents_pushed, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_offline_gateway_leaves_store_untouched() {
    let store = sqlite_store(&entries()).await;
    let sync = Synchronizer::new(store.clone(), Arc::new(OfflineGateway));

    assert_eq!(sync.run_pass().await.unwrap(), SyncOutcome::Skipped);
    assert!(store.last_sync().await.unwrap().is_none());
    assert_eq!(store.load_diaries().await.unwrap().len(), 2);
}
