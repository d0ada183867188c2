use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::core::{config::Settings, state::AppState, time::primitive_now_utc};
use crate::db::models::{Assignment, Student};
use crate::store::memory::MemoryStore;
use crate::store::RecordStore;

pub(crate) struct TestContext {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("CLASSTRACK_ENV", "test");
    std::env::set_var("CLASSTRACK_STRICT_CONFIG", "0");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("DATABASE_URL");
}

/// Builds an app wired to an in-memory store. Tests never touch Postgres.
pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(settings, store.clone());
    let app = api::router::router(state);

    TestContext { store, app, _guard: guard }
}

pub(crate) async fn insert_student(store: &MemoryStore, id: &str, full_name: &str) -> Student {
    let student = Student { id: id.to_string(), full_name: full_name.to_string() };
    store.upsert_student(student.clone()).await.expect("insert student");
    student
}

pub(crate) async fn insert_assignment(
    store: &MemoryStore,
    id: &str,
    title: &str,
    max_marks: i32,
) -> Assignment {
    let assignment = Assignment {
        id: id.to_string(),
        subject_id: "subject-1".to_string(),
        title: title.to_string(),
        max_marks,
        due_date: None,
        created_at: primitive_now_utc(),
    };
    store.upsert_assignment(assignment.clone()).await.expect("insert assignment");
    assignment
}

/// Request with the identity headers the gateway would forward.
pub(crate) fn auth_request(
    method: Method,
    uri: &str,
    identity: Option<(&str, &str)>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some((user_id, role)) = identity {
        builder = builder.header("x-user-id", user_id).header("x-user-role", role);
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
