#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use lesson_store::db::repositories::LocalRepository;
use lesson_store::db::repository::{
    ErrorContext, LessonRepository, OrderRepository, RepositoryError, RepositoryResult,
    UpdateOutcome,
};
use lesson_store::models::{Document, DocumentId, Lesson, LessonSearch};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// A small catalog covering text, numeric and mixed-type fields.
///
/// | subject | location | price | spaces | rating |
/// |---------|----------|-------|--------|--------|
/// | Math    | London   | 100   | 5      | 4.5    |
/// | English | Oxford   | 80    | 10     | 3      |
/// | Music   | Bristol  | 25    | 0      | 5      |
/// | Art     | Room 21  | "40"  | 2      | 2      |
pub fn sample_lessons() -> Vec<Document> {
    let mut art = Lesson::new("Art", "Room 21", 0.0, 2, 2.0).into_document();
    art.set("price", Value::String("40".to_string()));

    vec![
        Lesson::new("Math", "London", 100.0, 5, 4.5).into_document(),
        Lesson::new("English", "Oxford", 80.0, 10, 3.0).into_document(),
        Lesson::new("Music", "Bristol", 25.0, 0, 5.0).into_document(),
        art,
    ]
}

pub fn sample_repository() -> LocalRepository {
    LocalRepository::with_lessons(sample_lessons())
}

pub fn subject_names(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter_map(|doc| doc.get_str("subjectName"))
        .map(str::to_string)
        .collect()
}

/// Repository whose every operation fails, for exercising storage faults.
#[derive(Debug, Default, Clone)]
pub struct FailingRepository;

fn fault(operation: &str) -> RepositoryError {
    RepositoryError::connection_with_context(
        "store unavailable",
        ErrorContext::new(operation).with_details("simulated outage"),
    )
}

#[async_trait]
impl LessonRepository for FailingRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Err(fault("health_check"))
    }

    async fn find_all_lessons(&self) -> RepositoryResult<Vec<Document>> {
        Err(fault("find_all_lessons"))
    }

    async fn find_lesson(&self, _id: &DocumentId) -> RepositoryResult<Option<Document>> {
        Err(fault("find_lesson"))
    }

    async fn insert_lesson(&self, _lesson: Document) -> RepositoryResult<DocumentId> {
        Err(fault("insert_lesson"))
    }

    async fn update_lesson_field(
        &self,
        _id: &DocumentId,
        _field: &str,
        _value: Value,
    ) -> RepositoryResult<UpdateOutcome> {
        Err(fault("update_lesson_field"))
    }

    async fn search_lessons(&self, _search: &LessonSearch) -> RepositoryResult<Vec<Document>> {
        Err(fault("search_lessons"))
    }
}

#[async_trait]
impl OrderRepository for FailingRepository {
    async fn find_all_orders(&self) -> RepositoryResult<Vec<Document>> {
        Err(fault("find_all_orders"))
    }

    async fn find_order(&self, _id: &DocumentId) -> RepositoryResult<Option<Document>> {
        Err(fault("find_order"))
    }

    async fn insert_order(&self, _order: Document) -> RepositoryResult<DocumentId> {
        Err(fault("insert_order"))
    }
}

#[cfg(feature = "http-server")]
pub mod http {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use lesson_store::db::repository::FullRepository;
    use lesson_store::http::{create_router, AppState};

    pub fn router_with(repo: Arc<dyn FullRepository>, static_dir: &Path) -> Router {
        create_router(AppState::new(repo, static_dir))
    }

    pub fn router(repo: Arc<dyn FullRepository>) -> Router {
        router_with(repo, Path::new("static"))
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub content_type: Option<String>,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).expect("response body is not JSON")
        }

        pub fn error(&self) -> String {
            self.json()["error"]
                .as_str()
                .expect("response has no error message")
                .to_string()
        }
    }

    pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
        let resp = router.oneshot(request).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse {
            status,
            content_type,
            body,
        }
    }

    pub async fn get(router: Router, path: &str) -> TestResponse {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        send(router, req).await
    }

    pub async fn send_json(router: Router, method: &str, path: &str, body: Value) -> TestResponse {
        send_raw(router, method, path, body.to_string()).await
    }

    pub async fn send_raw(
        router: Router,
        method: &str,
        path: &str,
        body: impl Into<String>,
    ) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.into()))
            .unwrap();
        send(router, req).await
    }
}
