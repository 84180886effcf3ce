//! End-to-end tests of the REST API against the in-memory store.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use lesson_store::db::repositories::LocalRepository;
use lesson_store::db::repository::{FullRepository, LessonRepository};
use lesson_store::models::lesson::AVAILABLE_SPACES;

use support::http::{get, router, send_json, send_raw};

fn shared(repo: &LocalRepository) -> Arc<dyn FullRepository> {
    Arc::new(repo.clone())
}

async fn first_lesson_id(repo: &LocalRepository) -> String {
    let response = get(router(shared(repo)), "/api/lessons").await;
    response.json()[0]["_id"].as_str().unwrap().to_string()
}

async fn spaces_of(repo: &LocalRepository, id: &str) -> Value {
    let response = get(router(shared(repo)), "/api/lessons").await;
    response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["_id"] == json!(id))
        .map(|l| l[AVAILABLE_SPACES].clone())
        .unwrap()
}

// =========================================================
// Health
// =========================================================

#[tokio::test]
async fn test_health_reports_store() {
    let response = get(router(shared(&LocalRepository::new())), "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// =========================================================
// Lessons
// =========================================================

#[tokio::test]
async fn test_list_lessons_returns_every_document() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/lessons").await;

    assert_eq!(response.status, StatusCode::OK);
    let lessons = response.json();
    let lessons = lessons.as_array().unwrap();
    assert_eq!(lessons.len(), 4);
    for lesson in lessons {
        assert_eq!(lesson["_id"].as_str().unwrap().len(), 24);
    }
}

#[tokio::test]
async fn test_list_lessons_on_empty_catalog() {
    let response = get(router(shared(&LocalRepository::new())), "/api/lessons").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_added_lesson_appears_in_listing() {
    let repo = LocalRepository::new();
    let lesson = json!({
        "subjectName": "Chess",
        "location": "Leeds",
        "price": 55,
        "availableSpaces": 8,
        "rating": 4,
        "tags": ["strategy"]
    });

    let response = send_json(router(shared(&repo)), "POST", "/api/lessons", lesson.clone()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json(), json!({"message": "Lesson added successfully"}));

    let listed = get(router(shared(&repo)), "/api/lessons").await.json();
    let mut stored = listed[0].clone();
    assert!(stored["_id"].is_string());
    stored.as_object_mut().unwrap().remove("_id");
    assert_eq!(stored, lesson);
}

#[tokio::test]
async fn test_add_lesson_accepts_any_shape() {
    let repo = LocalRepository::new();
    let response = send_json(router(shared(&repo)), "POST", "/api/lessons", json!({})).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(repo.lesson_count(), 1);
}

#[tokio::test]
async fn test_add_lesson_replaces_client_id() {
    let repo = LocalRepository::new();
    let client_id = "000000000000000000000000";
    let response = send_json(
        router(shared(&repo)),
        "POST",
        "/api/lessons",
        json!({"_id": client_id, "subjectName": "Art"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let listed = get(router(shared(&repo)), "/api/lessons").await.json();
    assert_ne!(listed[0]["_id"], json!(client_id));
    assert_eq!(listed[0]["subjectName"], "Art");
}

#[tokio::test]
async fn test_add_lesson_rejects_non_object() {
    let repo = LocalRepository::new();
    let response = send_json(router(shared(&repo)), "POST", "/api/lessons", json!([1, 2])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(repo.lesson_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let repo = LocalRepository::new();
    let response = send_raw(router(shared(&repo)), "POST", "/api/lessons", "{not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
    assert_eq!(repo.lesson_count(), 0);
}

// =========================================================
// Stock updates
// =========================================================

#[tokio::test]
async fn test_update_lesson_sets_spaces() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;

    let response = send_json(
        router(shared(&repo)),
        "PUT",
        &format!("/api/lessons/{}", id),
        json!({"availableSpaces": 4}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"message": "Lesson updated successfully"}));
    assert_eq!(spaces_of(&repo, &id).await, json!(4));
}

#[tokio::test]
async fn test_update_accepts_integral_float() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;

    let response = send_raw(
        router(shared(&repo)),
        "PUT",
        &format!("/api/lessons/{}", id),
        r#"{"availableSpaces": 3.0}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(spaces_of(&repo, &id).await, json!(3));
}

#[tokio::test]
async fn test_update_accepts_integral_float_past_u64() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;

    let response = send_raw(
        router(shared(&repo)),
        "PUT",
        &format!("/api/lessons/{}", id),
        r#"{"availableSpaces": 1e20}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(spaces_of(&repo, &id).await, json!(1e20));
}

#[tokio::test]
async fn test_update_rejects_invalid_spaces_without_mutation() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;
    let before = repo.find_all_lessons().await.unwrap();

    for body in [
        json!({"availableSpaces": -1}),
        json!({"availableSpaces": 2.5}),
        json!({"availableSpaces": "3"}),
        json!({"availableSpaces": null}),
        json!({}),
    ] {
        let response = send_json(
            router(shared(&repo)),
            "PUT",
            &format!("/api/lessons/{}", id),
            body.clone(),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(
            response.error(),
            "Valid availableSpaces (non-negative integer) is required"
        );
    }

    assert_eq!(repo.find_all_lessons().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_validates_spaces_before_id() {
    let repo = support::sample_repository();
    let response = send_json(
        router(shared(&repo)),
        "PUT",
        "/api/lessons/not-an-id",
        json!({"availableSpaces": -5}),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "Valid availableSpaces (non-negative integer) is required"
    );
}

#[tokio::test]
async fn test_update_with_malformed_id() {
    let repo = support::sample_repository();
    let response = send_json(
        router(shared(&repo)),
        "PUT",
        "/api/lessons/not-an-id",
        json!({"availableSpaces": 1}),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Invalid lesson id");
}

#[tokio::test]
async fn test_update_unknown_lesson_is_not_found() {
    let repo = support::sample_repository();
    let response = send_json(
        router(shared(&repo)),
        "PUT",
        "/api/lessons/65a1b2c3d4e5f60718293a4b",
        json!({"availableSpaces": 1}),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Lesson not found or no changes made");
}

#[tokio::test]
async fn test_update_with_current_value_is_not_found() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;

    // Math starts with 5 spaces
    let response = send_json(
        router(shared(&repo)),
        "PUT",
        &format!("/api/lessons/{}", id),
        json!({"availableSpaces": 5}),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Lesson not found or no changes made");
}

#[tokio::test]
async fn test_update_with_integer_over_equal_float_is_not_found() {
    let repo = LocalRepository::new();
    let response = send_raw(
        router(shared(&repo)),
        "POST",
        "/api/lessons",
        r#"{"subjectName": "Math", "availableSpaces": 5.0}"#,
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = first_lesson_id(&repo).await;

    let response = send_json(
        router(shared(&repo)),
        "PUT",
        &format!("/api/lessons/{}", id),
        json!({"availableSpaces": 5}),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Lesson not found or no changes made");
}

#[tokio::test]
async fn test_concurrent_updates_lose_one_write() {
    let repo = support::sample_repository();
    let id = first_lesson_id(&repo).await;
    let path = format!("/api/lessons/{}", id);

    // Both clients read 5 and decrement from their own copy.
    let seen_a = spaces_of(&repo, &id).await;
    let seen_b = spaces_of(&repo, &id).await;
    assert_eq!(seen_a, json!(5));
    assert_eq!(seen_b, json!(5));

    let (a, b) = tokio::join!(
        send_json(router(shared(&repo)), "PUT", &path, json!({"availableSpaces": 4})),
        send_json(router(shared(&repo)), "PUT", &path, json!({"availableSpaces": 3})),
    );
    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(b.status, StatusCode::OK);

    // Two sales happened but stock only dropped by one: the last write won.
    let final_spaces = spaces_of(&repo, &id).await;
    assert!(final_spaces == json!(4) || final_spaces == json!(3));
    assert_ne!(final_spaces, json!(2));
}

// =========================================================
// Orders
// =========================================================

#[tokio::test]
async fn test_place_order_returns_listed_id() {
    let repo = support::sample_repository();
    let order = json!({
        "customerName": "Ada",
        "phone": "0123",
        "cart": [{"lessonId": "65a1b2c3d4e5f60718293a4b", "quantity": 2}]
    });

    let response = send_json(router(shared(&repo)), "POST", "/api/orders", order.clone()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "Order placed successfully");
    let order_id = body["orderId"].as_str().unwrap().to_string();

    let orders = get(router(shared(&repo)), "/api/orders").await;
    assert_eq!(orders.status, StatusCode::OK);
    let orders = orders.json();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["_id"], json!(order_id));
    assert_eq!(orders[0]["phone"], "0123");
    assert_eq!(orders[0]["cart"], order["cart"]);
}

#[tokio::test]
async fn test_place_order_does_not_touch_stock() {
    let repo = support::sample_repository();
    let before = repo.find_all_lessons().await.unwrap();
    let id = first_lesson_id(&repo).await;

    let response = send_json(
        router(shared(&repo)),
        "POST",
        "/api/orders",
        json!({"customerName": "Bo", "cart": [{"lessonId": id, "quantity": 99}]}),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(repo.find_all_lessons().await.unwrap(), before);
}

#[tokio::test]
async fn test_invalid_orders_are_rejected() {
    let repo = LocalRepository::new();

    for body in [
        json!({"customerName": "", "cart": [1]}),
        json!({"customerName": "Ada", "cart": []}),
        json!({"cart": [1]}),
        json!({"customerName": "Ada"}),
        json!({"customerName": "Ada", "cart": "lesson"}),
        json!({"customerName": 7, "cart": [1]}),
    ] {
        let response = send_json(router(shared(&repo)), "POST", "/api/orders", body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response.error(), "Invalid order data");
    }

    assert_eq!(repo.order_count(), 0);
}

#[tokio::test]
async fn test_list_orders_on_empty_store() {
    let response = get(router(shared(&LocalRepository::new())), "/api/orders").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

// =========================================================
// Search
// =========================================================

#[tokio::test]
async fn test_blank_search_equals_listing() {
    let repo = support::sample_repository();
    let all = get(router(shared(&repo)), "/api/lessons").await.json();

    for path in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let response = get(router(shared(&repo)), path).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), all, "path {}", path);
    }
}

#[tokio::test]
async fn test_text_search_is_case_insensitive() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/search?q=%20oXf%20").await;
    assert_eq!(response.status, StatusCode::OK);

    let found: Vec<_> = response.json().as_array().unwrap().clone();
    let docs: Vec<_> = found
        .into_iter()
        .map(|v| lesson_store::models::Document::try_from(v).unwrap())
        .collect();
    assert_eq!(support::subject_names(&docs), vec!["English"]);
}

#[tokio::test]
async fn test_numeric_search_matches_stringified_fields() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/search?q=1").await;
    assert_eq!(response.status, StatusCode::OK);

    let docs: Vec<_> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .cloned()
        .map(|v| lesson_store::models::Document::try_from(v).unwrap())
        .collect();
    // Math: price 100, English: 10 spaces, Art: "Room 21"
    assert_eq!(support::subject_names(&docs), vec!["Math", "English", "Art"]);
}

#[tokio::test]
async fn test_numeric_search_matches_string_price() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/search?q=40").await;
    let docs: Vec<_> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .cloned()
        .map(|v| lesson_store::models::Document::try_from(v).unwrap())
        .collect();
    assert_eq!(support::subject_names(&docs), vec!["Art"]);
}

#[tokio::test]
async fn test_search_term_is_literal() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/search?q=.%2A").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_search_without_match() {
    let repo = support::sample_repository();
    let response = get(router(shared(&repo)), "/api/search?q=Physics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

// =========================================================
// Cross-cutting
// =========================================================

#[tokio::test]
async fn test_cors_preflight() {
    use axum::body::Body;
    use axum::http::Request;

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/lessons")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "PUT")
        .body(Body::empty())
        .unwrap();
    let resp = support::http::send(router(shared(&LocalRepository::new())), req).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = get(router(shared(&LocalRepository::new())), "/api/unknown").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
