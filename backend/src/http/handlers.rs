//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint: it validates the payload
//! with [`crate::routes`], delegates to the service layer, and turns
//! storage faults into the endpoint's fixed 500 message.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::dto::{HealthResponse, MessageResponse, OrderPlacedResponse};
use super::error::{AppError, INTERNAL_SERVER_ERROR};
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::Document;
use crate::routes::lessons::{
    lesson_from_body, parse_lesson_id, SpacesUpdate, LESSON_ADDED, LESSON_NOT_UPDATED,
    LESSON_UPDATED,
};
use crate::routes::orders::{order_from_body, ORDER_PLACED};
use crate::routes::search::SearchParams;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a document.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

pub const FETCH_LESSONS_FAILED: &str = "Error fetching lessons";
pub const ADD_LESSON_FAILED: &str = "Error adding lesson";
pub const SAVE_ORDER_FAILED: &str = "Error saving order";
pub const FETCH_ORDERS_FAILED: &str = "Error fetching orders";
pub const SEARCH_FAILED: &str = "Error searching lessons";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
    }))
}

// =============================================================================
// Lessons
// =============================================================================

/// GET /api/lessons
pub async fn list_lessons(State(state): State<AppState>) -> HandlerResult<Vec<Document>> {
    let lessons = db_services::list_lessons(state.repository.as_ref())
        .await
        .map_err(|e| AppError::storage(FETCH_LESSONS_FAILED, e))?;
    Ok(Json(lessons))
}

/// POST /api/lessons
///
/// Store the body verbatim as a new lesson.
pub async fn add_lesson(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> CreatedResult<MessageResponse> {
    let Json(body) = payload?;
    let lesson = lesson_from_body(body)?;

    db_services::add_lesson(state.repository.as_ref(), lesson)
        .await
        .map_err(|e| AppError::storage(ADD_LESSON_FAILED, e))?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(LESSON_ADDED))))
}

/// PUT /api/lessons/{id}
///
/// Overwrite `availableSpaces`. Writing the value already stored counts as
/// "no changes made" and is answered like a missing lesson.
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HandlerResult<MessageResponse> {
    let Json(body) = payload?;
    let update = SpacesUpdate::from_body(&body)?;
    let id = parse_lesson_id(&id)?;

    let outcome = db_services::update_lesson_spaces(state.repository.as_ref(), &id, update)
        .await
        .map_err(|e| AppError::storage(INTERNAL_SERVER_ERROR, e))?;

    if !outcome.is_modified() {
        return Err(AppError::NotFound(LESSON_NOT_UPDATED.to_string()));
    }
    Ok(Json(MessageResponse::new(LESSON_UPDATED)))
}

// =============================================================================
// Orders
// =============================================================================

/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> CreatedResult<OrderPlacedResponse> {
    let Json(body) = payload?;
    let order = order_from_body(body)?;

    let order_id = db_services::place_order(state.repository.as_ref(), order)
        .await
        .map_err(|e| AppError::storage(SAVE_ORDER_FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderPlacedResponse {
            message: ORDER_PLACED.to_string(),
            order_id,
        }),
    ))
}

/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> HandlerResult<Vec<Document>> {
    let orders = db_services::list_orders(state.repository.as_ref())
        .await
        .map_err(|e| AppError::storage(FETCH_ORDERS_FAILED, e))?;
    Ok(Json(orders))
}

// =============================================================================
// Search
// =============================================================================

/// GET /api/search?q=term
///
/// A blank or missing term lists the whole catalog.
pub async fn search_lessons(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> HandlerResult<Vec<Document>> {
    let search = params.search();
    let lessons = db_services::search_lessons(state.repository.as_ref(), search.as_ref())
        .await
        .map_err(|e| AppError::storage(SEARCH_FAILED, e))?;
    Ok(Json(lessons))
}
