//! Service layer: store operations the HTTP handlers call.
//!
//! Every function takes the repository explicitly and works with any
//! backend. Payload validation happens before these are called (see
//! [`crate::routes`]).

use log::debug;

use super::repository::{
    FullRepository, LessonRepository, OrderRepository, RepositoryResult, UpdateOutcome,
};
use crate::models::lesson::AVAILABLE_SPACES;
use crate::models::{Document, DocumentId, LessonSearch};
use crate::routes::lessons::SpacesUpdate;

/// Check that the store answers.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Every lesson in the catalog.
pub async fn list_lessons(repo: &dyn FullRepository) -> RepositoryResult<Vec<Document>> {
    repo.find_all_lessons().await
}

/// Fetch one lesson.
pub async fn get_lesson(
    repo: &dyn FullRepository,
    id: &DocumentId,
) -> RepositoryResult<Option<Document>> {
    repo.find_lesson(id)
        .await
        .map_err(|e| e.with_document_id(id))
}

/// Insert a lesson as given and return its new identifier.
pub async fn add_lesson(repo: &dyn FullRepository, lesson: Document) -> RepositoryResult<DocumentId> {
    let id = repo.insert_lesson(lesson).await?;
    debug!("Added lesson {}", id);
    Ok(id)
}

/// Overwrite `availableSpaces` of one lesson.
///
/// The stored value is replaced, not decremented: two clients that read the
/// same value and write back their own results both succeed, and the last
/// write wins.
pub async fn update_lesson_spaces(
    repo: &dyn FullRepository,
    id: &DocumentId,
    update: SpacesUpdate,
) -> RepositoryResult<UpdateOutcome> {
    let outcome = repo
        .update_lesson_field(id, AVAILABLE_SPACES, update.value())
        .await
        .map_err(|e| e.with_document_id(id))?;
    debug!(
        "Set {} = {} on lesson {} (matched {}, modified {})",
        AVAILABLE_SPACES, update.available_spaces(), id, outcome.matched, outcome.modified
    );
    Ok(outcome)
}

/// Store a validated order and return its identifier.
pub async fn place_order(repo: &dyn FullRepository, order: Document) -> RepositoryResult<DocumentId> {
    let id = repo.insert_order(order).await?;
    debug!("Placed order {}", id);
    Ok(id)
}

/// Every order ever placed.
pub async fn list_orders(repo: &dyn FullRepository) -> RepositoryResult<Vec<Document>> {
    repo.find_all_orders().await
}

/// Fetch one order.
pub async fn get_order(
    repo: &dyn FullRepository,
    id: &DocumentId,
) -> RepositoryResult<Option<Document>> {
    repo.find_order(id)
        .await
        .map_err(|e| e.with_document_id(id))
}

/// Run a catalog search; no search means the whole catalog.
pub async fn search_lessons(
    repo: &dyn FullRepository,
    search: Option<&LessonSearch>,
) -> RepositoryResult<Vec<Document>> {
    match search {
        Some(search) => {
            debug!(
                "Searching lessons for {:?} (numeric: {})",
                search.term(),
                search.is_numeric()
            );
            repo.search_lessons(search).await
        }
        None => repo.find_all_lessons().await,
    }
}
