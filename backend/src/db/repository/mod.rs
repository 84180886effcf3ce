//! Repository traits for the two document collections.
//!
//! The traits are the storage capability set the HTTP layer depends on:
//! find all, find by id, insert one, update one field, plus a lesson
//! search that backends may push down into their own query language.
//! Swapping the storage engine means implementing these traits; route
//! logic does not change.
//!
//! No operation is transactional and none compares-and-swaps. A
//! read-modify-write done by a client across two requests can lose an
//! update when another client writes in between.

use async_trait::async_trait;
use serde_json::Value;

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::models::{Document, DocumentId, LessonSearch};

pub const LESSONS: &str = "lessons";
pub const ORDERS: &str = "orders";

/// What a single-document update did.
///
/// Mirrors the matched/modified counters of a document store: an update
/// that finds its document but writes the value already stored reports
/// `matched == 1, modified == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    pub const NOT_FOUND: Self = Self { matched: 0, modified: 0 };
    pub const UNCHANGED: Self = Self { matched: 1, modified: 0 };
    pub const MODIFIED: Self = Self { matched: 1, modified: 1 };

    pub fn is_modified(&self) -> bool {
        self.modified == 1
    }
}

/// Repository trait for the `lessons` collection.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Check that the store answers.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Every lesson, unfiltered. Order is unspecified.
    async fn find_all_lessons(&self) -> RepositoryResult<Vec<Document>>;

    /// A single lesson by identifier.
    async fn find_lesson(&self, id: &DocumentId) -> RepositoryResult<Option<Document>>;

    /// Store `lesson` verbatim under a freshly generated `_id`.
    ///
    /// # Returns
    /// * `Ok(DocumentId)` - The generated identifier
    /// * `Err(RepositoryError)` - If the insert fails
    async fn insert_lesson(&self, lesson: Document) -> RepositoryResult<DocumentId>;

    /// Set one top-level field of one lesson.
    ///
    /// # Arguments
    /// * `id` - Lesson to update
    /// * `field` - Top-level field name
    /// * `value` - New value
    ///
    /// # Returns
    /// * `Ok(UpdateOutcome)` - Matched/modified counters
    /// * `Err(RepositoryError)` - If the update fails
    async fn update_lesson_field(
        &self,
        id: &DocumentId,
        field: &str,
        value: Value,
    ) -> RepositoryResult<UpdateOutcome>;

    /// Lessons matched by `search` (see [`LessonSearch::matches`]).
    async fn search_lessons(&self, search: &LessonSearch) -> RepositoryResult<Vec<Document>>;
}

/// Repository trait for the `orders` collection.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Every order, unfiltered.
    async fn find_all_orders(&self) -> RepositoryResult<Vec<Document>>;

    /// A single order by identifier.
    async fn find_order(&self, id: &DocumentId) -> RepositoryResult<Option<Document>>;

    /// Store `order` verbatim under a freshly generated `_id`.
    async fn insert_order(&self, order: Document) -> RepositoryResult<DocumentId>;
}

/// Both collections behind one handle.
pub trait FullRepository: LessonRepository + OrderRepository {}

impl<T> FullRepository for T where T: LessonRepository + OrderRepository {}
