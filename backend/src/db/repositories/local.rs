//! In-memory repository for tests and local development.
//!
//! Each collection is a `Vec<Document>` behind a `parking_lot::RwLock`, so
//! listing returns documents in insertion order. Individual operations are
//! atomic; sequences of operations are not.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

use crate::db::repository::{
    LessonRepository, OrderRepository, RepositoryResult, UpdateOutcome,
};
use crate::models::{Document, DocumentId, LessonSearch};

#[derive(Debug, Default)]
struct Collections {
    lessons: Vec<Document>,
    orders: Vec<Document>,
}

/// In-memory document store.
///
/// Cloning shares the underlying collections.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<Collections>>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with lessons.
    pub fn with_lessons(lessons: impl IntoIterator<Item = Document>) -> Self {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            for lesson in lessons {
                data.lessons.push(lesson.with_id(DocumentId::generate()));
            }
        }
        repo
    }

    pub fn lesson_count(&self) -> usize {
        self.data.read().lessons.len()
    }

    pub fn order_count(&self) -> usize {
        self.data.read().orders.len()
    }

    /// Drop every document from both collections.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.lessons.clear();
        data.orders.clear();
    }
}

/// JSON equality with numbers compared by value, so `5.0` equals `5`.
fn same_value(stored: &Value, incoming: &Value) -> bool {
    match (stored, incoming) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_f64() == b.as_f64(),
            },
        },
        _ => stored == incoming,
    }
}

fn find_by_id<'a>(documents: &'a [Document], id: &DocumentId) -> Option<&'a Document> {
    documents.iter().find(|doc| doc.id().as_ref() == Some(id))
}

#[async_trait]
impl LessonRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn find_all_lessons(&self) -> RepositoryResult<Vec<Document>> {
        Ok(self.data.read().lessons.clone())
    }

    async fn find_lesson(&self, id: &DocumentId) -> RepositoryResult<Option<Document>> {
        Ok(find_by_id(&self.data.read().lessons, id).cloned())
    }

    async fn insert_lesson(&self, lesson: Document) -> RepositoryResult<DocumentId> {
        let id = DocumentId::generate();
        self.data.write().lessons.push(lesson.with_id(id));
        debug!("Inserted lesson {}", id);
        Ok(id)
    }

    async fn update_lesson_field(
        &self,
        id: &DocumentId,
        field: &str,
        value: Value,
    ) -> RepositoryResult<UpdateOutcome> {
        let mut data = self.data.write();
        let Some(lesson) = data
            .lessons
            .iter_mut()
            .find(|doc| doc.id().as_ref() == Some(id))
        else {
            return Ok(UpdateOutcome::NOT_FOUND);
        };

        if lesson.get(field).is_some_and(|stored| same_value(stored, &value)) {
            return Ok(UpdateOutcome::UNCHANGED);
        }
        lesson.set(field, value);
        Ok(UpdateOutcome::MODIFIED)
    }

    async fn search_lessons(&self, search: &LessonSearch) -> RepositoryResult<Vec<Document>> {
        Ok(self
            .data
            .read()
            .lessons
            .iter()
            .filter(|lesson| search.matches(lesson))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for LocalRepository {
    async fn find_all_orders(&self) -> RepositoryResult<Vec<Document>> {
        Ok(self.data.read().orders.clone())
    }

    async fn find_order(&self, id: &DocumentId) -> RepositoryResult<Option<Document>> {
        Ok(find_by_id(&self.data.read().orders, id).cloned())
    }

    async fn insert_order(&self, order: Document) -> RepositoryResult<DocumentId> {
        let id = DocumentId::generate();
        self.data.write().orders.push(order.with_id(id));
        debug!("Inserted order {}", id);
        Ok(id)
    }
}
