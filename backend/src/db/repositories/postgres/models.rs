use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{lessons, orders};
use crate::db::repository::RepositoryResult;
use crate::models::{Document, DocumentId};

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LessonRow {
    pub id: String,
    pub document: Value,
    #[allow(dead_code)] // ordering column only
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lessons)]
pub struct NewLessonRow {
    pub id: String,
    pub document: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: String,
    pub document: Value,
    #[allow(dead_code)] // ordering column only
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: String,
    pub document: Value,
}

/// Rebuild the API document: the JSONB body plus `_id` from the key column.
fn row_to_document(id: &str, body: Value) -> RepositoryResult<Document> {
    let id: DocumentId = id.parse()?;
    Ok(Document::try_from(body)?.with_id(id))
}

impl LessonRow {
    pub fn into_document(self) -> RepositoryResult<Document> {
        row_to_document(&self.id, self.document)
    }
}

impl OrderRow {
    pub fn into_document(self) -> RepositoryResult<Document> {
        row_to_document(&self.id, self.document)
    }
}

impl NewLessonRow {
    pub fn new(id: DocumentId, lesson: Document) -> Self {
        Self {
            id: id.to_hex(),
            document: lesson.without_id().into_value(),
        }
    }
}

impl NewOrderRow {
    pub fn new(id: DocumentId, order: Document) -> Self {
        Self {
            id: id.to_hex(),
            document: order.without_id().into_value(),
        }
    }
}
