//! Public API surface for the lesson store.
//!
//! This file consolidates the types clients of the crate work with: stored
//! documents and their identifiers, lesson fields, payload validation and
//! update outcomes.

pub use crate::db::repository::UpdateOutcome;
pub use crate::models::lesson::{
    AVAILABLE_SPACES, LOCATION, NUMERIC_SEARCH_FIELDS, PRICE, RATING, SUBJECT_NAME,
    TEXT_SEARCH_FIELDS,
};
pub use crate::models::{Document, DocumentError, DocumentId, Lesson, LessonSearch, ID_FIELD};
pub use crate::routes::lessons::SpacesUpdate;
pub use crate::routes::search::SearchParams;
pub use crate::routes::PayloadError;
