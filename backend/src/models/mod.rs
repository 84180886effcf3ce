//! Domain models: stored documents, lessons, and search semantics.

pub mod document;
pub mod lesson;
pub mod search;

pub use document::{json_kind, Document, DocumentError, DocumentId, ID_FIELD};
pub use lesson::Lesson;
pub use search::LessonSearch;
