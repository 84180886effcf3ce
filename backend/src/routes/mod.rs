//! Route-specific payload types and their validation rules.
//!
//! Everything here runs before storage is touched: a payload that fails
//! validation never reaches a repository.

pub mod lessons;
pub mod orders;
pub mod search;

/// Client-side payload problems, answered with 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Valid availableSpaces (non-negative integer) is required")]
    InvalidAvailableSpaces,

    #[error("Invalid order data")]
    InvalidOrder,

    #[error("Invalid lesson id")]
    InvalidLessonId,

    #[error("Request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
