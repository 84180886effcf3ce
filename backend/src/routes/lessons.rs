use serde_json::{Number, Value};

use super::PayloadError;
use crate::models::lesson::AVAILABLE_SPACES;
use crate::models::{json_kind, Document, DocumentId};

pub const LIST_LESSONS: &str = "list_lessons";
pub const ADD_LESSON: &str = "add_lesson";
pub const UPDATE_LESSON: &str = "update_lesson";

pub const LESSON_ADDED: &str = "Lesson added successfully";
pub const LESSON_UPDATED: &str = "Lesson updated successfully";
pub const LESSON_NOT_UPDATED: &str = "Lesson not found or no changes made";

/// A new catalog entry, accepted in whatever shape the client sent.
pub fn lesson_from_body(body: Value) -> Result<Document, PayloadError> {
    let kind = json_kind(&body);
    Document::try_from(body).map_err(|_| PayloadError::NotAnObject(kind))
}

/// Parse the path identifier of the lesson being updated.
pub fn parse_lesson_id(raw: &str) -> Result<DocumentId, PayloadError> {
    raw.parse().map_err(|_| PayloadError::InvalidLessonId)
}

/// Validated body of a stock update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacesUpdate {
    available_spaces: Number,
}

impl SpacesUpdate {
    pub fn new(available_spaces: u64) -> Self {
        Self {
            available_spaces: available_spaces.into(),
        }
    }

    /// Accept `availableSpaces` only when it is a JSON number with no
    /// fractional part and no sign. `5.0` counts as an integer; integral
    /// values past `u64::MAX` are kept as floats.
    pub fn from_body(body: &Value) -> Result<Self, PayloadError> {
        let number = body
            .get(AVAILABLE_SPACES)
            .and_then(Value::as_number)
            .ok_or(PayloadError::InvalidAvailableSpaces)?;

        if let Some(n) = number.as_u64() {
            return Ok(Self::new(n));
        }
        match number.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
                if f < u64::MAX as f64 {
                    Ok(Self::new(f as u64))
                } else {
                    Number::from_f64(f)
                        .map(|available_spaces| Self { available_spaces })
                        .ok_or(PayloadError::InvalidAvailableSpaces)
                }
            }
            _ => Err(PayloadError::InvalidAvailableSpaces),
        }
    }

    pub fn available_spaces(&self) -> &Number {
        &self.available_spaces
    }

    pub fn value(&self) -> Value {
        Value::Number(self.available_spaces.clone())
    }
}
