//! Lesson documents.
//!
//! The catalog accepts lessons of any shape, so the store keeps them as
//! plain [`Document`]s. [`Lesson`] is the typed view of the conventional
//! fields, used to build well-formed catalog entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::{Document, DocumentError};

pub const SUBJECT_NAME: &str = "subjectName";
pub const LOCATION: &str = "location";
pub const PRICE: &str = "price";
pub const AVAILABLE_SPACES: &str = "availableSpaces";
pub const RATING: &str = "rating";

/// Text fields matched by every search.
pub const TEXT_SEARCH_FIELDS: [&str; 2] = [SUBJECT_NAME, LOCATION];

/// Numeric fields matched (as strings) when the search term is numeric.
pub const NUMERIC_SEARCH_FIELDS: [&str; 3] = [PRICE, AVAILABLE_SPACES, RATING];

/// A catalog entry with the conventional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub subject_name: String,
    pub location: String,
    pub price: f64,
    pub available_spaces: u64,
    pub rating: f64,
}

impl Lesson {
    pub fn new(
        subject_name: impl Into<String>,
        location: impl Into<String>,
        price: f64,
        available_spaces: u64,
        rating: f64,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            location: location.into(),
            price,
            available_spaces,
            rating,
        }
    }

    /// Convert into a storable document (without `_id`).
    pub fn into_document(self) -> Document {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        Document::try_from(value).unwrap_or_default()
    }

    /// Read the conventional fields back from a stored document.
    pub fn from_document(document: &Document) -> Result<Self, DocumentError> {
        serde_json::from_value(document.clone().without_id().into_value())
            .map_err(|e| DocumentError::Shape(e.to_string()))
    }
}
