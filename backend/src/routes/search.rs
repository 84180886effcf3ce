use serde::{Deserialize, Serialize};

use crate::models::LessonSearch;

pub const SEARCH_LESSONS: &str = "search_lessons";

/// Query string of the search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchParams {
    /// The search to run, or `None` to list the whole catalog.
    pub fn search(&self) -> Option<LessonSearch> {
        self.q.as_deref().and_then(LessonSearch::parse)
    }
}
