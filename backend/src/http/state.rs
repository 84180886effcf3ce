//! Application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Directory lesson images are served from
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a new application state with the given repository and image
    /// directory.
    pub fn new(repository: Arc<dyn FullRepository>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            static_dir: static_dir.into(),
        }
    }
}
