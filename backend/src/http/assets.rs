//! Lesson image delivery from the static directory.

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::{Path as UrlPath, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::error::AppError;
use super::state::AppState;

pub const IMAGE_NOT_FOUND: &str = "Image not found";
pub const UNSUPPORTED_IMAGE: &str = "Unsupported image format";

/// Extensions served as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Join `requested` onto `root`, refusing anything but plain name components.
pub fn resolve_image_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let relative = Path::new(requested);
    let mut resolved = root.to_path_buf();
    let mut pushed = false;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    pushed.then_some(resolved)
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// GET /images/{*path}
///
/// Serve an image file from the static directory.
pub async fn serve_image(
    State(state): State<AppState>,
    UrlPath(requested): UrlPath<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound(IMAGE_NOT_FOUND.to_string());

    let path = resolve_image_path(&state.static_dir, &requested).ok_or_else(not_found)?;
    let metadata = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    if !is_image_file(&path) {
        return Err(AppError::UnsupportedMediaType(UNSUPPORTED_IMAGE.to_string()));
    }

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
        not_found()
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
