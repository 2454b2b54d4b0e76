//! Embedded static assets
//!
//! In development, falls back to serving from the filesystem.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "static"]
struct Assets;

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    // Try embedded assets first
    if let Some(content) = Assets::get(path) {
        return asset_response(path, content.data.into_owned());
    }

    // Fallback to filesystem in development
    if !path.split('/').any(|segment| segment == "..") {
        let fs_path = PathBuf::from("static").join(path);
        if let Ok(content) = std::fs::read(&fs_path) {
            return asset_response(path, content);
        }
    }

    tracing::debug!(path, "Static asset not found");
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn asset_response(path: &str, content: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        Body::from(content),
    )
        .into_response()
}
