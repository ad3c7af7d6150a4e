//! Uploaded files (read-only)
//!
//! `GET /uploads/damages/{file}` serves stored damage photos. The path is
//! outside `/api/`, so it is not behind authentication.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use http::header;

use crate::core::ServerState;

/// Uploaded file response
enum UploadFileResponse {
    Ok(Bytes, String),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for UploadFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            UploadFileResponse::Ok(content, mime) => {
                (http::StatusCode::OK, [(header::CONTENT_TYPE, mime)], content).into_response()
            }
            UploadFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            UploadFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Reject anything that could escape the uploads directory
fn is_safe_filename(filename: &str) -> bool {
    !(filename.is_empty()
        || filename.starts_with('.')
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\'))
}

async fn serve_damage_photo(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> UploadFileResponse {
    if !is_safe_filename(&filename) {
        tracing::warn!(filename = %filename, "Rejected upload path");
        return UploadFileResponse::BadRequest("Invalid filename");
    }

    let file_path = state.config.uploads_dir().join("damages").join(&filename);
    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&file_path)
                .first_or_octet_stream()
                .to_string();
            UploadFileResponse::Ok(content.into(), mime)
        }
        Err(e) => {
            tracing::debug!(path = ?file_path, error = %e, "Upload not found");
            UploadFileResponse::NotFound
        }
    }
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/uploads/damages/{filename}", get(serve_damage_photo))
}
