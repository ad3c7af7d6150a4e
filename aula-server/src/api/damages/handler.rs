//! Damage Report Handlers
//!
//! Reports are created from a multipart form: `resource_id`, `description`
//! and an optional `photo` image (jpeg/png/gif). The photo is verified by
//! decoding it and stored under `{WORK_DIR}/uploads/damages/`.

use std::path::{Path as FsPath, PathBuf};

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use rand::Rng;
use serde::Deserialize;
use shared::ErrorCode;
use shared::models::{AuditAction, DamageReport, DamageReportView};

use crate::audit::AuditLogRequest;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self as repo, RepoError};
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const ENTITY: &str = "damage_reports";

/// Public URL prefix of stored photos
pub const PHOTO_URL_PREFIX: &str = "/uploads/damages/";

/// Accepted photo extensions
const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub resource_id: Option<i64>,
}

/// Photo received in the form, not yet written to disk
struct PhotoUpload {
    data: Vec<u8>,
    ext: String,
}

fn damages_dir(state: &ServerState) -> PathBuf {
    state.config.uploads_dir().join("damages")
}

fn photo_path(state: &ServerState, photo_url: &str) -> Option<PathBuf> {
    let file = photo_url.strip_prefix(PHOTO_URL_PREFIX)?;
    if file.is_empty() || file.contains('/') || file.contains('\\') || file.contains("..") {
        return None;
    }
    Some(damages_dir(state).join(file))
}

fn extension_of(filename: &str) -> Option<String> {
    FsPath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn extension_for_mime(content_type: &str) -> Option<String> {
    let ext = match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => return None,
    };
    Some(ext.to_string())
}

/// Validate photo content: non-empty, accepted extension, decodable
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }

    if !SUPPORTED_FORMATS.contains(&ext) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }

    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::with_message(
            ErrorCode::InvalidImageFile,
            format!("Invalid image file ({}): {}", ext, e),
        ));
    }

    Ok(())
}

/// Read one multipart field, failing as soon as it grows past `limit`
async fn read_limited(
    mut field: axum::extract::multipart::Field<'_>,
    limit: usize,
) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
    {
        if data.len() + chunk.len() > limit {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!("File too large. Maximum size is {} bytes", limit),
            ));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn store_photo(state: &ServerState, photo: &PhotoUpload) -> AppResult<String> {
    let dir = damages_dir(state);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::with_message(ErrorCode::StorageError, format!("{}", e)))?;

    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let filename = format!(
        "damage-{}-{}.{}",
        shared::util::now_millis(),
        suffix,
        photo.ext
    );

    tokio::fs::write(dir.join(&filename), &photo.data)
        .await
        .map_err(|e| {
            AppError::with_message(
                ErrorCode::StorageError,
                format!("Failed to store photo: {}", e),
            )
        })?;

    Ok(format!("{PHOTO_URL_PREFIX}{filename}"))
}

async fn remove_photo(state: &ServerState, photo_url: &str) {
    let Some(path) = photo_path(state, photo_url) else {
        tracing::warn!(photo_url = %photo_url, "Refusing to remove photo outside the uploads dir");
        return;
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = ?path, "Damage photo removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove damage photo"),
    }
}

/// GET /api/damages - 损坏报告列表 (可按设备过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DamageReportView>>> {
    let mut reports = repo::damage::list(&state.pool).await?;
    if let Some(resource_id) = query.resource_id {
        reports.retain(|r| r.resource_id == resource_id);
    }
    Ok(Json(reports))
}

/// GET /api/damages/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DamageReportView>> {
    let report = repo::damage::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DamageReportNotFound).with_detail("id", id))?;
    Ok(Json(report))
}

/// POST /api/damages - 提交损坏报告 (multipart)
///
/// 设备状态同时变为 DAMAGED
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<DamageReport>> {
    let mut resource_id: Option<i64> = None;
    let mut description: Option<String> = None;
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resource_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::validation("resource_id must be an integer"))?;
                resource_id = Some(id);
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                description = Some(text);
            }
            "photo" => {
                let ext = field
                    .file_name()
                    .and_then(extension_of)
                    .or_else(|| field.content_type().and_then(extension_for_mime))
                    .unwrap_or_default();
                let data = read_limited(field, state.config.max_upload_bytes).await?;
                // 浏览器在未选择文件时仍会提交空的文件字段
                if data.is_empty() && ext.is_empty() {
                    continue;
                }
                photo = Some(PhotoUpload { data, ext });
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let resource_id = resource_id.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "resource_id is required")
    })?;
    let description = description.unwrap_or_default();
    validate_required_text(&description, "description", MAX_NOTE_LEN)?;

    repo::resource::find_by_id(&state.pool, resource_id)
        .await?
        .ok_or_else(|| AppError::resource_not_found(resource_id))?;

    let photo_url = match &photo {
        Some(photo) => {
            validate_image(&photo.data, &photo.ext)?;
            Some(store_photo(&state, photo).await?)
        }
        None => None,
    };

    let report = match repo::damage::create(
        &state.pool,
        resource_id,
        current_user.id,
        &description,
        photo_url.as_deref(),
    )
    .await
    {
        Ok(report) => report,
        Err(e) => {
            if let Some(url) = &photo_url {
                remove_photo(&state, url).await;
            }
            return Err(match e {
                RepoError::NotFound(msg) => {
                    AppError::with_message(ErrorCode::ResourceNotFound, msg)
                }
                other => other.into(),
            });
        }
    };

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Create, ENTITY, Some(report.id))
                .by(&current_user)
                .detail(format!(
                    "Damage reported on resource {}{}",
                    resource_id,
                    if report.photo_url.is_some() { " (with photo)" } else { "" }
                )),
        )
        .await;

    Ok(Json(report))
}

/// DELETE /api/damages/:id - 删除报告及其照片 (管理员)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let report = repo::damage::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DamageReportNotFound).with_detail("id", id))?;

    let deleted = repo::damage::delete(&state.pool, id).await?;
    if deleted {
        if let Some(url) = &report.photo_url {
            remove_photo(&state, url).await;
        }

        state
            .audit_service
            .log(
                AuditLogRequest::new(AuditAction::Delete, ENTITY, Some(id))
                    .by(&current_user)
                    .detail(format!("Deleted damage report on resource {}", report.resource_id)),
            )
            .await;
    }

    Ok(Json(deleted))
}
