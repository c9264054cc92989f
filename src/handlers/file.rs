//! File handlers
//!
//! Implements blob upload, listing and download

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path as FsPath, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::entity::arquivo::{self, FileListItem};
use crate::error::{AppError, AppResult, OptionExt};
use crate::extract::PathParam;
use crate::state::AppState;

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Name stored when the client sends none
const FALLBACK_FILE_NAME: &str = "upload.bin";

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
}

/// A multipart file written to the staging directory
#[derive(Debug)]
struct StagedUpload {
    path: PathBuf,
    file_name: String,
    size: u64,
}

/// Build a `Content-Disposition: attachment` value for a stored name
fn attachment_header(file_name: &str) -> HeaderValue {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    let cleaned = if cleaned.trim().is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned
    };

    HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", cleaned).as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Map a multipart failure; body limit hits keep their 413
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// Remove a staged file, logging anything but "already gone"
async fn discard_staged(path: &FsPath) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove staged upload {:?}: {}", path, e);
        }
    }
}

/// Stream one multipart field into `path`
async fn write_field(field: &mut Field<'_>, path: &FsPath) -> AppResult<u64> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await?;

    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(size)
}

/// Stage the `file` field under `upload_dir`
///
/// Other fields are ignored. On error, any partially written file is removed.
async fn stage_upload(upload_dir: &FsPath, mut multipart: Multipart) -> AppResult<StagedUpload> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();

        fs::create_dir_all(upload_dir).await?;
        let path = upload_dir
            .join(uuid::Uuid::new_v4().to_string())
            .with_extension("uploading");

        return match write_field(&mut field, &path).await {
            Ok(size) => Ok(StagedUpload {
                path,
                file_name,
                size,
            }),
            Err(e) => {
                discard_staged(&path).await;
                Err(e)
            }
        };
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// Insert a row with an empty blob, write the payload into it, commit
async fn store_blob(db: &DatabaseConnection, staged: &StagedUpload) -> AppResult<i32> {
    let payload = fs::read(&staged.path).await?;

    let txn = db.begin().await?;

    let row = arquivo::ActiveModel {
        file_name: Set(staged.file_name.clone()),
        file_data: Set(Vec::new()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let written = arquivo::Entity::update_many()
        .col_expr(arquivo::Column::FileData, Expr::value(payload))
        .filter(arquivo::Column::Id.eq(row.id))
        .exec(&txn)
        .await?;
    if written.rows_affected != 1 {
        return Err(AppError::Upload(format!(
            "blob write for file {} touched {} rows",
            row.id, written.rows_affected
        )));
    }

    txn.commit().await?;
    Ok(row.id)
}

/// POST /upload
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let multipart = multipart?;
    let db = state.lease()?;

    let staged = stage_upload(&state.config.upload_dir, multipart).await?;
    tracing::debug!(
        "Staged upload {} ({} bytes) at {:?}",
        staged.file_name,
        staged.size,
        staged.path
    );

    let stored = store_blob(&db, &staged).await;
    discard_staged(&staged.path).await;
    let id = stored?;

    tracing::info!("Stored file {} as {}", staged.file_name, id);
    Ok(Json(UploadResponse { success: true }))
}

/// GET /list-files
pub async fn list_files(State(state): State<AppState>) -> AppResult<Json<Vec<FileListItem>>> {
    let db = state.lease()?;

    let files = arquivo::Entity::find()
        .select_only()
        .column(arquivo::Column::Id)
        .column(arquivo::Column::FileName)
        .order_by_asc(arquivo::Column::Id)
        .into_model::<FileListItem>()
        .all(&*db)
        .await?;

    Ok(Json(files))
}

/// GET /download/:id
pub async fn download_file(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Response> {
    let db = state.lease()?;

    let file = arquivo::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("File not found")?;

    tracing::debug!("Sending file {} ({} bytes)", file.id, file.file_data.len());

    let disposition = attachment_header(&file.file_name);
    let stream = ReaderStream::new(Cursor::new(file.file_data));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_header_quotes_name() {
        let value = attachment_header("report.pdf");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"report.pdf\"");
    }

    #[test]
    fn attachment_header_strips_quotes_and_controls() {
        let value = attachment_header("a\"b\\c\r\nd.txt");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"abcd.txt\"");
    }

    #[test]
    fn attachment_header_falls_back_on_empty_name() {
        let value = attachment_header("\"\"");
        assert_eq!(
            value.to_str().unwrap(),
            format!("attachment; filename=\"{}\"", FALLBACK_FILE_NAME)
        );
    }

    #[test]
    fn attachment_header_keeps_utf8_names() {
        let value = attachment_header("relatório.txt");
        assert_eq!(
            value.as_bytes(),
            "attachment; filename=\"relatório.txt\"".as_bytes()
        );
    }
}
