use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors a route can end in
///
/// Clients see the status code and a fixed label. For 5xx the underlying
/// cause goes to the log only.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    BadRequest(String),

    #[error("login rejected")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upload exceeds body limit")]
    PayloadTooLarge,

    #[error("database: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("staging io: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob store: {0}")]
    Upload(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_) | AppError::Io(_) | AppError::Upload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text sent to the client
    fn public_message(&self) -> &str {
        match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.as_str(),
            AppError::Unauthorized => "Invalid credentials",
            AppError::PayloadTooLarge => "Payload too large",
            AppError::Database(_) => "Database error",
            AppError::Io(_) | AppError::Upload(_) => "Upload error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", self);
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// `Option` lookups that end in a 404
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        match self {
            Some(value) => Ok(value),
            None => Err(AppError::NotFound(msg.into())),
        }
    }
}

/// Treat an empty result set as a missing resource
pub fn non_empty<T>(rows: Vec<T>, msg: &str) -> AppResult<Vec<T>> {
    if rows.is_empty() {
        return Err(AppError::NotFound(msg.to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let raw = String::from_utf8_lossy(&bytes).to_string();
        (status, serde_json::from_slice(&bytes).unwrap(), raw)
    }

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            AppError::BadRequest("No ids supplied".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::NotFound("User not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Upload("short write".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn client_errors_carry_route_message() {
        let (status, body, _) = body_of(AppError::NotFound("File not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"code": 404, "message": "File not found"}));
    }

    #[tokio::test]
    async fn driver_detail_never_reaches_client() {
        let err = AppError::Database(DbErr::Custom("relation \"usuarios\" does not exist".into()));
        let (status, body, raw) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Database error");
        assert!(!raw.contains("usuarios"));

        let err = AppError::Database(DbErr::Conn(RuntimeErr::Internal("refused".into())));
        let (_, body, _) = body_of(err).await;
        assert_eq!(body["code"], 500);
    }

    #[tokio::test]
    async fn staging_failures_share_upload_label() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/tmp/uploads/x.uploading");
        let (_, body, raw) = body_of(AppError::Io(io)).await;
        assert_eq!(body["message"], "Upload error");
        assert!(!raw.contains("uploading"));
    }

    #[test]
    fn missing_lookup_becomes_not_found() {
        let found: Option<i32> = Some(3);
        assert_eq!(found.ok_or_not_found("Employee not found").unwrap(), 3);

        let missing: Option<i32> = None;
        assert!(matches!(
            missing.ok_or_not_found("Employee not found"),
            Err(AppError::NotFound(msg)) if msg == "Employee not found"
        ));
    }

    #[test]
    fn empty_rows_become_not_found() {
        assert!(matches!(
            non_empty(Vec::<i32>::new(), "No events found"),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(non_empty(vec![1, 2], "No events found").unwrap(), vec![1, 2]);
    }
}
