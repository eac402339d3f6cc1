use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dataset::DatasetError;
use engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Problems with the data itself are the client's to see; everything
    /// else is a server fault.
    fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(EngineError::Load(err)) => match err {
                DatasetError::MissingColumns { .. }
                | DatasetError::AmbiguousProfile { .. }
                | DatasetError::InvalidCell { .. }
                | DatasetError::Empty(_)
                | DatasetError::UnsupportedFormat(_)
                | DatasetError::SheetNotFound { .. }
                | DatasetError::Csv(_)
                | DatasetError::Spreadsheet(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DatasetError::FileNotFound(_) | DatasetError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Engine(EngineError::AlertRule(_)) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed.");
        } else {
            tracing::warn!(error = %self, "Dataset rejected.");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn data_problems_are_unprocessable() {
        let err = AppError::from(EngineError::Load(DatasetError::MissingColumns {
            path: PathBuf::from("df.csv"),
            columns: vec!["Data".into()],
        }));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_file_is_a_server_fault() {
        let err = AppError::from(EngineError::Load(DatasetError::FileNotFound(PathBuf::from(
            "df.xlsx",
        ))));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
