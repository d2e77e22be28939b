use crate::models::api::ErrorResponse;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::Request;
use std::io;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Log entry {id} not found")]
    NotFound { id: i64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open database '{path}': {cause}")]
    DatabaseConnection { path: String, cause: r2d2::Error },

    #[error("Database query failed for '{operation}': {cause}")]
    DatabaseQuery {
        operation: String,
        cause: rusqlite::Error,
    },

    #[error("Failed to serialize {field}: {cause}")]
    Serialization {
        field: String,
        cause: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl LogError {
    /// Shorthand for wrapping a rusqlite error with the operation that produced it
    pub fn query(operation: &str) -> impl FnOnce(rusqlite::Error) -> LogError + '_ {
        move |cause| LogError::DatabaseQuery {
            operation: operation.to_string(),
            cause,
        }
    }

    /// HTTP status this error is surfaced as
    pub fn status(&self) -> Status {
        match self {
            LogError::NotFound { .. } => Status::NotFound,
            LogError::InvalidRequest(_) => Status::BadRequest,
            _ => Status::InternalServerError,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            LogError::NotFound { .. } => "not_found",
            LogError::InvalidRequest(_) => "invalid_request",
            _ => "storage_fault",
        }
    }
}

impl<'r> Responder<'r, 'static> for LogError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            log::error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details: Some(self.to_string()),
        };
        let json = serde_json::to_string(&body).map_err(|_| Status::InternalServerError)?;

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
