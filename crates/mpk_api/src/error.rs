//! API error type and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use mpk_core::{MemberIdError, MemberServiceError, ProposalServiceError, RepoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload or member ids are invalid.
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else (poisoned lock, failed worker thread).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. } => code,
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=api status=error code={} error={}",
                self.code(),
                self
            );
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<MemberServiceError> for ApiError {
    fn from(value: MemberServiceError) -> Self {
        match value {
            MemberServiceError::Repo(err) => Self::Storage(err.to_string()),
        }
    }
}

impl From<ProposalServiceError> for ApiError {
    fn from(value: ProposalServiceError) -> Self {
        let code = match &value {
            ProposalServiceError::NotAnArray { .. } => "NOT_AN_ARRAY",
            ProposalServiceError::InsufficientMembers { .. } => "INSUFFICIENT_MEMBERS",
            ProposalServiceError::InvalidMemberId(err) => member_id_code(err),
            ProposalServiceError::Repo(err) => return Self::Storage(err.to_string()),
        };
        Self::BadRequest {
            code,
            message: value.to_string(),
        }
    }
}

fn member_id_code(err: &MemberIdError) -> &'static str {
    match err {
        MemberIdError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
        MemberIdError::IdentifierTooLarge { .. } => "IDENTIFIER_TOO_LARGE",
        MemberIdError::EmptyIdentifier { .. } => "EMPTY_IDENTIFIER",
        MemberIdError::NonNumericIdentifier { .. } => "NON_NUMERIC_IDENTIFIER",
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
