use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{
    auth::{jwt::TokenError, repo::CredentialError},
    expenses::repo::LedgerError,
};

/// Request-boundary error. Every handler failure ends up here and is
/// turned into a status code plus a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access token required")]
    NoToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Expense not found")]
    NotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail | AppError::InvalidCredentials | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NoToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::ExpiredToken => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Invalid and expired tokens share a code so clients only learn "forbidden".
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NoToken => "no_token",
            AppError::InvalidToken | AppError::ExpiredToken => "forbidden",
            AppError::NotFound => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code(),
        });
        (status, body).into_response()
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::DuplicateEmail => AppError::DuplicateEmail,
            CredentialError::InvalidCredentials => AppError::InvalidCredentials,
            e @ (CredentialError::Hashing(_) | CredentialError::Worker(_)) => {
                AppError::Internal(e.into())
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::InvalidToken,
            TokenError::Expired => AppError::ExpiredToken,
            TokenError::Signing(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound => AppError::NotFound,
        }
    }
}
