// src/handlers/error.rs
use std::fmt;
use warp::reject::Reject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operator-facing misconfiguration: missing secret, unknown
    /// jurisdiction, malformed intel file.
    Config,
    /// Vault persistence failure; non-fatal for the edit itself.
    Persist,
    /// External collaborator (BankLink, LLM, rates feed) failure.
    Integration,
    /// Pro-gated analysis requested by a non-pro user.
    Entitlement,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn config_error(message: impl Into<String>) -> Self {
        ApiError { kind: ErrorKind::Config, message: message.into() }
    }

    pub fn persist_error(message: impl Into<String>) -> Self {
        ApiError { kind: ErrorKind::Persist, message: message.into() }
    }

    pub fn integration_error(message: impl Into<String>) -> Self {
        ApiError { kind: ErrorKind::Integration, message: message.into() }
    }

    pub fn entitlement_error(message: impl Into<String>) -> Self {
        ApiError { kind: ErrorKind::Entitlement, message: message.into() }
    }

    pub fn status(&self) -> warp::http::StatusCode {
        match self.kind {
            ErrorKind::Config | ErrorKind::Persist => {
                warp::http::StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorKind::Integration => warp::http::StatusCode::BAD_GATEWAY,
            ErrorKind::Entitlement => warp::http::StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
