//! Response envelope shared by the server and the remote client

use crate::error::{ErrorKind, SeekerError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Every endpoint answers `{"meta": {...}, "contents": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<T>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn contents(contents: T) -> Self {
        Self {
            meta: None,
            contents: Some(contents),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.meta.get_or_insert_with(Meta::default).warning = Some(warning.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            meta: Some(Meta {
                message: Some(message.into()),
                ..Meta::default()
            }),
            contents: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            meta: Some(Meta {
                error: Some(error.into()),
                ..Meta::default()
            }),
            contents: None,
        }
    }
}

/// Server build information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub bosh_configured: bool,
}

/// A seeker error on its way out as an HTTP response
pub struct ApiError(pub SeekerError);

impl From<SeekerError> for ApiError {
    fn from(err: SeekerError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &SeekerError) -> StatusCode {
    match err.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::error(self.0.to_string()))).into_response()
    }
}
