//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::transcode::TranscodeError;

/// An error ready to be returned from a route handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (self.status, self.message).into_response()
    }
}

impl From<TranscodeError> for ApiError {
    fn from(err: TranscodeError) -> Self {
        let status = match &err {
            TranscodeError::Spec(_) => StatusCode::BAD_REQUEST,
            TranscodeError::SourceNotFound(_) => StatusCode::NOT_FOUND,
            TranscodeError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TranscodeError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            TranscodeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<loopcast_av::Error> for ApiError {
    fn from(err: loopcast_av::Error) -> Self {
        let status = match &err {
            loopcast_av::Error::FileNotFound { .. } => StatusCode::NOT_FOUND,
            loopcast_av::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}
