use movie_info::{UpstreamError, DEFAULT_PROVIDER_ERROR};
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for failures whose cause stays in the server log.
pub const GENERIC_FAILURE: &str = "Server Error";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad client input, detected before any upstream call.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Upstream(UpstreamError::NotFound(_)) => Status::BadRequest,
            ApiError::Upstream(UpstreamError::Transport(code)) if (100..600).contains(code) => {
                Status::new(*code)
            }
            ApiError::Upstream(UpstreamError::Transport(_)) => Status::BadGateway,
            ApiError::Upstream(UpstreamError::Network(_) | UpstreamError::Decode(_)) => {
                Status::InternalServerError
            }
        }
    }

    /// The message the caller gets to see.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            ApiError::Upstream(UpstreamError::NotFound(message)) => message.clone(),
            ApiError::Upstream(UpstreamError::Transport(_)) => DEFAULT_PROVIDER_ERROR.to_string(),
            ApiError::Upstream(UpstreamError::Network(_) | UpstreamError::Decode(_)) => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            log::error!("{} {} failed: {}", request.method(), request.uri(), self);
        } else {
            log::warn!("{} {} rejected: {}", request.method(), request.uri(), self);
        }
        (status, Json(ErrorBody::new(self.public_message()))).respond_to(request)
    }
}
