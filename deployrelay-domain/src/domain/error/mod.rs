#[cfg(feature = "axum-error")]
pub mod axum_error;

use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use strum::AsRefStr;
use thiserror::Error as ThisError;

/// Errors caused by the caller: a bad signature or an unusable body.
#[derive(ThisError, Debug, Clone, Hash, Eq, PartialEq, Serialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "PascalCase")]
pub enum ApplicationError {
    #[error("Unauthorized: {}", .message)]
    Unauthorized {
        message: String,
        subtype: Option<String>,
    },
    #[error("Bad Request: {}", .message)]
    BadRequest {
        message: String,
        subtype: Option<String>,
    },
}

impl ApplicationError {
    pub fn unauthorized(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Application(ApplicationError::Unauthorized {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }

    pub fn bad_request(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Application(ApplicationError::BadRequest {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }

    fn message(&self) -> &str {
        match self {
            ApplicationError::Unauthorized { message, .. }
            | ApplicationError::BadRequest { message, .. } => message,
        }
    }
}

/// Errors raised while the relay itself is doing work: upstream calls,
/// configuration and local IO.
#[derive(ThisError, Debug, Clone, Hash, Eq, PartialEq, Serialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "PascalCase")]
pub enum InternalError {
    #[error("Upstream call failed: {}", .message)]
    UpstreamFailure {
        message: String,
        subtype: Option<String>,
    },
    #[error("Configuration error: {}", .message)]
    ConfigurationError {
        message: String,
        subtype: Option<String>,
    },
    #[error("An error while performing an IO operation: {}", .message)]
    IOErr {
        message: String,
        subtype: Option<String>,
    },
    #[error("Serialization error: {}", .message)]
    SerializeError {
        message: String,
        subtype: Option<String>,
    },
}

impl InternalError {
    pub fn upstream(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Internal(InternalError::UpstreamFailure {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }

    pub fn configuration_error(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Internal(InternalError::ConfigurationError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }

    pub fn io_err(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Internal(InternalError::IOErr {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }

    pub fn serialize_error(message: &str, subtype: Option<&str>) -> RelayError {
        RelayError::Internal(InternalError::SerializeError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        })
    }
}

#[derive(ThisError, Clone, Hash, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelayError {
    #[error(transparent)]
    Internal(InternalError),
    #[error(transparent)]
    Application(ApplicationError),
}

impl RelayError {
    pub fn status(&self) -> u16 {
        StatusCode::from(self).as_u16()
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RelayError::Internal(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, RelayError::Application(_))
    }

    /// Body returned to HTTP callers. Internal details stay in the logs.
    pub fn as_json(&self) -> Value {
        match self {
            RelayError::Application(e) => json!({ "error": e.message() }),
            RelayError::Internal(_) => json!({ "error": "Internal server error" }),
        }
    }
}

impl AsRef<str> for RelayError {
    fn as_ref(&self) -> &str {
        match self {
            RelayError::Internal(e) => e.as_ref(),
            RelayError::Application(e) => e.as_ref(),
        }
    }
}

impl Debug for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RelayError::Internal(e) => write!(f, "{e:?}"),
            RelayError::Application(e) => write!(f, "{e:?}"),
        }
    }
}

impl From<&RelayError> for StatusCode {
    fn from(error: &RelayError) -> Self {
        match error {
            RelayError::Application(ApplicationError::Unauthorized { .. }) => {
                StatusCode::UNAUTHORIZED
            }
            RelayError::Application(ApplicationError::BadRequest { .. }) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast_ref::<RelayError>() {
            Some(relay_error) => relay_error.clone(),
            None => InternalError::io_err(&error.to_string(), None),
        }
    }
}
