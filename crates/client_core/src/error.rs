use shared::domain::ShipmentNumber;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{resource} not found")]
    NotFound { resource: String },
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("backend error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Backend { status: u16, message: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("unreadable backend response: {0}")]
    Decode(String),
    #[error("{action} already in progress for despacho {numero}")]
    ActionInFlight {
        numero: ShipmentNumber,
        action: &'static str,
    },
    #[error("selection of despacho {numero} was superseded")]
    Superseded { numero: ShipmentNumber },
}

impl ClientError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message shown to the user. Backend payloads are passed through
    /// verbatim; everything else is prefixed with `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Backend { message: None, .. } => fallback.to_string(),
            other => format!("{fallback}: {other}"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Backend {
                status: status.as_u16(),
                message: None,
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
