//! Client navigation errors

use thiserror::Error;

/// Errors raised while navigating or hydrating
///
/// `Clone` so one in-flight result can be handed to every coalesced caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request could not be sent or its body not read
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Server answered {status} for {target}")]
    Status { status: u16, target: String },

    /// A payload identifier has no client-side component
    #[error("Component not registered on the client: {id}")]
    ComponentNotRegistered { id: String },

    /// The swap point is not mounted in the current document
    #[error("Swap point '{swap_point}' is not mounted")]
    SwapTarget { swap_point: String },

    /// The markup does not have the structure the payload describes
    #[error("Hydration mismatch at '{id}': {reason}")]
    HydrationMismatch { id: String, reason: String },

    /// A response or bootstrap record could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The navigation was superseded by a newer one
    #[error("Navigation cancelled")]
    Cancelled,
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Short category name used as a structured field when logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::ComponentNotRegistered { .. } => "component_not_registered",
            Self::SwapTarget { .. } => "swap_target",
            Self::HydrationMismatch { .. } => "hydration_mismatch",
            Self::Decode(_) => "decode",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the client should recover with a full page load
    pub fn needs_reload(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
