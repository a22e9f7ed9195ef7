//! Error kinds surfaced by the engine
//!
//! Every failure a caller can observe maps to exactly one [`ErrorKind`].
//! Validation failures are deterministic and never worth retrying;
//! `Unavailable` is the only kind that reports infrastructure trouble.

use crate::{ProfileId, SwapAction, SwapStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Cannot propose a swap to yourself: {0}")]
    SelfSwap(ProfileId),

    #[error("Recipient is not discoverable: {0}")]
    RecipientNotDiscoverable(ProfileId),

    #[error("Requester does not offer skill: {0}")]
    InvalidOfferedSkill(String),

    #[error("Recipient does not want skill: {0}")]
    InvalidWantedSkill(String),

    #[error("Member {actor} is not authorized to {action}")]
    NotAuthorized { actor: ProfileId, action: String },

    #[error("Cannot {action} a request that is {status}")]
    InvalidTransition {
        action: SwapAction,
        status: SwapStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, SwapError>;

impl SwapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::SelfSwap(_) => ErrorKind::SelfSwap,
            SwapError::RecipientNotDiscoverable(_) => ErrorKind::RecipientNotDiscoverable,
            SwapError::InvalidOfferedSkill(_) => ErrorKind::InvalidOfferedSkill,
            SwapError::InvalidWantedSkill(_) => ErrorKind::InvalidWantedSkill,
            SwapError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            SwapError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            SwapError::NotFound(_) => ErrorKind::NotFound,
            SwapError::InvalidInput(_) => ErrorKind::InvalidInput,
            SwapError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn not_authorized(actor: &ProfileId, action: impl Into<String>) -> Self {
        SwapError::NotAuthorized {
            actor: actor.clone(),
            action: action.into(),
        }
    }
}

/// Canonical error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SelfSwap,
    RecipientNotDiscoverable,
    InvalidOfferedSkill,
    InvalidWantedSkill,
    NotAuthorized,
    InvalidTransition,
    NotFound,
    InvalidInput,
    Unavailable,
}

impl ErrorKind {
    /// Only infrastructure failures can succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Unavailable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SelfSwap => "self_swap",
            ErrorKind::RecipientNotDiscoverable => "recipient_not_discoverable",
            ErrorKind::InvalidOfferedSkill => "invalid_offered_skill",
            ErrorKind::InvalidWantedSkill => "invalid_wanted_skill",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = SwapError::InvalidTransition {
            action: SwapAction::Complete,
            status: SwapStatus::Pending,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(err.to_string(), "Cannot complete a request that is pending");

        let err = SwapError::not_authorized(&ProfileId::from("p9"), "accept");
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(ErrorKind::Unavailable.is_retryable());
        assert!(!ErrorKind::InvalidTransition.is_retryable());
        assert!(!ErrorKind::SelfSwap.is_retryable());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::RecipientNotDiscoverable).unwrap();
        assert_eq!(json, "\"recipient_not_discoverable\"");
    }
}
