//! Classified results of authenticated calls

use serde::{Deserialize, Serialize};

use crate::constants::{LEGACY_INVALID_PASSWORD, LEGACY_IO_EXCEPTION, LEGACY_MISSING_PASSWORD};

/// Classified result of one HTTP round trip.
///
/// Derived from the raw status plus the credential state at the time the
/// request was sent. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    Success(u16),
    /// 401 while no password was held.
    MissingCredential,
    /// 401 while a password was held.
    InvalidCredential,
    OtherHttpStatus(u16),
    /// No connectivity, I/O failure, or a connection that could not be set up.
    TransportError,
}

impl RequestOutcome {
    /// Whether the outcome triggers the one-shot retry.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Integer contract used by older clients: 1 missing password, 2 invalid
    /// password, 3 I/O failure, otherwise the HTTP status.
    pub fn legacy_code(&self) -> i32 {
        match self {
            Self::Success(code) | Self::OtherHttpStatus(code) => i32::from(*code),
            Self::MissingCredential => LEGACY_MISSING_PASSWORD,
            Self::InvalidCredential => LEGACY_INVALID_PASSWORD,
            Self::TransportError => LEGACY_IO_EXCEPTION,
        }
    }
}

/// State of the retry protocol for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryState {
    Initial,
    Retried,
}

/// What a logical call reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The first attempt was final.
    Completed { outcome: RequestOutcome },
    /// The first attempt failed authentication and was re-sent once.
    /// `status` is the raw status of the second attempt, `None` if the
    /// second attempt never produced a response.
    Retried { initial: RequestOutcome, status: Option<u16> },
}

impl CallOutcome {
    pub fn state(&self) -> RetryState {
        match self {
            Self::Completed { .. } => RetryState::Initial,
            Self::Retried { .. } => RetryState::Retried,
        }
    }

    /// HTTP status of the response the caller ends up holding, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Completed { outcome } => match outcome {
                RequestOutcome::Success(code) | RequestOutcome::OtherHttpStatus(code) => {
                    Some(*code)
                }
                RequestOutcome::MissingCredential | RequestOutcome::InvalidCredential => Some(401),
                RequestOutcome::TransportError => None,
            },
            Self::Retried { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(200)
    }

    /// Same contract as [`RequestOutcome::legacy_code`]; a retried call
    /// reports the raw status of the second attempt.
    pub fn legacy_code(&self) -> i32 {
        match self {
            Self::Completed { outcome } => outcome.legacy_code(),
            Self::Retried { status: Some(code), .. } => i32::from(*code),
            Self::Retried { status: None, .. } => LEGACY_IO_EXCEPTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes_match_integer_contract() {
        assert_eq!(RequestOutcome::Success(200).legacy_code(), 200);
        assert_eq!(RequestOutcome::MissingCredential.legacy_code(), 1);
        assert_eq!(RequestOutcome::InvalidCredential.legacy_code(), 2);
        assert_eq!(RequestOutcome::TransportError.legacy_code(), 3);
        assert_eq!(RequestOutcome::OtherHttpStatus(503).legacy_code(), 503);
    }

    #[test]
    fn retried_call_reports_raw_second_status() {
        let call = CallOutcome::Retried { initial: RequestOutcome::InvalidCredential, status: Some(401) };
        assert_eq!(call.state(), RetryState::Retried);
        assert_eq!(call.status(), Some(401));
        assert_eq!(call.legacy_code(), 401);
        assert!(!call.is_success());
    }

    #[test]
    fn completed_call_keeps_classification() {
        let call = CallOutcome::Completed { outcome: RequestOutcome::TransportError };
        assert_eq!(call.state(), RetryState::Initial);
        assert_eq!(call.status(), None);
        assert_eq!(call.legacy_code(), 3);
    }

    #[test]
    fn only_credential_failures_trigger_retry() {
        assert!(RequestOutcome::MissingCredential.is_auth_failure());
        assert!(RequestOutcome::InvalidCredential.is_auth_failure());
        assert!(!RequestOutcome::OtherHttpStatus(403).is_auth_failure());
        assert!(!RequestOutcome::TransportError.is_auth_failure());
    }
}
