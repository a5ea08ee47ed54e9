//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use hauth_domain::HauthError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HauthError);

impl From<InfraError> for HauthError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HauthError> for InfraError {
    fn from(value: HauthError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoHauthError {
    fn into_hauth(self) -> HauthError;
}

/// Wrap an I/O failure with the operation that produced it.
///
/// Callers pick the variant: file storage reports `Storage`, process and
/// sysfs access report `Platform`.
pub fn map_io_error(
    operation: &str,
    err: &IoError,
    variant: fn(String) -> HauthError,
) -> HauthError {
    variant(format!("{operation} failed ({:?}): {err}", err.kind()))
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → HauthError */
/* -------------------------------------------------------------------------- */

impl IntoHauthError for KeyringError {
    fn into_hauth(self) -> HauthError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        match self {
            NoEntry => HauthError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                HauthError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => HauthError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                HauthError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => HauthError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => HauthError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                HauthError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => HauthError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_hauth())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HauthError */
/* -------------------------------------------------------------------------- */

impl IntoHauthError for HttpError {
    fn into_hauth(self) -> HauthError {
        if self.is_timeout() {
            return HauthError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return HauthError::Transport("HTTP connection failure".into());
        }

        if self.is_builder() {
            return HauthError::Internal(format!("HTTP client misconfigured: {self}"));
        }

        HauthError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_hauth())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io / serde_json → HauthError */
/* -------------------------------------------------------------------------- */

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(map_io_error("storage i/o", &value, HauthError::Storage))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(HauthError::Storage(format!("malformed store document: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
