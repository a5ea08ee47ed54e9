//! Outcome classification
//!
//! | status | password empty | outcome |
//! |--------|----------------|---------|
//! | 200    | any            | `Success(200)` |
//! | 401    | yes            | `MissingCredential` |
//! | 401    | no             | `InvalidCredential` |
//! | other  | any            | `OtherHttpStatus(code)` |

use hauth_domain::RequestOutcome;

/// Classify a response status given whether the request went out without a password.
pub fn classify(status: u16, password_empty: bool) -> RequestOutcome {
    match status {
        200 => RequestOutcome::Success(200),
        401 if password_empty => RequestOutcome::MissingCredential,
        401 => RequestOutcome::InvalidCredential,
        other => RequestOutcome::OtherHttpStatus(other),
    }
}
