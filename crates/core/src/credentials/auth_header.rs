//! Basic authentication header value

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// `"Basic " + base64(login ":" password)`, unwrapped standard alphabet.
pub fn basic_auth_header(login: &str, password: &str) -> String {
    let encoded = STANDARD.encode(format!("{login}:{password}"));
    format!("Basic {encoded}")
}
