//! Joins the stored server URL with a route and query parameters

use hauth_domain::{HauthError, QueryParams, Result};
use serde_json::Value;
use url::Url;

/// Build the request URL.
///
/// The route is split on `/` with empty segments dropped, so doubled
/// separators collapse; each segment is percent-encoded. Query parameters
/// keep their insertion order. `null` values are skipped.
///
/// # Errors
/// Returns `HauthError::Config` when `base` is not an absolute URL that can
/// carry a path.
pub fn build_url(base: &str, route: &str, query: &QueryParams) -> Result<Url> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| HauthError::Config(format!("Invalid server URL {base:?}: {e}")))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| HauthError::Config(format!("Server URL cannot carry a path: {base}")))?;
        segments.pop_if_empty();
        segments.extend(route.split('/').filter(|segment| !segment.is_empty()));
    }

    let pairs: Vec<(&str, String)> = query
        .iter()
        .filter_map(|(key, value)| query_value(value).map(|value| (key.as_str(), value)))
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}
