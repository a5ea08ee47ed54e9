//! Argument parsing for the `hauth` binary.

use std::str::FromStr;

use hauth_domain::{ApiRequest, HauthError, HttpMethod, QueryParams, Result};
use serde_json::Value;

pub const USAGE: &str = "\
USAGE:
    hauth <COMMAND>

COMMANDS:
    whoami                                   Show serial, login, server and password state
    init-login [max] [suffix]                Derive the login from the device serial
    set-password <password>                  Provision the password
    set-server <url>                         Replace the server base URL
    request <METHOD> <route> [body] [k=v..]  Perform one authenticated call";

/// One parsed invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Whoami,
    InitLogin { max_length: Option<usize>, suffix: Option<String> },
    SetPassword { password: String },
    SetServer { url: String },
    Request(ApiRequest),
}

/// Parse the arguments that follow the program name.
///
/// # Errors
/// Returns `HauthError::InvalidInput` carrying the usage text for unknown
/// commands or malformed arguments.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        return Err(usage("missing command"));
    };

    match name.as_str() {
        "whoami" => Ok(Command::Whoami),
        "init-login" => {
            let max_length = rest
                .first()
                .map(|raw| raw.parse::<usize>().map_err(|e| usage(&format!("invalid max length: {e}"))))
                .transpose()?;
            Ok(Command::InitLogin { max_length, suffix: rest.get(1).cloned() })
        }
        "set-password" => {
            let password = rest.first().ok_or_else(|| usage("set-password needs a value"))?;
            Ok(Command::SetPassword { password: password.clone() })
        }
        "set-server" => {
            let url = rest.first().ok_or_else(|| usage("set-server needs a URL"))?;
            Ok(Command::SetServer { url: url.clone() })
        }
        "request" => parse_request(rest).map(Command::Request),
        other => Err(usage(&format!("unknown command: {other}"))),
    }
}

fn parse_request(args: &[String]) -> Result<ApiRequest> {
    let (Some(method), Some(route)) = (args.first(), args.get(1)) else {
        return Err(usage("request needs a method and a route"));
    };

    let mut request = ApiRequest::new(HttpMethod::from_str(method)?, route.clone());
    let mut rest = &args[2..];

    if let Some((first, tail)) = rest.split_first() {
        if !first.contains('=') || first.trim_start().starts_with(['{', '[']) {
            request = request.with_body(first.clone());
            rest = tail;
        }
    }

    let query = rest.iter().map(|pair| parse_query_pair(pair)).collect::<Result<QueryParams>>()?;
    Ok(request.with_query_params(query))
}

/// Split `key=value`; the value is taken as JSON when it parses, otherwise
/// as a plain string.
///
/// # Errors
/// Returns `HauthError::InvalidInput` when there is no `=` or the key is empty.
pub fn parse_query_pair(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| usage(&format!("expected key=value, got {pair:?}")))?;

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn usage(reason: &str) -> HauthError {
    HauthError::InvalidInput(format!("{reason}\n\n{USAGE}"))
}
