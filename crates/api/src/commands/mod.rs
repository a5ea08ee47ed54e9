//! CLI commands over the [`AppContext`](crate::AppContext).

mod parse;

pub use parse::{parse_args, parse_query_pair, Command};

use serde_json::json;

use crate::AppContext;

/// Execute `command` and render its result as pretty JSON.
///
/// # Errors
/// Propagates input validation failures from the context.
pub fn run_command(context: &AppContext, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::Whoami => serde_json::to_value(context.identity())?,
        Command::InitLogin { max_length, suffix } => {
            let login = context.init_login(max_length, suffix.as_deref())?;
            json!({ "login": login })
        }
        Command::SetPassword { password } => {
            context.set_password(&password)?;
            json!({ "password_set": true })
        }
        Command::SetServer { url } => {
            context.set_server(&url)?;
            json!({ "server": context.credentials.server().base_url })
        }
        Command::Request(request) => serde_json::to_value(context.request(&request))?,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
