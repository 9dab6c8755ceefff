//! Raw API request commands

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::cli::args::GlobalOptions;
use crate::cli::{AuthArgs, BodyArgs, CommandContext};
use crate::error::{Error, Result};
use crate::output;

/// HTTP verb for the raw request commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Run a raw request command
pub async fn run(
    opts: &GlobalOptions,
    verb: Verb,
    path: &str,
    body: Option<&BodyArgs>,
    auth: &AuthArgs,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let with_auth = auth.with_auth();

    let response: Value = match (verb, body) {
        (Verb::Get, _) => client.get(path, with_auth).await?,
        (Verb::Delete, _) => client.delete(path, with_auth).await?,
        (Verb::Post, Some(body)) if body.is_multipart() => {
            client.post_multipart(path, build_form(body)?, with_auth).await?
        }
        (Verb::Put, Some(body)) if body.is_multipart() => {
            client.put_multipart(path, build_form(body)?, with_auth).await?
        }
        (Verb::Post, body) => {
            let json = parse_json_body(body.and_then(|b| b.data.as_deref()))?;
            client.post(path, &json, with_auth).await?
        }
        (Verb::Put, body) => {
            let json = parse_json_body(body.and_then(|b| b.data.as_deref()))?;
            client.put(path, &json, with_auth).await?
        }
    };

    output::print_value(&response, ctx.format)
}

/// Parse `--data`, reading `@path` from disk. No data sends an empty object.
pub fn parse_json_body(data: Option<&str>) -> Result<Value> {
    let Some(data) = data else {
        return Ok(Value::Object(Default::default()));
    };

    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => data.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

/// Split a `name=value` pair.
fn split_pair<'a>(pair: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(Error::Other(format!(
            "{flag} expects name=value, got '{pair}'"
        ))),
    }
}

/// Build a multipart form from `--field` and `--file` arguments
pub fn build_form(body: &BodyArgs) -> Result<Form> {
    let mut form = Form::new();

    for pair in &body.field {
        let (name, value) = split_pair(pair, "--field")?;
        form = form.text(name.to_string(), value.to_string());
    }

    for pair in &body.file {
        let (name, path) = split_pair(pair, "--file")?;
        let bytes = std::fs::read(path)?;
        let file_name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        form = form.part(name.to_string(), Part::bytes(bytes).file_name(file_name));
    }

    Ok(form)
}
