//! Minimal CTCP support: ACTION framing and request detection.

const DELIM: char = '\x01';

/// Wrap `text` as a CTCP ACTION (`/me`).
pub fn action(text: &str) -> String {
    format!("{DELIM}ACTION {text}{DELIM}")
}

/// Build a CTCP reply body for a NOTICE.
pub fn reply(command: &str, params: &str) -> String {
    format!("{DELIM}{command} {params}{DELIM}")
}

/// Split a CTCP body into `(COMMAND, params)`.
///
/// Returns `None` for ordinary text. The closing delimiter is optional, as
/// some clients drop it.
pub fn parse(text: &str) -> Option<(&str, Option<&str>)> {
    let body = text.strip_prefix(DELIM)?;
    let body = body.strip_suffix(DELIM).unwrap_or(body);
    if body.is_empty() {
        return None;
    }
    Some(match body.split_once(' ') {
        Some((command, params)) => (command, Some(params)),
        None => (body, None),
    })
}
