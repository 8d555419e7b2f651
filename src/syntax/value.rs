//! Renders values as the markdown shown in hover popups.

use itertools::Itertools;

use super::{Body, Item, Token, TokenKind, Value};

/// Placeholder for a value that cannot be rendered.
pub const FAILED_VALUE: &str = "<failed to extract value>";

/// The text a token stands for: strings lose their quotes and heredocs
/// their header and closing anchor.
pub fn token_text(token: &Token) -> String {
    match token.kind {
        TokenKind::String => token.unquoted().to_string(),
        TokenKind::Heredoc => heredoc_body(&token.text),
        _ => token.text.clone(),
    }
}

fn heredoc_body(text: &str) -> String {
    let indented = text.starts_with("<<-");
    let mut lines: Vec<&str> = text.lines().skip(1).collect();
    // last line is the anchor
    lines.pop();

    if !indented {
        return lines.join("\n");
    }

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .join("\n")
}

/// Renders a value as markdown, indenting nested lines two spaces per `depth`.
pub fn render(value: &Value, depth: usize) -> String {
    match value {
        Value::Scalar(token) => format!("`{}`", token_text(token)),
        Value::List(list) if list.entries.is_empty() => "*empty list*".to_string(),
        Value::Map(map) if map.body.items.is_empty() => "*empty map*".to_string(),
        Value::List(list) => list
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = format!("{}{}.", "  ".repeat(depth), i + 1);
                match entry {
                    Value::Scalar(_) => format!("{prefix} {}", render(entry, depth)),
                    _ => format!("{prefix}\n{}", render(entry, depth + 1)),
                }
            })
            .join("\n"),
        Value::Map(map) => map
            .body
            .items
            .iter()
            .map(|item| render_entry(item, depth))
            .join("\n"),
    }
}

fn render_entry(item: &Item, depth: usize) -> String {
    let label = item.first_key().unwrap_or_default();
    let prefix = format!("{}- {label}:", "  ".repeat(depth));
    match &item.value {
        Some(value @ Value::Scalar(_)) => format!("{prefix} {}", render(value, depth)),
        Some(value) => format!("{prefix}\n{}", render(value, depth + 1)),
        None => format!("{prefix} {FAILED_VALUE}"),
    }
}

/// Renders the value of an item, or the failure placeholder when it has none.
pub fn render_item(item: &Item, depth: usize) -> String {
    match &item.value {
        Some(value) => render(value, depth),
        None => FAILED_VALUE.to_string(),
    }
}

/// The value of the first `name = ...` attribute directly inside `body`.
pub fn find_attribute<'a>(body: &'a Body, name: &str) -> Option<&'a Value> {
    body.items
        .iter()
        .find(|item| item.keys.len() == 1 && item.first_key() == Some(name))
        .and_then(|item| item.value.as_ref())
}
