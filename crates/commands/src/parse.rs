/// A parsed command invocation, derived from message text and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First whitespace-delimited token after the prefix, case-folded.
    pub name: String,
    /// Remainder of the text, trimmed. Empty when absent.
    pub args: String,
}

/// Parse command text.
///
/// Returns `None` unless `text` is non-empty, starts with `prefix`, and
/// carries a command name after it.
#[must_use]
pub fn parse_command(text: &str, prefix: &str) -> Option<ParsedCommand> {
    let body = text.strip_prefix(prefix)?;
    let body = body.trim_start();

    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_lowercase(),
        args: args.to_string(),
    })
}
