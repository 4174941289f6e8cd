//! Stdin input utilities.

use std::io::{self, IsTerminal, Read};

/// Read list content from stdin if it is piped.
///
/// Returns `Ok(None)` when stdin is a terminal. Markdown is kept as given,
/// except that a single trailing newline is kept and any further trailing
/// blank lines are dropped.
pub fn read_stdin_content() -> Result<Option<String>, String> {
    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("reading stdin: {}", e))?;
    Ok(Some(normalize_trailing(&buffer)))
}

fn normalize_trailing(text: &str) -> String {
    let trimmed = text.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        String::new()
    } else if text.contains("\r\n") {
        format!("{}\r\n", trimmed)
    } else {
        format!("{}\n", trimmed)
    }
}
