//! Terminal output sanitization
//!
//! Message text comes straight from an untrusted export. Before the CLI prints it, ANSI
//! escape sequences and control characters are removed so a crafted transcript cannot move
//! the cursor, clear the screen or recolor the terminal.

use std::borrow::Cow;

fn needs_sanitizing(text: &str) -> bool {
    text.chars().any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
}

/// Remove ANSI CSI sequences (`ESC [ ... letter`) and control characters other than
/// tab and newline. Text without control characters is returned borrowed.
///
/// # Examples
///
/// ```
/// use chat_export_explorer::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mhi\x1b[0m"), "hi");
/// assert_eq!(sanitize_for_terminal("plain"), "plain");
/// ```
pub fn sanitize_for_terminal(text: &str) -> Cow<'_, str> {
    if !needs_sanitizing(text) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' {
            continue;
        }

        result.push(ch);
    }

    Cow::Owned(result)
}
