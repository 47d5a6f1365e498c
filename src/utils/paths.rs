use std::borrow::Cow;
use std::env;
use std::path::Path;

use anyhow::{Result, bail};

/// Maximum transcript size: 256MB
pub const MAX_TRANSCRIPT_BYTES: u64 = 256 * 1024 * 1024;

/// Final segment of a bundle entry name
///
/// Bundle entries use `/` separators, but archives created on Windows may carry `\`.
///
/// # Examples
///
/// ```
/// use chat_export_explorer::utils::basename;
///
/// assert_eq!(basename("WhatsApp Chat/IMG_001.jpg"), "IMG_001.jpg");
/// assert_eq!(basename("media\\voice.opus"), "voice.opus");
/// assert_eq!(basename("_chat.txt"), "_chat.txt");
/// ```
pub fn basename(entry_name: &str) -> &str {
    entry_name.rsplit(['/', '\\']).next().unwrap_or(entry_name)
}

/// Validates that a bundle entry name is a safe relative path
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The name is absolute (leading `/` or `\`, or a drive prefix like `C:`)
/// - Any segment is `..` (path traversal)
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Entry name is empty");
    }

    if name.starts_with(['/', '\\']) || name.get(1..2) == Some(":") {
        bail!("Entry name must be relative: {}", name);
    }

    if name.split(['/', '\\']).any(|segment| segment == "..") {
        bail!("Entry name contains '..' component: {}", name);
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
