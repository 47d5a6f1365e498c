use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "CHAT_EXPORT_CACHE_DIR";

const APP_DIR_NAME: &str = "chat-export-explorer";

/// Root directory for the record cache
///
/// `$CHAT_EXPORT_CACHE_DIR` when set and non-empty, otherwise the platform cache directory:
/// - macOS: `~/Library/Caches/chat-export-explorer/`
/// - Linux: `~/.cache/chat-export-explorer/`
/// - Windows: `%LOCALAPPDATA%\chat-export-explorer\`
pub fn get_cache_root() -> Result<PathBuf> {
    if let Ok(dir) = env::var(CACHE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(base.join(APP_DIR_NAME))
}
