pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{CACHE_DIR_ENV, get_cache_root};
pub use paths::{MAX_TRANSCRIPT_BYTES, basename, format_path_with_tilde, validate_entry_name};
pub use terminal::sanitize_for_terminal;
