use std::path::{Path, PathBuf};

pub const SESSION_DIR: [&str; 2] = [".assistant", "sessions"];

/// Directory holding named session files under a chosen root.
#[must_use]
pub fn session_root(root: &Path) -> PathBuf {
    root.join(SESSION_DIR[0]).join(SESSION_DIR[1])
}

#[must_use]
pub fn session_file_name(name: &str) -> String {
    format!("{name}.json")
}

/// Session names become file stems; restrict them accordingly.
#[must_use]
pub fn is_valid_session_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
