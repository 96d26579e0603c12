use std::path::PathBuf;
use std::sync::OnceLock;

static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Sets the data root directory for the store layer.
///
/// # Logic
/// 1. Store the path in the process-wide slot.
/// 2. Later calls are ignored; the first one wins.
pub fn set_root_dir(path: PathBuf) {
    if ROOT_DIR.set(path).is_err() {
        tracing::debug!("Store root directory already set, keeping the first one");
    }
}

/// Data root directory, `"data"` when never set.
pub(crate) fn get_root_dir() -> PathBuf {
    ROOT_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"))
}
