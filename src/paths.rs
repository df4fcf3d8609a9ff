use std::path::PathBuf;

/// Returns the data root directory.
///
/// Resolution order:
/// 1. `INTERVENE_ROOT` environment variable (if set)
/// 2. Current working directory + `.intervene`
pub fn intervene_root() -> PathBuf {
    if let Ok(root) = std::env::var("INTERVENE_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".intervene")
    }
}
