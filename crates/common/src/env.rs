//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::debug;

/// Ensure the parent directory of `file` exists, creating it if needed.
/// A bare file name lives in the working directory and needs nothing.
pub async fn ensure_parent_dir(file: &Path) -> anyhow::Result<()> {
    let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    debug!(dir = %parent.display(), "data directory ready");
    Ok(())
}

/// First non-empty value among the given environment variables.
pub fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}
