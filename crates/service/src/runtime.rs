//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_data_dir` without depending directly on `common`.

use std::path::Path;

/// Ensure the directory holding the data file exists.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    common::env::ensure_parent_dir(data_file).await
}
