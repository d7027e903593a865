// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers for end-to-end tests that exercise the compiled binary.

/// Path to the compiled `merchant-pipeline` binary.
///
/// Tries `CARGO_BIN_EXE_merchant-pipeline` first (set by `cargo test`), then
/// falls back to constructing the path from `CARGO_MANIFEST_DIR`.
pub fn get_pipeline_bin() -> String {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_merchant-pipeline") {
        return path;
    }

    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let mut bin_path = std::path::PathBuf::from(manifest_dir);
    bin_path.pop();
    bin_path.push("target");
    bin_path.push(if cfg!(debug_assertions) { "debug" } else { "release" });
    bin_path.push("merchant-pipeline");

    bin_path.to_str().expect("invalid UTF-8 in binary path").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_pipeline_bin_returns_nonempty_path() {
        assert!(!get_pipeline_bin().is_empty());
    }
}
