// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A file-based `RulesSource` (§6: "A directory of rule tables, one per
//! stage"). Each table is a JSON file named after its kind; a missing file
//! means that table is left empty rather than an error, since a freshly
//! bootstrapped `RULES_DIR` may not carry every table yet.

use std::path::PathBuf;

use async_trait::async_trait;
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::repositories::{RuleTableKind, RulesSource};

pub struct FileRulesSource {
    rules_dir: PathBuf,
}

impl FileRulesSource {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self { rules_dir: rules_dir.into() }
    }

    fn file_name(table: RuleTableKind) -> &'static str {
        match table {
            RuleTableKind::TypeDetector => "type_detector.json",
            RuleTableKind::Counterparty => "counterparty.json",
            RuleTableKind::Disambiguation => "disambiguation.json",
            RuleTableKind::MccTable => "mcc_table.json",
        }
    }
}

#[async_trait]
impl RulesSource for FileRulesSource {
    async fn load_raw(&self, table: RuleTableKind) -> CoreResult<Option<Vec<u8>>> {
        let path = self.rules_dir.join(Self::file_name(table));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::RuleLoadError { message: format!("reading {}: {e}", path.display()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_table_file_is_not_an_error() {
        let source = FileRulesSource::new("/nonexistent/rules/dir");
        let result = source.load_raw(RuleTableKind::TypeDetector).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn present_table_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("type_detector.json"), b"[]").unwrap();
        let source = FileRulesSource::new(dir.path());
        let result = source.load_raw(RuleTableKind::TypeDetector).await.unwrap();
        assert_eq!(result.as_deref(), Some(&b"[]"[..]));
    }
}
