// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Runtime configuration, sourced from the environment variables fixed by
//! §6: `ML_SERVICE_URL`, `ML_TIMEOUT_MS`, `LOG_LEVEL`, `RULES_DIR`,
//! `STORE_URI`, `WORKER_COUNT`. Layered through the `config` crate so a
//! config file can supply defaults that environment variables override.

use std::time::Duration;

use merchant_pipeline_domain::error::{CoreError, CoreResult};
use serde::Deserialize;

fn default_worker_count() -> usize {
    4
}

fn default_rules_dir() -> String {
    "./rules".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ml_timeout_ms() -> u64 {
    5_000
}

/// The process's runtime configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ml_service_url: Option<String>,
    #[serde(default = "default_ml_timeout_ms")]
    pub ml_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_rules_dir")]
    pub rules_dir: String,
    #[serde(default)]
    pub store_uri: Option<String>,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ml_service_url: None,
            ml_timeout_ms: default_ml_timeout_ms(),
            log_level: default_log_level(),
            rules_dir: default_rules_dir(),
            store_uri: None,
            worker_count: default_worker_count(),
        }
    }
}

impl AppConfig {
    pub fn ml_timeout(&self) -> Duration {
        Duration::from_millis(self.ml_timeout_ms)
    }

    /// Loads config from an optional file (TOML, YAML, or JSON, by
    /// extension), then applies the bare environment variable names fixed
    /// by §6, which take precedence over both the file and the defaults.
    pub fn load(config_file: Option<&str>) -> CoreResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let built = builder.build().map_err(|e| CoreError::ConfigurationError { message: e.to_string() })?;
        let mut config: AppConfig = if built.collect().map(|m| m.is_empty()).unwrap_or(true) {
            AppConfig::default()
        } else {
            built
                .try_deserialize()
                .map_err(|e| CoreError::ConfigurationError { message: e.to_string() })?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ML_SERVICE_URL") {
            self.ml_service_url = Some(v);
        }
        if let Ok(v) = std::env::var("ML_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse() {
                self.ml_timeout_ms = parsed;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Ok(v) = std::env::var("RULES_DIR") {
            self.rules_dir = v;
        }
        if let Ok(v) = std::env::var("STORE_URI") {
            self.store_uri = Some(v);
        }
        if let Ok(v) = std::env::var("WORKER_COUNT") {
            if let Ok(parsed) = v.parse() {
                self.worker_count = parsed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let config = AppConfig::default();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.ml_timeout_ms, 5_000);
        assert_eq!(config.log_level, "info");
    }
}
