//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Configuration shared by the facade and the bundled adapters.
/// Every field is optional; the `effective_*` accessors apply defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RowmapConfig {
    /// Key column used when a record tags no primary key. Default: "id".
    pub default_id_column: Option<String>,
    /// Reader connections in a pooled adapter. Default: 2.
    pub read_pool_size: Option<usize>,
    /// Lock wait before a statement fails as busy. Default: 5000ms.
    pub busy_timeout_ms: Option<u64>,
    /// Tracing filter used when `RUST_LOG` is unset. Default: "info".
    pub log_level: Option<String>,
}

impl RowmapConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            ::tracing::warn!(error = %e, "rowmap: invalid config");
            Error::Config(e.to_string())
        })?;
        ::tracing::debug!(
            default_id_column = config.effective_default_id_column(),
            read_pool_size = config.effective_read_pool_size(),
            busy_timeout_ms = config.effective_busy_timeout_ms(),
            "rowmap: config loaded"
        );
        Ok(config)
    }

    pub fn effective_default_id_column(&self) -> &str {
        self.default_id_column.as_deref().unwrap_or("id")
    }

    pub fn effective_read_pool_size(&self) -> usize {
        match self.read_pool_size {
            Some(0) | None => 2,
            Some(n) => n,
        }
    }

    pub fn effective_busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5000)
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}
