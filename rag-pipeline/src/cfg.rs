//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TOP_K: u64 = 3;
pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIEVE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 60;

/// Fixed per-deployment knobs of the query pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of passages requested from the index. Always `>= 1`.
    pub top_k: u64,
    pub embed_timeout: Duration,
    pub retrieve_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embed_timeout: Duration::from_secs(DEFAULT_EMBED_TIMEOUT_SECS),
            retrieve_timeout: Duration::from_secs(DEFAULT_RETRIEVE_TIMEOUT_SECS),
            generate_timeout: Duration::from_secs(DEFAULT_GENERATE_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables with defaults.
    ///
    /// - `RAG_TOP_K` (default 3)
    /// - `EMBED_TIMEOUT_SECS` (default 30)
    /// - `RETRIEVE_TIMEOUT_SECS` (default 15)
    /// - `GENERATE_TIMEOUT_SECS` (default 60)
    ///
    /// # Errors
    /// Unparsable numbers and zero values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
    }

    pub(crate) fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            top_k: positive(get, "RAG_TOP_K", DEFAULT_TOP_K)?,
            embed_timeout: Duration::from_secs(positive(
                get,
                "EMBED_TIMEOUT_SECS",
                DEFAULT_EMBED_TIMEOUT_SECS,
            )?),
            retrieve_timeout: Duration::from_secs(positive(
                get,
                "RETRIEVE_TIMEOUT_SECS",
                DEFAULT_RETRIEVE_TIMEOUT_SECS,
            )?),
            generate_timeout: Duration::from_secs(positive(
                get,
                "GENERATE_TIMEOUT_SECS",
                DEFAULT_GENERATE_TIMEOUT_SECS,
            )?),
        })
    }
}

fn positive(
    get: &dyn Fn(&str) -> Option<String>,
    var: &'static str,
    dflt: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = get(var) else {
        return Ok(dflt);
    };
    let n: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value: raw.clone() })?;
    if n == 0 {
        return Err(ConfigError::Zero { var });
    }
    Ok(n)
}
