//! Index configuration.
//!
//! Loaded from JSON. Every field has a default, so an empty object is a
//! valid configuration:
//!
//! ```json
//! {
//!   "default_similarity": 1.0,
//!   "indexed_similarities": [1.0, 0.75],
//!   "index_type": "PREDICATES",
//!   "failure_policy": "mark-cannot-index",
//!   "stale_claim_secs": 3600
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::index::FailurePolicy;
use crate::model::IndexType;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Similarity used when a query does not name one.
    pub default_similarity: f64,
    /// Thresholds every task label is indexed at.
    pub indexed_similarities: Vec<f64>,
    pub index_type: IndexType,
    /// What the scheduler does with a net whose build failed.
    pub failure_policy: FailurePolicy,
    /// Age after which an INDEXING claim is considered abandoned.
    pub stale_claim_secs: i64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_similarity: 1.0,
            indexed_similarities: vec![1.0],
            index_type: IndexType::Predicates,
            failure_policy: FailurePolicy::MarkCannotIndex,
            stale_claim_secs: 3600,
        }
    }
}

impl IndexConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        validate_thresholds(&self.indexed_similarities)?;
        if !in_range(self.default_similarity) {
            return Err(Error::Config(format!(
                "default_similarity {} outside (0, 1]",
                self.default_similarity
            )));
        }
        if self.stale_claim_secs <= 0 {
            return Err(Error::Config("stale_claim_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn stale_claim_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_claim_secs)
    }
}

fn in_range(s: f64) -> bool {
    s > 0.0 && s <= 1.0
}

/// Indexed thresholds must be non-empty and lie in `(0, 1]`. NaN is rejected.
pub(crate) fn validate_thresholds(similarities: &[f64]) -> Result<()> {
    if similarities.is_empty() {
        return Err(Error::Config("indexed_similarities must not be empty".into()));
    }
    if let Some(bad) = similarities.iter().find(|s| !in_range(**s)) {
        return Err(Error::Config(format!("similarity threshold {bad} outside (0, 1]")));
    }
    Ok(())
}
