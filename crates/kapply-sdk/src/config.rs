use std::path::Path;

use kapply_merge::MergeConfig;
use serde::{Deserialize, Serialize};

use crate::annotation::LAST_APPLIED_ANNOTATION;
use crate::error::{SdkError, SdkResult};

/// Configuration for the apply workflow.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration:
///
/// ```toml
/// annotation_key = "dc.openebs.io/last-applied-state"
/// tolerate_corrupt_baseline = true
///
/// [merge]
/// merge_keys = ["containerPort", "port", "name", "uid", "ip"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Annotation holding the last-applied state.
    pub annotation_key: String,
    /// When `true`, an undecodable baseline is logged and treated as empty
    /// instead of failing the apply.
    pub tolerate_corrupt_baseline: bool,
    /// Merge engine settings.
    pub merge: MergeConfig,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            annotation_key: LAST_APPLIED_ANNOTATION.to_string(),
            tolerate_corrupt_baseline: true,
            merge: MergeConfig::default(),
        }
    }
}

impl ApplyConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> SdkResult<Self> {
        toml::from_str(input).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> SdkResult<()> {
        if self.annotation_key.trim().is_empty() {
            return Err(SdkError::Config("annotation_key must not be empty".into()));
        }
        if let Some(key) = self.merge.merge_keys.iter().find(|k| k.is_empty()) {
            return Err(SdkError::Config(format!("invalid merge key {key:?}")));
        }
        Ok(())
    }
}
