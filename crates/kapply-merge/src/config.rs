use serde::{Deserialize, Serialize};

/// Field names guessed as list-map merge keys, highest precedence first.
///
/// `status` lists such as `conditions` are never merged per record: the
/// controller owning status writes it whole.
pub const DEFAULT_MERGE_KEYS: &[&str] = &["containerPort", "port", "name", "uid", "ip"];

/// Configuration for the merge engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Ordered merge-key candidates. The first one shared by every record of
    /// an array is used to match records.
    pub merge_keys: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_keys: DEFAULT_MERGE_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl MergeConfig {
    /// A configuration with a custom candidate list.
    pub fn with_merge_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            merge_keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// A configuration that never detects list-maps, so every array is
    /// replaced wholesale.
    pub fn replace_arrays() -> Self {
        Self {
            merge_keys: Vec::new(),
        }
    }
}
