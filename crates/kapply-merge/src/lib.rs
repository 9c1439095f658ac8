//! Three-way merge engine for kapply.
//!
//! Given the live state of an object (`observed`), the declaration applied
//! last time (`last_applied`) and the new declaration (`desired`), the engine
//! computes a replacement for the live state that applies every change from
//! `last_applied` to `desired` while leaving fields nobody declared alone.
//!
//! ```text
//!               last
//!             applied
//!                |
//!                v
//! desired ---> (merge) <--- observed
//! ```
//!
//! Dispatch is driven by the observed node's runtime kind. Objects merge per
//! field, arrays of uniquely keyed records merge per record, every other
//! array and every scalar is replaced by the desired value.
//!
//! # Quick Start
//!
//! ```rust
//! use kapply_merge::merge;
//! use kapply_tree::TreeNode;
//!
//! let observed = TreeNode::from_json_str(r#"{"replicas":1,"status":{"ready":true}}"#).unwrap();
//! let last = TreeNode::from_json_str(r#"{"replicas":1}"#).unwrap();
//! let desired = TreeNode::from_json_str(r#"{"replicas":3}"#).unwrap();
//!
//! let merged = merge(&observed, &last, &desired).unwrap();
//! assert_eq!(merged.to_string(), r#"{"replicas":3,"status":{"ready":true}}"#);
//! ```

pub mod config;
pub mod error;
pub mod list_map;
pub mod merge;
mod object;

pub use config::{MergeConfig, DEFAULT_MERGE_KEYS};
pub use error::{InputRole, MergeError, MergeResult};
pub use list_map::detect_list_map_key;
pub use merge::{merge, Merger};
