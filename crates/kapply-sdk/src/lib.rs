//! High-level SDK for kapply.
//!
//! Wraps the merge engine in the workflow a declarative client runs for every
//! object: read the last-applied baseline from the live object, stamp the new
//! baseline onto the desired declaration, merge, and report what changed.
//! Fetching the live object and writing the result back are left to the
//! caller, as is retrying when the write loses an optimistic-concurrency race.
//!
//! # Quick Start
//!
//! ```rust
//! use kapply_sdk::{Applier, ApplyConfig};
//! use kapply_tree::TreeNode;
//!
//! let applier = Applier::new(ApplyConfig::default());
//! let desired = TreeNode::from_json_str(r#"{"metadata":{"name":"web"},"spec":{"replicas":2}}"#).unwrap();
//!
//! // First apply: nothing is live yet.
//! let created = applier.create(&desired).unwrap();
//!
//! // Later: someone else adds status, we bump replicas.
//! let mut live = created.clone();
//! live.as_object_mut().unwrap().insert("status".into(), TreeNode::from("Running"));
//! let desired = TreeNode::from_json_str(r#"{"metadata":{"name":"web"},"spec":{"replicas":3}}"#).unwrap();
//!
//! let outcome = applier.apply(&live, &desired).unwrap();
//! assert_eq!(outcome.object.get("status"), Some(&TreeNode::from("Running")));
//! assert!(!outcome.is_noop());
//! ```

pub mod annotation;
pub mod apply;
pub mod config;
pub mod error;

pub use annotation::{decode_baseline, encode_baseline, AnnotationStore, LAST_APPLIED_ANNOTATION};
pub use apply::{Applier, ApplyOutcome};
pub use config::ApplyConfig;
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use kapply_diff::{diff_trees, is_change_str, is_diff, FieldChange, TreeDiff};
pub use kapply_merge::{merge, MergeConfig, MergeError, Merger};
pub use kapply_tree::{FieldPath, Kind, TreeMap, TreeNode};
