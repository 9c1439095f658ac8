//! Structural diff for kapply.
//!
//! Compares two document trees field by field. Used to tell whether an apply
//! changes anything before writing it back, and to report what changed.
//!
//! # Key Types
//!
//! - [`TreeDiff`] / [`FieldChange`] -- Field-level diff (added/removed/modified paths)
//! - [`is_diff`] -- Quick "anything changed?" check
//! - [`is_change_str`] -- Compare string leaves at dotted paths

pub mod change;
pub mod error;
pub mod tree_diff;

pub use change::is_change_str;
pub use error::{DiffError, DiffResult};
pub use tree_diff::{diff_trees, is_diff, FieldChange, TreeDiff};
