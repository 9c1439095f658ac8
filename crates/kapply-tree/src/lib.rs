//! Document tree types for kapply.
//!
//! Every kapply crate operates on the same schema-agnostic tree: the live
//! object, the last-applied baseline and the desired declaration are all
//! [`TreeNode`]s. This crate owns that model and the [`FieldPath`] locator used
//! in diagnostics.
//!
//! # Key Types
//!
//! - [`TreeNode`] — Tagged value: null, bool, number, string, object, array
//! - [`TreeMap`] — Insertion-ordered object representation
//! - [`Kind`] — Broad node kind, used when reporting structural conflicts
//! - [`FieldPath`] — Dotted/bracketed locator accumulated during recursion

pub mod error;
pub mod node;
pub mod path;

pub use error::{TreeError, TreeResult};
pub use node::{Kind, TreeMap, TreeNode};
pub use path::{FieldPath, Segment};
