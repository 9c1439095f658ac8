//! Type dispatch: decide how to merge one node by the observed node's kind.

use kapply_tree::{FieldPath, Kind, TreeMap, TreeNode};
use tracing::debug;

use crate::config::MergeConfig;
use crate::error::{InputRole, MergeError, MergeResult};
use crate::list_map::detect_list_map_key;
use crate::object::Keying;

/// Stand-in for a field that is absent from `last_applied` or `observed`.
pub(crate) static NULL: TreeNode = TreeNode::Null;

/// The merge engine.
///
/// A `Merger` holds no state besides its configuration; every call works on
/// its own copy of the observed tree, so one instance can be shared freely
/// between threads.
#[derive(Clone, Debug, Default)]
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Apply the changes from `last_applied` to `desired` on top of
    /// `observed`, returning the replacement for `observed`.
    ///
    /// `observed` is copied once up front and never modified.
    pub fn merge(
        &self,
        observed: &TreeNode,
        last_applied: &TreeNode,
        desired: &TreeNode,
    ) -> MergeResult<TreeNode> {
        let destination = observed.clone();
        self.merge_node(&FieldPath::root(), destination, last_applied, desired)
    }

    /// Merge a single position. `destination` is consumed and the replacement
    /// returned.
    pub(crate) fn merge_node(
        &self,
        path: &FieldPath,
        destination: TreeNode,
        last_applied: &TreeNode,
        desired: &TreeNode,
    ) -> MergeResult<TreeNode> {
        match destination {
            TreeNode::Object(dest) => {
                let empty = TreeMap::new();
                let last = expect_object(path, InputRole::LastApplied, last_applied)?;
                let want = expect_object(path, InputRole::Desired, desired)?;
                let merged = self.merge_object(
                    path,
                    dest,
                    last.unwrap_or(&empty),
                    want.unwrap_or(&empty),
                    Keying::Field,
                )?;
                Ok(TreeNode::Object(merged))
            }
            TreeNode::Array(dest) => {
                let last = expect_array(path, InputRole::LastApplied, last_applied)?;
                let want = expect_array(path, InputRole::Desired, desired)?;
                self.merge_array(
                    path,
                    dest,
                    last.unwrap_or_default(),
                    desired,
                    want.unwrap_or_default(),
                )
            }
            // Scalars and nulls are never merged partially.
            _ => Ok(desired.clone()),
        }
    }

    /// Arrays of keyed records merge per record; anything else is replaced
    /// by `desired` verbatim.
    fn merge_array(
        &self,
        path: &FieldPath,
        destination: Vec<TreeNode>,
        last_applied: &[TreeNode],
        desired: &TreeNode,
        desired_items: &[TreeNode],
    ) -> MergeResult<TreeNode> {
        let lists: [&[TreeNode]; 3] = [&destination, last_applied, desired_items];
        match detect_list_map_key(&self.config.merge_keys, &lists) {
            Some(key) => {
                debug!(path = %path, key, "merging array as list-map");
                let merged =
                    self.merge_list_map(path, key, destination, last_applied, desired_items)?;
                Ok(TreeNode::Array(merged))
            }
            None => {
                debug!(path = %path, "no merge key detected; replacing array");
                Ok(desired.clone())
            }
        }
    }
}

/// Merge with the default configuration.
pub fn merge(
    observed: &TreeNode,
    last_applied: &TreeNode,
    desired: &TreeNode,
) -> MergeResult<TreeNode> {
    Merger::default().merge(observed, last_applied, desired)
}

fn expect_object<'a>(
    path: &FieldPath,
    role: InputRole,
    node: &'a TreeNode,
) -> MergeResult<Option<&'a TreeMap>> {
    match node {
        TreeNode::Null => Ok(None),
        TreeNode::Object(map) => Ok(Some(map)),
        other => Err(MergeError::TypeMismatch {
            path: path.clone(),
            role,
            expected: Kind::Object,
            actual: other.kind(),
        }),
    }
}

fn expect_array<'a>(
    path: &FieldPath,
    role: InputRole,
    node: &'a TreeNode,
) -> MergeResult<Option<&'a [TreeNode]>> {
    match node {
        TreeNode::Null => Ok(None),
        TreeNode::Array(items) => Ok(Some(items)),
        other => Err(MergeError::TypeMismatch {
            path: path.clone(),
            role,
            expected: Kind::Array,
            actual: other.kind(),
        }),
    }
}
