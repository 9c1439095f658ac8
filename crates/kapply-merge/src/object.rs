//! Field-by-field merge of objects.

use kapply_tree::{FieldPath, TreeMap};
use tracing::debug;

use crate::error::MergeResult;
use crate::merge::{Merger, NULL};

/// How the keys of a merged map extend the diagnostic path.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Keying<'a> {
    /// Keys are object field names.
    Field,
    /// Keys are list-map merge-key values for the named field.
    Record(&'a str),
}

impl Keying<'_> {
    fn child(self, path: &FieldPath, key: &str) -> FieldPath {
        match self {
            Keying::Field => path.field(key),
            Keying::Record(field) => path.record(field, key),
        }
    }
}

impl Merger {
    /// Remove what was declared last time but no longer is, then merge
    /// everything that is declared now.
    ///
    /// Keys only present in `destination` were never declared and are left
    /// alone. Retained keys keep their position; new keys are appended in
    /// `desired` order.
    pub(crate) fn merge_object(
        &self,
        path: &FieldPath,
        mut destination: TreeMap,
        last_applied: &TreeMap,
        desired: &TreeMap,
        keying: Keying<'_>,
    ) -> MergeResult<TreeMap> {
        for key in last_applied.keys() {
            if !desired.contains_key(key) && destination.shift_remove(key).is_some() {
                debug!(path = %keying.child(path, key), "removed field no longer declared");
            }
        }

        for (key, wanted) in desired {
            let child = keying.child(path, key);
            let current = destination
                .get_mut(key)
                .map(std::mem::take)
                .unwrap_or_default();
            let last = last_applied.get(key).unwrap_or(&NULL);
            let merged = self.merge_node(&child, current, last, wanted)?;
            destination.insert(key.clone(), merged);
        }

        Ok(destination)
    }
}
