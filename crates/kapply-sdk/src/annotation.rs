//! The last-applied baseline, persisted as an annotation on the object.
//!
//! The baseline is the desired document from the previous apply, stored as
//! compact JSON under `metadata.annotations[<key>]`. It is what lets a merge
//! tell "the user removed this field" apart from "the user never declared
//! this field". A missing annotation is not an error: the first apply simply
//! has nothing to remove.

use kapply_tree::{TreeMap, TreeNode};

use crate::error::{SdkError, SdkResult};

/// Default annotation key holding the last-applied state.
pub const LAST_APPLIED_ANNOTATION: &str = "dc.openebs.io/last-applied-state";

/// Serialize a baseline for storage.
pub fn encode_baseline(tree: &TreeNode) -> SdkResult<String> {
    tree.to_json_string()
        .map_err(|e| SdkError::Encode(e.to_string()))
}

/// Decode a stored baseline.
///
/// Absent, blank and `null` input decode to an empty object. Anything that
/// is not a JSON object is [`SdkError::Baseline`].
pub fn decode_baseline(raw: Option<&str>) -> SdkResult<TreeNode> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(TreeNode::empty_object()),
    };
    match TreeNode::from_json_str(raw) {
        Ok(TreeNode::Null) => Ok(TreeNode::empty_object()),
        Ok(node @ TreeNode::Object(_)) => Ok(node),
        Ok(other) => Err(SdkError::Baseline(format!(
            "expected object, got {}",
            other.kind()
        ))),
        Err(e) => Err(SdkError::Baseline(e.to_string())),
    }
}

/// Reads and writes the baseline annotation on object trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationStore {
    key: String,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(LAST_APPLIED_ANNOTATION)
    }
}

impl AnnotationStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The annotation key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw annotation value, if set.
    pub fn raw<'a>(&self, object: &'a TreeNode) -> SdkResult<Option<&'a str>> {
        let found = object
            .lookup(&["metadata", "annotations", self.key.as_str()])
            .map_err(|e| SdkError::InvalidObject(e.to_string()))?;
        match found {
            None | Some(TreeNode::Null) => Ok(None),
            Some(TreeNode::String(s)) => Ok(Some(s)),
            Some(other) => Err(SdkError::InvalidObject(format!(
                "annotation {:?} is {}, expected string",
                self.key,
                other.kind()
            ))),
        }
    }

    /// Decode the baseline stored on `object`.
    pub fn get_last_applied(&self, object: &TreeNode) -> SdkResult<TreeNode> {
        decode_baseline(self.raw(object)?)
    }

    /// Store `last_applied` on `object`, creating `metadata` and
    /// `metadata.annotations` as needed.
    pub fn set_last_applied(&self, object: &mut TreeNode, last_applied: &TreeNode) -> SdkResult<()> {
        let encoded = encode_baseline(last_applied)?;
        annotations_mut(object)?.insert(self.key.clone(), TreeNode::String(encoded));
        Ok(())
    }

    /// Remove the baseline from `object`, dropping `metadata.annotations`
    /// if nothing else is left in it. Returns `true` if a baseline was
    /// present.
    pub fn clear(&self, object: &mut TreeNode) -> bool {
        let Some(metadata) = object
            .as_object_mut()
            .and_then(|root| root.get_mut("metadata"))
            .and_then(TreeNode::as_object_mut)
        else {
            return false;
        };
        let Some(annotations) = metadata
            .get_mut("annotations")
            .and_then(TreeNode::as_object_mut)
        else {
            return false;
        };
        if annotations.shift_remove(&self.key).is_none() {
            return false;
        }
        if annotations.is_empty() {
            metadata.shift_remove("annotations");
        }
        true
    }
}

fn annotations_mut(object: &mut TreeNode) -> SdkResult<&mut TreeMap> {
    let kind = object.kind();
    let root = object
        .as_object_mut()
        .ok_or_else(|| SdkError::InvalidObject(format!("expected object, got {kind}")))?;
    let metadata = child_object(root, "metadata")?;
    child_object(metadata, "annotations")
}

fn child_object<'a>(parent: &'a mut TreeMap, field: &str) -> SdkResult<&'a mut TreeMap> {
    let slot = parent
        .entry(field.to_string())
        .or_insert_with(TreeNode::empty_object);
    if slot.is_null() {
        *slot = TreeNode::empty_object();
    }
    let kind = slot.kind();
    slot.as_object_mut()
        .ok_or_else(|| SdkError::InvalidObject(format!("{field} is {kind}, expected object")))
}
