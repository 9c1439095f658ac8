use kapply_diff::{diff_trees, TreeDiff};
use kapply_merge::Merger;
use kapply_tree::TreeNode;
use tracing::{debug, warn};

use crate::annotation::AnnotationStore;
use crate::config::ApplyConfig;
use crate::error::{SdkError, SdkResult};

/// Result of an apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The replacement for the live object, carrying the new baseline.
    pub object: TreeNode,
    /// The baseline the merge ran against.
    pub last_applied: TreeNode,
    /// What changed relative to the live object.
    pub changes: TreeDiff,
}

impl ApplyOutcome {
    /// Returns `true` if writing `object` back would change nothing.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Runs the declarative apply workflow against caller-supplied trees.
///
/// The new baseline is stamped onto the desired document before merging, so
/// it reaches the live object in the same write as the changes it describes.
/// If that write fails the stored baseline still matches the live state.
#[derive(Clone, Debug)]
pub struct Applier {
    merger: Merger,
    annotations: AnnotationStore,
    tolerate_corrupt_baseline: bool,
}

impl Default for Applier {
    fn default() -> Self {
        Self::new(ApplyConfig::default())
    }
}

impl Applier {
    pub fn new(config: ApplyConfig) -> Self {
        Self {
            merger: Merger::new(config.merge),
            annotations: AnnotationStore::new(config.annotation_key),
            tolerate_corrupt_baseline: config.tolerate_corrupt_baseline,
        }
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn merger(&self) -> &Merger {
        &self.merger
    }

    /// The baseline stored on `observed`.
    ///
    /// A corrupt baseline is treated as empty when the configuration allows
    /// it; the merge then cannot remove fields dropped since the last apply.
    pub fn last_applied(&self, observed: &TreeNode) -> SdkResult<TreeNode> {
        match self.annotations.get_last_applied(observed) {
            Err(SdkError::Baseline(reason)) if self.tolerate_corrupt_baseline => {
                warn!(
                    annotation = self.annotations.key(),
                    %reason,
                    "ignoring corrupt last-applied state"
                );
                Ok(TreeNode::empty_object())
            }
            other => other,
        }
    }

    /// The object to create when nothing is live yet: `desired` with its
    /// baseline attached.
    pub fn create(&self, desired: &TreeNode) -> SdkResult<TreeNode> {
        self.stamp(desired)
    }

    /// Compute the replacement for `observed` that applies `desired`.
    pub fn apply(&self, observed: &TreeNode, desired: &TreeNode) -> SdkResult<ApplyOutcome> {
        let last_applied = self.last_applied(observed)?;
        let stamped = self.stamp(desired)?;
        let object = self.merger.merge(observed, &last_applied, &stamped)?;
        let changes = diff_trees(observed, &object);
        debug!(
            changes = changes.len(),
            additions = changes.additions(),
            removals = changes.removals(),
            "apply computed"
        );
        Ok(ApplyOutcome {
            object,
            last_applied,
            changes,
        })
    }

    /// A copy of `desired` carrying `desired` itself as the baseline. Any
    /// baseline already present on `desired` is dropped first so baselines
    /// never nest.
    fn stamp(&self, desired: &TreeNode) -> SdkResult<TreeNode> {
        let mut baseline = desired.clone();
        self.annotations.clear(&mut baseline);
        let mut stamped = baseline.clone();
        self.annotations.set_last_applied(&mut stamped, &baseline)?;
        Ok(stamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{encode_baseline, LAST_APPLIED_ANNOTATION};
    use kapply_diff::FieldChange;
    use kapply_merge::MergeError;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TreeNode {
        TreeNode::from(value)
    }

    fn hello(message: &str) -> TreeNode {
        tree(json!({
            "kind": "Hello",
            "apiVersion": "v1",
            "metadata": {"name": "my-hello", "namespace": "default", "labels": {"app": "testing"}},
            "spec": {"message": message}
        }))
    }

    /// What the object store would hand back after creating `object`.
    fn as_stored(mut object: TreeNode) -> TreeNode {
        let root = object.as_object_mut().unwrap();
        root.insert("status".into(), tree(json!({"phase": "Up"})));
        let metadata = root.get_mut("metadata").unwrap().as_object_mut().unwrap();
        metadata.insert("uid".into(), tree(json!("0c1d")));
        metadata.insert("resourceVersion".into(), tree(json!("1")));
        object
    }

    #[test]
    fn create_stamps_baseline() {
        let applier = Applier::default();
        let desired = hello("Hello There!!!");
        let created = applier.create(&desired).unwrap();

        assert_eq!(applier.annotations().get_last_applied(&created).unwrap(), desired);
        assert_eq!(created.get("spec"), desired.get("spec"));
    }

    #[test]
    fn apply_updates_declared_and_keeps_server_fields() {
        let applier = Applier::default();
        let live = as_stored(applier.create(&hello("Hello There!!!")).unwrap());

        let outcome = applier.apply(&live, &hello("Bye!!!")).unwrap();

        let object = &outcome.object;
        assert_eq!(object.nested_str(&["spec", "message"]).unwrap(), Some("Bye!!!"));
        assert_eq!(object.nested_str(&["status", "phase"]).unwrap(), Some("Up"));
        assert_eq!(object.nested_str(&["metadata", "uid"]).unwrap(), Some("0c1d"));
        assert_eq!(
            applier.annotations().get_last_applied(object).unwrap(),
            hello("Bye!!!")
        );
        assert_eq!(outcome.last_applied, hello("Hello There!!!"));
        assert!(!outcome.is_noop());
    }

    #[test]
    fn reapplying_same_document_is_noop() {
        let applier = Applier::default();
        let live = as_stored(applier.create(&hello("same")).unwrap());

        let outcome = applier.apply(&live, &hello("same")).unwrap();
        assert!(outcome.is_noop(), "unexpected changes: {:?}", outcome.changes);
        assert_eq!(outcome.object, live);
    }

    #[test]
    fn dropped_label_is_removed_foreign_label_kept() {
        let applier = Applier::default();
        let mut live = as_stored(applier.create(&hello("x")).unwrap());
        live.as_object_mut()
            .and_then(|root| root.get_mut("metadata"))
            .and_then(TreeNode::as_object_mut)
            .and_then(|metadata| metadata.get_mut("labels"))
            .and_then(TreeNode::as_object_mut)
            .unwrap()
            .insert("injected-by".into(), tree(json!("webhook")));

        let desired = tree(json!({
            "kind": "Hello",
            "apiVersion": "v1",
            "metadata": {"name": "my-hello", "namespace": "default", "labels": {}},
            "spec": {"message": "x"}
        }));

        let outcome = applier.apply(&live, &desired).unwrap();
        let labels = outcome.object.lookup(&["metadata", "labels"]).unwrap().unwrap();
        assert_eq!(labels, &tree(json!({"injected-by": "webhook"})));

        let removed: Vec<String> = outcome
            .changes
            .changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Removed { .. }))
            .map(|c| c.path().to_string())
            .collect();
        assert_eq!(removed, vec!["metadata.labels.app"]);
    }

    #[test]
    fn missing_baseline_merges_without_removals() {
        let applier = Applier::default();
        let live = tree(json!({"metadata": {"name": "a"}, "spec": {"old": 1}}));
        let outcome = applier
            .apply(&live, &tree(json!({"metadata": {"name": "a"}, "spec": {"new": 2}})))
            .unwrap();
        assert_eq!(outcome.object.get("spec"), Some(&tree(json!({"old": 1, "new": 2}))));
        assert_eq!(outcome.last_applied, TreeNode::empty_object());
    }

    #[test]
    fn corrupt_baseline_tolerated_by_default() {
        let applier = Applier::default();
        let live = tree(json!({
            "metadata": {"annotations": {LAST_APPLIED_ANNOTATION: "{broken"}},
            "spec": {"a": 1}
        }));
        let outcome = applier.apply(&live, &tree(json!({"spec": {"a": 2}}))).unwrap();
        assert_eq!(outcome.last_applied, TreeNode::empty_object());
        assert_eq!(outcome.object.get("spec"), Some(&tree(json!({"a": 2}))));
    }

    #[test]
    fn corrupt_baseline_rejected_when_strict() {
        let applier = Applier::new(ApplyConfig {
            tolerate_corrupt_baseline: false,
            ..Default::default()
        });
        let live = tree(json!({"metadata": {"annotations": {LAST_APPLIED_ANNOTATION: "[1]"}}}));
        let err = applier.apply(&live, &tree(json!({}))).unwrap_err();
        assert!(matches!(err, SdkError::Baseline(_)));
    }

    #[test]
    fn stamping_never_nests_baselines() {
        let applier = Applier::default();
        let mut desired = hello("x");
        applier
            .annotations()
            .set_last_applied(&mut desired, &tree(json!({"stale": true})))
            .unwrap();

        let created = applier.create(&desired).unwrap();
        let baseline = applier.annotations().get_last_applied(&created).unwrap();
        assert_eq!(baseline, hello("x"));
        assert_eq!(
            applier.annotations().raw(&created).unwrap(),
            Some(encode_baseline(&hello("x")).unwrap().as_str())
        );
    }

    #[test]
    fn custom_annotation_key() {
        let applier = Applier::new(ApplyConfig {
            annotation_key: "example.com/applied".into(),
            ..Default::default()
        });
        let created = applier.create(&tree(json!({"spec": {}}))).unwrap();
        assert!(created
            .lookup(&["metadata", "annotations", "example.com/applied"])
            .unwrap()
            .is_some());
        assert!(created
            .lookup(&["metadata", "annotations", LAST_APPLIED_ANNOTATION])
            .unwrap()
            .is_none());
    }

    #[test]
    fn merge_conflict_propagates() {
        let applier = Applier::default();
        let live = tree(json!({"spec": {"template": {}}}));
        let err = applier
            .apply(&live, &tree(json!({"spec": {"template": "flat"}})))
            .unwrap_err();
        match err {
            SdkError::Merge(MergeError::TypeMismatch { path, .. }) => {
                assert_eq!(path.to_string(), "spec.template")
            }
            other => panic!("expected merge error, got {other:?}"),
        }
    }

    #[test]
    fn applier_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Applier>();
        assert_send_sync::<TreeNode>();
    }
}
