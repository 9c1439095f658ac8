//! List-maps: arrays of records that are really maps keyed by one field.
//!
//! Declarative documents often spell a map as a list of records sharing an
//! identifying field (`ports` keyed by `port`, `containers` keyed by `name`).
//! Such arrays are merged record by record instead of being replaced, which
//! keeps records added by other actors and keeps the existing order stable.

use std::collections::HashSet;

use kapply_tree::{FieldPath, TreeMap, TreeNode};
use serde_json::Number;

use crate::error::MergeResult;
use crate::merge::{Merger, NULL};
use crate::object::Keying;

/// Guess the merge key of a list-map.
///
/// Every element of every list must be an object. The first entry of
/// `candidates` that appears in all of them is the key. Lists without any
/// element carry no evidence of structure and yield `None`.
pub fn detect_list_map_key<'k>(
    candidates: &'k [String],
    lists: &[&[TreeNode]],
) -> Option<&'k str> {
    let mut common: Option<HashSet<&str>> = None;

    for item in lists.iter().flat_map(|list| list.iter()) {
        let TreeNode::Object(record) = item else {
            return None;
        };
        if let Some(keys) = common.as_mut() {
            keys.retain(|key| record.contains_key(*key));
        } else {
            common = Some(record.keys().map(String::as_str).collect());
        }
    }

    let common = common?;
    candidates
        .iter()
        .map(String::as_str)
        .find(|candidate| common.contains(candidate))
}

/// The identity of a record under `key`: strings verbatim, integral numbers
/// in integer form whatever their spelling, anything else as compact JSON.
fn record_id(record: &TreeNode, key: &str) -> String {
    match record.get(key).unwrap_or(&NULL) {
        TreeNode::String(s) => s.clone(),
        TreeNode::Number(n) => number_id(n),
        other => other.to_string(),
    }
}

/// `80` and `80.0` name the same record.
fn number_id(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Re-key records by their identity. A later record with an identity already
/// seen replaces the earlier one.
fn index_records(key: &str, records: impl IntoIterator<Item = TreeNode>) -> TreeMap {
    records
        .into_iter()
        .map(|record| (record_id(&record, key), record))
        .collect()
}

impl Merger {
    /// Merge three record arrays matched by `key`.
    ///
    /// Records are merged like the fields of an object. The result lists the
    /// surviving records in `destination` order, followed by new records in
    /// `desired` order.
    pub(crate) fn merge_list_map(
        &self,
        path: &FieldPath,
        key: &str,
        destination: Vec<TreeNode>,
        last_applied: &[TreeNode],
        desired: &[TreeNode],
    ) -> MergeResult<Vec<TreeNode>> {
        let order: Vec<String> = destination
            .iter()
            .chain(desired)
            .map(|record| record_id(record, key))
            .collect();

        let dest_map = index_records(key, destination);
        let last_map = index_records(key, last_applied.iter().cloned());
        let desired_map = index_records(key, desired.iter().cloned());

        let mut merged =
            self.merge_object(path, dest_map, &last_map, &desired_map, Keying::Record(key))?;

        let mut records = Vec::with_capacity(merged.len());
        for id in &order {
            if let Some(record) = merged.swap_remove(id) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merge, MergeConfig, MergeError, Merger};
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TreeNode {
        TreeNode::from(value)
    }

    fn items(value: serde_json::Value) -> Vec<TreeNode> {
        match tree(value) {
            TreeNode::Array(items) => items,
            other => panic!("expected array, got {other}"),
        }
    }

    fn default_keys() -> Vec<String> {
        MergeConfig::default().merge_keys
    }

    #[test]
    fn detects_common_key() {
        let list = items(json!([{"name": "a", "image": "x"}, {"name": "b"}]));
        assert_eq!(detect_list_map_key(&default_keys(), &[list.as_slice()]), Some("name"));
    }

    #[test]
    fn key_must_be_shared_by_all_lists() {
        let observed = items(json!([{"name": "a", "ip": "1.1.1.1"}]));
        let desired = items(json!([{"ip": "1.1.1.2"}]));
        assert_eq!(
            detect_list_map_key(&default_keys(), &[observed.as_slice(), &[], desired.as_slice()]),
            Some("ip")
        );
    }

    #[test]
    fn no_shared_candidate_means_no_key() {
        let list = items(json!([{"name": "a"}, {"uid": "b"}]));
        assert_eq!(detect_list_map_key(&default_keys(), &[list.as_slice()]), None);
    }

    #[test]
    fn unknown_fields_are_not_keys() {
        let list = items(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(detect_list_map_key(&default_keys(), &[list.as_slice()]), None);
    }

    #[test]
    fn scalar_element_means_no_key() {
        let list = items(json!([{"name": "a"}, "b"]));
        assert_eq!(detect_list_map_key(&default_keys(), &[list.as_slice()]), None);
    }

    #[test]
    fn empty_lists_have_no_key() {
        assert_eq!(detect_list_map_key(&default_keys(), &[&[], &[], &[]]), None);
    }

    #[test]
    fn precedence_is_independent_of_element_order() {
        let a = items(json!([{"name": "http", "port": 80}, {"port": 443, "name": "https"}]));
        let b = items(json!([{"port": 443, "name": "https"}, {"name": "http", "port": 80}]));
        assert_eq!(detect_list_map_key(&default_keys(), &[a.as_slice()]), Some("port"));
        assert_eq!(detect_list_map_key(&default_keys(), &[b.as_slice()]), Some("port"));
    }

    #[test]
    fn container_port_beats_name() {
        let list = items(json!([{"name": "http", "containerPort": 8080, "port": 80}]));
        assert_eq!(
            detect_list_map_key(&default_keys(), &[list.as_slice()]),
            Some("containerPort")
        );
    }

    #[test]
    fn custom_candidates() {
        let keys = MergeConfig::with_merge_keys(["id"]).merge_keys;
        let list = items(json!([{"id": 1, "name": "a"}]));
        assert_eq!(detect_list_map_key(&keys, &[list.as_slice()]), Some("id"));
    }

    #[test]
    fn record_ids_stringify_non_strings() {
        assert_eq!(record_id(&tree(json!({"port": 80})), "port"), "80");
        assert_eq!(record_id(&tree(json!({"name": "web"})), "name"), "web");
        assert_eq!(record_id(&tree(json!({"uid": true})), "uid"), "true");
    }

    #[test]
    fn integral_floats_share_integer_ids() {
        let whole = tree(json!({"port": 80}));
        assert_eq!(record_id(&tree(json!({"port": 80.0})), "port"), record_id(&whole, "port"));
        assert_eq!(record_id(&tree(json!({"port": -3.0})), "port"), "-3");
        assert_eq!(record_id(&tree(json!({"port": 80.5})), "port"), "80.5");
    }

    #[test]
    fn float_spelled_key_matches_existing_record() {
        let out = merge(
            &tree(json!({"ports": [{"port": 80.0, "nodePort": 30080}]})),
            &tree(json!({"ports": [{"port": 80}]})),
            &tree(json!({"ports": [{"port": 80, "protocol": "TCP"}]})),
        )
        .unwrap();
        assert_eq!(
            out,
            tree(json!({"ports": [{"port": 80, "nodePort": 30080, "protocol": "TCP"}]}))
        );
    }

    #[test]
    fn updates_in_place_removes_and_appends() {
        let merger = Merger::new(MergeConfig::with_merge_keys(["id"]));
        let out = merger
            .merge(
                &tree(json!([{"id": 1, "v": "one"}, {"id": 2, "v": "two", "extra": true}])),
                &tree(json!([{"id": 1}, {"id": 2}])),
                &tree(json!([{"id": 2, "v": "new"}, {"id": 3, "v": "x"}])),
            )
            .unwrap();
        assert_eq!(
            out,
            tree(json!([{"id": 2, "v": "new", "extra": true}, {"id": 3, "v": "x"}]))
        );
    }

    #[test]
    fn ordering_follows_observed_then_desired() {
        let merger = Merger::new(MergeConfig::with_merge_keys(["id"]));
        let out = merger
            .merge(
                &tree(json!([{"id": 1}, {"id": 2}])),
                &tree(json!([{"id": 1}, {"id": 2}])),
                &tree(json!([{"id": 2, "v": "new"}, {"id": 3, "v": "x"}])),
            )
            .unwrap();
        assert_eq!(out, tree(json!([{"id": 2, "v": "new"}, {"id": 3, "v": "x"}])));
    }

    #[test]
    fn desired_order_does_not_reorder_existing_records() {
        let out = merge(
            &tree(json!({"containers": [{"name": "a"}, {"name": "b"}, {"name": "c"}]})),
            &tree(json!({"containers": [{"name": "a"}, {"name": "b"}, {"name": "c"}]})),
            &tree(json!({"containers": [{"name": "c"}, {"name": "d"}, {"name": "a"}, {"name": "b"}]})),
        )
        .unwrap();
        assert_eq!(
            out,
            tree(json!({"containers": [{"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "d"}]}))
        );
    }

    #[test]
    fn records_added_by_others_survive() {
        let out = merge(
            &tree(json!({"containers": [{"name": "app"}, {"name": "sidecar", "image": "proxy"}]})),
            &tree(json!({"containers": [{"name": "app"}]})),
            &tree(json!({"containers": [{"name": "app", "image": "v2"}]})),
        )
        .unwrap();
        assert_eq!(
            out,
            tree(json!({"containers": [{"name": "app", "image": "v2"}, {"name": "sidecar", "image": "proxy"}]}))
        );
    }

    #[test]
    fn merging_against_itself_is_identity() {
        let list = json!({"ports": [{"port": 443, "name": "https"}, {"port": 80, "name": "http"}]});
        let out = merge(&tree(list.clone()), &tree(list.clone()), &tree(list.clone())).unwrap();
        assert_eq!(out, tree(list));
    }

    #[test]
    fn duplicate_keys_keep_last_record() {
        let out = merge(
            &tree(json!({"env": [{"name": "A", "value": "1"}, {"name": "A", "value": "2"}]})),
            &TreeNode::Null,
            &tree(json!({"env": [{"name": "B", "value": "3"}]})),
        )
        .unwrap();
        assert_eq!(
            out,
            tree(json!({"env": [{"name": "A", "value": "2"}, {"name": "B", "value": "3"}]}))
        );
    }

    #[test]
    fn numeric_and_string_ids_match() {
        let out = merge(
            &tree(json!({"ports": [{"port": 80, "nodePort": 30080}]})),
            &tree(json!({"ports": [{"port": "80"}]})),
            &tree(json!({"ports": [{"port": "80", "protocol": "TCP"}]})),
        )
        .unwrap();
        assert_eq!(
            out,
            tree(json!({"ports": [{"port": "80", "nodePort": 30080, "protocol": "TCP"}]}))
        );
    }

    #[test]
    fn type_mismatch_inside_record_names_record() {
        let err = merge(
            &tree(json!({"spec": {"ports": [{"port": 80, "targetPort": {"name": {"value": "http"}}}]}})),
            &TreeNode::Null,
            &tree(json!({"spec": {"ports": [{"port": 80, "targetPort": {"name": ["http"]}}]}})),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::TypeMismatch { .. }));
        assert_eq!(err.path().to_string(), "spec.ports[port=80].targetPort.name");
    }
}
