//! Set reconciliation between exported rule keys and remote patterns

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Result of comparing the XML rule keys with a remote key set
///
/// `missing_remote`, `extra_remote` and `matching` partition the union of
/// both inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Number of distinct rule keys in the XML export
    pub xml_total: usize,
    /// Number of distinct keys on the remote side
    pub remote_total: usize,
    /// Size of the union of both sets
    pub union_total: usize,
    /// In the XML, absent remotely
    pub missing_remote: BTreeSet<String>,
    /// Present remotely, absent from the XML
    pub extra_remote: BTreeSet<String>,
    /// Present on both sides
    pub matching: BTreeSet<String>,
}

impl Reconciliation {
    pub fn compute(xml: &BTreeSet<String>, remote: &BTreeSet<String>) -> Self {
        Self {
            xml_total: xml.len(),
            remote_total: remote.len(),
            union_total: xml.union(remote).count(),
            missing_remote: xml.difference(remote).cloned().collect(),
            extra_remote: remote.difference(xml).cloned().collect(),
            matching: xml.intersection(remote).cloned().collect(),
        }
    }

    /// Both sides agree exactly
    pub fn is_in_sync(&self) -> bool {
        self.missing_remote.is_empty() && self.extra_remote.is_empty()
    }

    /// Share of XML rules present remotely, in percent
    ///
    /// `None` when the XML side is empty.
    pub fn success_rate(&self) -> Option<f64> {
        (self.xml_total > 0).then(|| self.matching.len() as f64 / self.xml_total as f64 * 100.0)
    }
}

/// First `limit` items of a sorted set plus the number left out
pub fn preview(set: &BTreeSet<String>, limit: usize) -> (Vec<&str>, usize) {
    let shown: Vec<&str> = set.iter().take(limit).map(String::as_str).collect();
    let hidden = set.len().saturating_sub(shown.len());
    (shown, hidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compute() {
        let xml = set(&["S100", "S101", "S107"]);
        let remote = set(&["S101", "S107", "S1144", "S2076"]);

        let result = Reconciliation::compute(&xml, &remote);

        assert_eq!(result.missing_remote, set(&["S100"]));
        assert_eq!(result.extra_remote, set(&["S1144", "S2076"]));
        assert_eq!(result.matching, set(&["S101", "S107"]));
        assert_eq!(result.xml_total, 3);
        assert_eq!(result.remote_total, 4);
        assert_eq!(result.union_total, 5);
        assert!(!result.is_in_sync());
    }

    #[test]
    fn test_identical_sets_are_in_sync() {
        let keys = set(&["S1", "S2"]);
        let result = Reconciliation::compute(&keys, &keys);
        assert!(result.is_in_sync());
        assert_eq!(result.success_rate(), Some(100.0));
    }

    #[test]
    fn test_success_rate() {
        let result = Reconciliation::compute(&set(&["A", "B", "C", "D"]), &set(&["A"]));
        assert_eq!(result.success_rate(), Some(25.0));
    }

    #[test]
    fn test_success_rate_of_empty_xml_is_none() {
        let result = Reconciliation::compute(&BTreeSet::new(), &set(&["A"]));
        assert_eq!(result.success_rate(), None);
        assert_eq!(result.extra_remote, set(&["A"]));
    }

    #[test]
    fn test_preview() {
        let keys: BTreeSet<String> = (0..15).map(|i| format!("S{:03}", i)).collect();
        let (shown, hidden) = preview(&keys, 10);
        assert_eq!(shown.len(), 10);
        assert_eq!(shown[0], "S000");
        assert_eq!(hidden, 5);

        let one = set(&["A"]);
        let (shown, hidden) = preview(&one, 10);
        assert_eq!(shown, vec!["A"]);
        assert_eq!(hidden, 0);
    }

    fn key_set() -> impl Strategy<Value = BTreeSet<String>> {
        proptest::collection::btree_set("S[0-9]{1,3}", 0..40)
    }

    proptest! {
        #[test]
        fn prop_partitions_cover_both_sides(xml in key_set(), remote in key_set()) {
            let result = Reconciliation::compute(&xml, &remote);

            let xml_side: BTreeSet<String> =
                result.missing_remote.union(&result.matching).cloned().collect();
            let remote_side: BTreeSet<String> =
                result.extra_remote.union(&result.matching).cloned().collect();

            prop_assert_eq!(xml_side, xml);
            prop_assert_eq!(remote_side, remote);
            prop_assert!(result.missing_remote.is_disjoint(&result.extra_remote));
            prop_assert!(result.matching.is_disjoint(&result.missing_remote));
            prop_assert_eq!(
                result.union_total,
                result.missing_remote.len() + result.extra_remote.len() + result.matching.len()
            );
        }
    }
}
