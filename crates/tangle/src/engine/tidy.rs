//! Normalization of a freshly fetched or cache-loaded issue set.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Issue, IssueKey};

/// Prune dangling links and sort everything into a deterministic order.
///
/// Mid-traversal filtering can leave links pointing at issues that never made
/// it into the final set; those are removed here. Links are then sorted by
/// the stable key comparator so persisted and printed output is byte-stable.
/// The issue collection itself is a `BTreeMap`, already ordered by the same
/// comparator. Idempotent.
pub(crate) fn tidy(issues: &mut BTreeMap<IssueKey, Issue>) {
    let present: BTreeSet<IssueKey> = issues.keys().cloned().collect();

    for issue in issues.values_mut() {
        issue
            .links
            .retain(|link| present.contains(&link.src) && present.contains(&link.dst));
        issue.links.sort_by(|a, b| {
            a.src
                .cmp(&b.src)
                .then_with(|| a.dst.cmp(&b.dst))
                .then_with(|| a.link_type.cmp(&b.link_type))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{issue, linked_pair};

    #[test]
    fn prunes_links_to_absent_issues() {
        let (a, b) = linked_pair("ABC-1", "ABC-2", "Blocks");
        let mut issues: BTreeMap<IssueKey, Issue> = BTreeMap::new();
        // Keep only one end of the pair.
        issues.insert(a.key.clone(), a);
        let mut c = issue("ABC-3", "Task");
        c.links = b.links; // dangling: ABC-2 is not in the set
        issues.insert(c.key.clone(), c);

        tidy(&mut issues);

        assert!(issues[&IssueKey::from("ABC-1")].links.is_empty());
        assert!(issues[&IssueKey::from("ABC-3")].links.is_empty());
    }

    #[test]
    fn tidy_is_idempotent() {
        let (a, b) = linked_pair("ABC-2", "ABC-1", "Blocks");
        let mut issues: BTreeMap<IssueKey, Issue> = BTreeMap::new();
        issues.insert(a.key.clone(), a);
        issues.insert(b.key.clone(), b);

        tidy(&mut issues);
        let once = issues.clone();
        tidy(&mut issues);

        for (key, issue) in &issues {
            assert_eq!(issue.links, once[key].links);
        }
    }
}
