//! Per-issue structural role classification and warnings.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::domain::{Analysis, Issue, IssueKey, Warning};
use crate::engine::partition::Component;

/// Classify every issue's structural role and attach warnings.
///
/// Roles come straight from the surviving link directions: an issue nothing
/// blocks is a root, an issue that blocks nothing is a leaf, and an issue
/// with no links at all is an orphan. Warnings:
///
/// - `doneButBlocked`: the issue is done but something blocking it is not.
/// - `invalidRoot`: a root whose type is not allowed at the top of a graph.
/// - `invalidGraph`: the issue's component contains no issue of an allowed
///   graph type.
/// - `orphaned`: the issue is an island.
pub(crate) fn classify(
    issues: &BTreeMap<IssueKey, Issue>,
    components: &[Component],
    orphans: &[IssueKey],
    config: &Config,
) -> BTreeMap<IssueKey, Analysis> {
    let mut analyses: BTreeMap<IssueKey, Analysis> = issues
        .iter()
        .map(|(key, issue)| {
            let root = issue.inward_links().next().is_none();
            let leaf = issue.outward_links().next().is_none();
            let mut analysis = Analysis {
                root,
                leaf,
                orphan: root && leaf,
                ..Analysis::default()
            };

            if issue.is_done() && blocked_by_incomplete(issue, issues) {
                analysis.warnings.insert(Warning::DoneButBlocked);
            }
            if root && !config.allowed_root_issue_types.contains(&issue.issue_type) {
                analysis.warnings.insert(Warning::InvalidRoot);
            }

            (key.clone(), analysis)
        })
        .collect();

    for key in orphans {
        if let Some(analysis) = analyses.get_mut(key) {
            analysis.warnings.insert(Warning::Orphaned);
        }
    }

    for component in components {
        let valid = component.nodes.iter().any(|key| {
            issues
                .get(key)
                .is_some_and(|issue| config.allowed_graph_issue_types.contains(&issue.issue_type))
        });
        if valid {
            continue;
        }
        for key in &component.nodes {
            if let Some(analysis) = analyses.get_mut(key) {
                analysis.warnings.insert(Warning::InvalidGraph);
            }
        }
    }

    analyses
}

/// True if any surviving inward link points at work that is not done.
fn blocked_by_incomplete(issue: &Issue, issues: &BTreeMap<IssueKey, Issue>) -> bool {
    issue.inward_links().any(|link| {
        // Prefer the live record; the fetch-time snapshot is the fallback.
        match issues.get(&link.src) {
            Some(blocker) => !blocker.is_done(),
            None => link
                .other_status_category
                .is_some_and(|category| category != crate::domain::StatusCategory::Done),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusCategory;
    use crate::engine::partition::partition;
    use crate::engine::test_support::{done_issue, issue, issue_map, linked_pair};

    fn classify_all(issues: &BTreeMap<IssueKey, Issue>, config: &Config) -> BTreeMap<IssueKey, Analysis> {
        let (components, orphans) = partition(issues);
        classify(issues, &components, &orphans, config)
    }

    #[test]
    fn roles_follow_link_directions() {
        let (blocker, blocked) = linked_pair("ABC-1", "ABC-2", "Blocks");
        let issues = issue_map(vec![blocker, blocked, issue("ABC-3", "Task")]);
        let analyses = classify_all(&issues, &Config::default());

        let a1 = &analyses[&IssueKey::from("ABC-1")];
        assert!(a1.root && !a1.leaf && !a1.orphan);

        let a2 = &analyses[&IssueKey::from("ABC-2")];
        assert!(a2.leaf && !a2.root && !a2.orphan);

        let a3 = &analyses[&IssueKey::from("ABC-3")];
        assert!(a3.root && a3.leaf && a3.orphan);
        assert!(a3.warnings.contains(&Warning::Orphaned));
    }

    #[test]
    fn done_issue_blocked_by_open_work_is_flagged() {
        let (blocker, blocked) = linked_pair("ABC-1", "ABC-2", "Blocks");
        // ABC-2 is done but its blocker ABC-1 is still to do.
        let blocked = Issue {
            status: "Done".to_string(),
            status_category: StatusCategory::Done,
            ..blocked
        };
        let issues = issue_map(vec![blocker, blocked]);
        let analyses = classify_all(&issues, &Config::default());

        assert!(analyses[&IssueKey::from("ABC-2")]
            .warnings
            .contains(&Warning::DoneButBlocked));
        assert!(analyses[&IssueKey::from("ABC-1")]
            .warnings
            .is_empty());
    }

    #[test]
    fn done_issue_with_done_blocker_is_clean() {
        let (blocker, blocked) = linked_pair("ABC-1", "ABC-2", "Blocks");
        let blocker = done_issue(blocker);
        let blocked = done_issue(blocked);
        let issues = issue_map(vec![blocker, blocked]);
        let analyses = classify_all(&issues, &Config::default());

        assert!(!analyses[&IssueKey::from("ABC-2")]
            .warnings
            .contains(&Warning::DoneButBlocked));
    }

    #[test]
    fn root_of_disallowed_type_is_flagged() {
        let (blocker, blocked) = linked_pair("ABC-1", "ABC-2", "Blocks");
        // Default config allows Initiative roots; make the root a Task.
        let blocker = Issue {
            issue_type: "Task".to_string(),
            ..blocker
        };
        let issues = issue_map(vec![blocker, blocked]);
        let analyses = classify_all(&issues, &Config::default());

        assert!(analyses[&IssueKey::from("ABC-1")]
            .warnings
            .contains(&Warning::InvalidRoot));
    }

    #[test]
    fn component_without_an_allowed_type_flags_every_member() {
        let (a, b) = linked_pair("ABC-1", "ABC-2", "Blocks");
        let a = Issue {
            issue_type: "Task".to_string(),
            ..a
        };
        let issues = issue_map(vec![a, b]);

        let mut config = Config::default();
        config.allowed_graph_issue_types = vec!["Initiative".to_string()];
        let analyses = classify_all(&issues, &config);

        assert!(analyses[&IssueKey::from("ABC-1")]
            .warnings
            .contains(&Warning::InvalidGraph));
        assert!(analyses[&IssueKey::from("ABC-2")]
            .warnings
            .contains(&Warning::InvalidGraph));
    }
}
