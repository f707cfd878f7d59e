//! Builders shared by the engine unit tests.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use crate::domain::{Issue, IssueKey, Link, LinkDirection, Priority, StatusCategory};

/// A bare issue with no links. Type defaults matter: helpers below create
/// blockers as `Initiative` so default-config components validate cleanly.
pub(crate) fn issue(key: &str, issue_type: &str) -> Issue {
    let key = IssueKey::from(key);
    Issue {
        summary: format!("Summary for {key}"),
        issue_type: issue_type.to_string(),
        project_key: key.prefix().to_string(),
        priority: Priority::Medium,
        labels: Vec::new(),
        status: "To Do".to_string(),
        status_category: StatusCategory::ToDo,
        epic_key: None,
        parent_key: None,
        updated: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        links: Vec::new(),
        key,
    }
}

/// Move an issue into the terminal category.
pub(crate) fn done_issue(issue: Issue) -> Issue {
    Issue {
        status: "Done".to_string(),
        status_category: StatusCategory::Done,
        ..issue
    }
}

/// Attach the symmetric link pair for "blocker blocks blocked".
pub(crate) fn link_issues(blocker: &mut Issue, blocked: &mut Issue, link_type: &str) {
    blocker.links.push(Link {
        link_type: link_type.to_string(),
        direction: LinkDirection::Outward,
        src: blocker.key.clone(),
        dst: blocked.key.clone(),
        label: "blocks".to_string(),
        other_status: Some(blocked.status.clone()),
        other_status_category: Some(blocked.status_category),
    });
    blocked.links.push(Link {
        link_type: link_type.to_string(),
        direction: LinkDirection::Inward,
        src: blocker.key.clone(),
        dst: blocked.key.clone(),
        label: "is blocked by".to_string(),
        other_status: Some(blocker.status.clone()),
        other_status_category: Some(blocker.status_category),
    });
}

/// An `Initiative` blocking a `Task`, linked symmetrically.
pub(crate) fn linked_pair(blocker_key: &str, blocked_key: &str, link_type: &str) -> (Issue, Issue) {
    let mut blocker = issue(blocker_key, "Initiative");
    let mut blocked = issue(blocked_key, "Task");
    link_issues(&mut blocker, &mut blocked, link_type);
    (blocker, blocked)
}

/// Key the issues into the map shape the engine works over.
pub(crate) fn issue_map(issues: Vec<Issue>) -> BTreeMap<IssueKey, Issue> {
    issues
        .into_iter()
        .map(|issue| (issue.key.clone(), issue))
        .collect()
}
