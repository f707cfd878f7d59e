//! Shared builders and a scripted issue source for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tangle::config::Config;
use tangle::domain::{Issue, IssueKey, Link, LinkDirection, Priority, StatusCategory};
use tangle::error::{Error, Result};
use tangle::jira::IssueSource;

pub fn issue(key: &str, issue_type: &str) -> Issue {
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

pub fn with_priority(issue: Issue, priority: Priority) -> Issue {
    Issue { priority, ..issue }
}

pub fn with_status(issue: Issue, status: &str, category: StatusCategory) -> Issue {
    Issue {
        status: status.to_string(),
        status_category: category,
        ..issue
    }
}

/// Attach the symmetric link pair for "blocker blocks blocked".
pub fn link(blocker: &mut Issue, blocked: &mut Issue, link_type: &str) {
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

/// An [`IssueSource`] serving a fixed universe of issues.
///
/// The seed query returns the configured seed keys; key and epic lookups
/// resolve against the universe. Every call is counted so tests can assert
/// on round trips.
pub struct MockSource {
    universe: BTreeMap<IssueKey, Issue>,
    seeds: Vec<IssueKey>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockSource {
    pub fn new(seeds: &[&str], universe: Vec<Issue>) -> Self {
        Self {
            universe: universe
                .into_iter()
                .map(|issue| (issue.key.clone(), issue))
                .collect(),
            seeds: seeds.iter().copied().map(IssueKey::from).collect(),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// A source that errors on any request, for cache-only tests.
    pub fn unreachable() -> Self {
        Self {
            universe: BTreeMap::new(),
            seeds: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn checked(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Source("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IssueSource for MockSource {
    async fn issues_by_query(&self, _jql: &str) -> Result<Vec<Issue>> {
        self.checked()?;
        Ok(self
            .seeds
            .iter()
            .filter_map(|key| self.universe.get(key).cloned())
            .collect())
    }

    async fn issues_by_key(&self, keys: &[IssueKey]) -> Result<Vec<Issue>> {
        self.checked()?;
        Ok(keys
            .iter()
            .filter_map(|key| self.universe.get(key).cloned())
            .collect())
    }

    async fn issues_by_epic_key(&self, epic_keys: &[IssueKey]) -> Result<Vec<Issue>> {
        self.checked()?;
        Ok(self
            .universe
            .values()
            .filter(|issue| {
                issue
                    .epic_key
                    .as_ref()
                    .is_some_and(|epic| epic_keys.contains(epic))
            })
            .cloned()
            .collect())
    }
}

/// A config that passes fetch validation and skips the file cache.
pub fn test_config() -> Config {
    Config {
        server: "https://example.atlassian.net/".to_string(),
        query: "project = ABC".to_string(),
        path: None,
        ..Config::default()
    }
}
