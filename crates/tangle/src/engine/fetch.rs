//! Link-following fetch traversal.
//!
//! Materializes the full transitively-linked issue set from a seed query,
//! batching lookups so each traversal wave costs one round of requests.
//! State is threaded explicitly through [`fetch_issues`]; there is no hidden
//! shared accumulator.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, trace};

use crate::config::Config;
use crate::domain::{Issue, IssueKey, Link, LinkDirection, StatusCategory};
use crate::error::Result;
use crate::jira::IssueSource;

/// Link type used for the synthetic epic-child relationship.
const EPIC_LINK_TYPE: &str = "Epic";

fn prefix_allowed(config: &Config, key: &IssueKey) -> bool {
    config.allowed_issue_key_prefixes.is_empty()
        || config
            .allowed_issue_key_prefixes
            .iter()
            .any(|prefix| key.prefix() == prefix)
}

fn category_followed(config: &Config, category: StatusCategory) -> bool {
    config.follow_status_categories.contains(&category)
}

/// Keep a link only if its type is followed and at least one endpoint's
/// status category is still worth exploring. An endpoint with no status
/// snapshot cannot be ruled out, so it counts as followable.
fn keep_link(config: &Config, issue_category: StatusCategory, link: &Link) -> bool {
    if !config.follow_link_types.contains(&link.link_type) {
        return false;
    }
    category_followed(config, issue_category)
        || link
            .other_status_category
            .is_none_or(|category| category_followed(config, category))
}

/// Fetch the seed query and every transitively linked issue that passes the
/// policy filters.
///
/// Each wave processes the newly seen issues, collects link targets not yet
/// fetched, and resolves them in one batched lookup. Termination is
/// guaranteed: unvisited keys only come from newly kept issues, so the set
/// grows monotonically inside a finite universe. Any source error aborts the
/// whole fetch.
pub(crate) async fn fetch_issues(
    source: &dyn IssueSource,
    config: &Config,
) -> Result<BTreeMap<IssueKey, Issue>> {
    let mut issues: BTreeMap<IssueKey, Issue> = BTreeMap::new();
    let mut dropped: BTreeSet<IssueKey> = BTreeSet::new();

    info!(query = %config.query, "fetching initial issues");
    let mut frontier = source.issues_by_query(&config.query).await?;

    while !frontier.is_empty() {
        debug!(new = frontier.len(), total = issues.len(), "reviewing issue links");
        let mut unvisited: BTreeSet<IssueKey> = BTreeSet::new();
        let mut epic_keys: Vec<IssueKey> = Vec::new();

        for mut issue in frontier.drain(..) {
            if issues.contains_key(&issue.key) || dropped.contains(&issue.key) {
                trace!(key = %issue.key, "already seen");
                continue;
            }
            if !prefix_allowed(config, &issue.key) {
                trace!(key = %issue.key, "dropped by prefix filter");
                dropped.insert(issue.key.clone());
                continue;
            }

            let category = issue.status_category;
            issue.links.retain(|link| keep_link(config, category, link));

            // An unfollowed issue with only outward links would only ever be
            // spidered *from*; keep it out so terminal leaves do not drag in
            // their whole neighborhood.
            let only_outward = !issue.links.is_empty()
                && issue
                    .links
                    .iter()
                    .all(|link| link.direction == LinkDirection::Outward);
            if only_outward && !category_followed(config, category) {
                trace!(key = %issue.key, "dropped terminal issue with only outward links");
                dropped.insert(issue.key.clone());
                continue;
            }

            if config.epic_issue_types.contains(&issue.issue_type) {
                epic_keys.push(issue.key.clone());
            }

            for link in &issue.links {
                let other = link.other_key();
                if !issues.contains_key(other)
                    && !dropped.contains(other)
                    && prefix_allowed(config, other)
                {
                    trace!(src = %link.src, label = %link.label, dst = %link.dst, "not yet fetched");
                    unvisited.insert(other.clone());
                }
            }

            trace!(key = %issue.key, "found");
            issues.insert(issue.key.clone(), issue);
        }

        let mut next: Vec<Issue> = Vec::new();

        if !epic_keys.is_empty() {
            info!(epics = epic_keys.len(), "fetching epic children");
            for child in source.issues_by_epic_key(&epic_keys).await? {
                attach_epic_links(&mut issues, &mut next, child);
            }
        }

        unvisited.retain(|key| !issues.contains_key(key));
        for issue in &next {
            unvisited.remove(&issue.key);
        }
        if !unvisited.is_empty() {
            info!(count = unvisited.len(), "fetching linked issues");
            let keys: Vec<IssueKey> = unvisited.into_iter().collect();
            next.extend(source.issues_by_key(&keys).await?);
        }
        frontier = next;
    }

    info!(total = issues.len(), "fetch complete");
    Ok(issues)
}

/// Inject the synthetic reciprocal links between an epic and one child, so
/// the child lands in the epic's connected component. The epic is blocked by
/// its children: the canonical edge runs child → epic.
fn attach_epic_links(
    issues: &mut BTreeMap<IssueKey, Issue>,
    next: &mut Vec<Issue>,
    mut child: Issue,
) {
    let Some(epic_key) = child.epic_key.clone() else {
        trace!(key = %child.key, "epic child without epic key, skipping link injection");
        return;
    };
    let Some(epic) = issues.get_mut(&epic_key) else {
        return;
    };

    epic.links.push(Link {
        link_type: EPIC_LINK_TYPE.to_string(),
        direction: LinkDirection::Inward,
        src: child.key.clone(),
        dst: epic_key.clone(),
        label: "is delivered by".to_string(),
        other_status: Some(child.status.clone()),
        other_status_category: Some(child.status_category),
    });

    let delivers = Link {
        link_type: EPIC_LINK_TYPE.to_string(),
        direction: LinkDirection::Outward,
        src: child.key.clone(),
        dst: epic_key,
        label: "delivers".to_string(),
        other_status: None,
        other_status_category: None,
    };

    // A child already fetched just gains the link; a new child joins the
    // next wave and goes through the normal filters.
    if let Some(existing) = issues.get_mut(&child.key) {
        existing.links.push(delivers);
    } else {
        child.links.push(delivers);
        next.push(child);
    }
}
