//! Wire types for the Jira REST API and their mapping to domain records.
//!
//! The shapes here mirror `/rest/api/2/search` responses. Mapping fills in
//! the symmetric link representation the engine expects: an inward link
//! carries `src` = the other issue and `dst` = the owning issue, an outward
//! link the reverse.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Issue, IssueKey, Link, LinkDirection, Priority, StatusCategory};
use crate::error::{Error, Result};

/// Issue fields requested from the search API, besides any configured custom
/// fields.
pub(super) const QUERY_FIELDS: &[&str] = &[
    "summary",
    "issuetype",
    "project",
    "priority",
    "status",
    "labels",
    "issuelinks",
    "updated",
];

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(rename = "startAt")]
    pub start_at: usize,
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<WireIssue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireIssue {
    pub key: String,
    pub fields: WireFields,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireFields {
    pub summary: String,
    pub issuetype: Named,
    pub project: WireProject,
    pub priority: Option<Named>,
    pub status: WireStatus,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub issuelinks: Vec<WireLink>,
    pub updated: String,
    /// Catch-all for configured custom fields (epic link, parent link).
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireProject {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireStatus {
    pub name: String,
    #[serde(rename = "statusCategory")]
    pub status_category: Named,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireLink {
    #[serde(rename = "type")]
    pub link_type: WireLinkType,
    #[serde(rename = "inwardIssue")]
    pub inward_issue: Option<WireLinkedIssue>,
    #[serde(rename = "outwardIssue")]
    pub outward_issue: Option<WireLinkedIssue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireLinkType {
    pub name: String,
    pub inward: String,
    pub outward: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireLinkedIssue {
    pub key: String,
    pub fields: Option<WireLinkedFields>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireLinkedFields {
    pub status: Option<WireStatus>,
}

fn parse_status_category(name: &str) -> StatusCategory {
    // Jira also reports the machine keys ("new", "indeterminate", "done")
    // depending on API version.
    match name {
        "In Progress" | "indeterminate" => StatusCategory::InProgress,
        "Done" | "done" => StatusCategory::Done,
        _ => StatusCategory::ToDo,
    }
}

fn parse_priority(named: Option<&Named>) -> Priority {
    match named.map(|n| n.name.as_str()) {
        Some("Highest") => Priority::Highest,
        Some("High") => Priority::High,
        Some("Low") => Priority::Low,
        Some("Lowest") => Priority::Lowest,
        _ => Priority::Medium,
    }
}

fn parse_updated(raw: &str) -> Result<DateTime<Utc>> {
    // Jira timestamps look like `2024-03-01T09:30:00.000+0000`.
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| Error::Source(format!("unparseable updated timestamp '{raw}': {err}")))
}

fn custom_key(fields: &WireFields, field: Option<&str>) -> Option<IssueKey> {
    let value = fields.custom.get(field?)?;
    value.as_str().map(IssueKey::from)
}

impl WireIssue {
    /// Map a wire issue to the domain record.
    pub(super) fn into_domain(
        self,
        epic_key_custom_field: Option<&str>,
        parent_key_custom_field: Option<&str>,
    ) -> Result<Issue> {
        let owner = IssueKey::from(self.key);
        let mut links = Vec::with_capacity(self.fields.issuelinks.len());
        for wire_link in &self.fields.issuelinks {
            if let Some(other) = &wire_link.inward_issue {
                links.push(map_link(wire_link, other, &owner, LinkDirection::Inward));
            }
            if let Some(other) = &wire_link.outward_issue {
                links.push(map_link(wire_link, other, &owner, LinkDirection::Outward));
            }
        }

        let epic_key = custom_key(&self.fields, epic_key_custom_field);
        let parent_key = custom_key(&self.fields, parent_key_custom_field);
        let updated = parse_updated(&self.fields.updated)?;

        Ok(Issue {
            key: owner,
            summary: self.fields.summary,
            issue_type: self.fields.issuetype.name,
            project_key: self.fields.project.key,
            priority: parse_priority(self.fields.priority.as_ref()),
            labels: self.fields.labels,
            status: self.fields.status.name,
            status_category: parse_status_category(&self.fields.status.status_category.name),
            epic_key,
            parent_key,
            updated,
            links,
        })
    }
}

fn map_link(
    wire_link: &WireLink,
    other: &WireLinkedIssue,
    owner: &IssueKey,
    direction: LinkDirection,
) -> Link {
    let other_key = IssueKey::from(other.key.as_str());
    let (src, dst, label) = match direction {
        LinkDirection::Inward => (other_key, owner.clone(), wire_link.link_type.inward.clone()),
        LinkDirection::Outward => (owner.clone(), other_key, wire_link.link_type.outward.clone()),
    };
    let status = other.fields.as_ref().and_then(|f| f.status.as_ref());
    Link {
        link_type: wire_link.link_type.name.clone(),
        direction,
        src,
        dst,
        label,
        other_status: status.map(|s| s.name.clone()),
        other_status_category: status.map(|s| parse_status_category(&s.status_category.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "key": "ABC-1",
        "fields": {
            "summary": "Roll out the new billing flow",
            "issuetype": {"name": "Initiative"},
            "project": {"key": "ABC"},
            "priority": {"name": "High"},
            "status": {"name": "To Do", "statusCategory": {"name": "To Do"}},
            "labels": ["strategic"],
            "updated": "2024-03-01T09:30:00.000+0000",
            "customfield_10008": "ABC-900",
            "issuelinks": [
                {
                    "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                    "outwardIssue": {
                        "key": "ABC-2",
                        "fields": {"status": {"name": "Done", "statusCategory": {"name": "Done"}}}
                    }
                },
                {
                    "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                    "inwardIssue": {"key": "ABC-3"}
                }
            ]
        }
    }"#;

    #[test]
    fn maps_a_full_issue() {
        let wire: WireIssue = serde_json::from_str(SAMPLE).unwrap();
        let issue = wire.into_domain(Some("customfield_10008"), None).unwrap();

        assert_eq!(issue.key.as_str(), "ABC-1");
        assert_eq!(issue.issue_type, "Initiative");
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.status_category, StatusCategory::ToDo);
        assert_eq!(issue.epic_key, Some(IssueKey::from("ABC-900")));
        assert_eq!(issue.parent_key, None);
        assert_eq!(issue.links.len(), 2);
    }

    #[test]
    fn outward_link_keeps_owner_as_src() {
        let wire: WireIssue = serde_json::from_str(SAMPLE).unwrap();
        let issue = wire.into_domain(None, None).unwrap();

        let outward = &issue.links[0];
        assert_eq!(outward.direction, LinkDirection::Outward);
        assert_eq!(outward.src.as_str(), "ABC-1");
        assert_eq!(outward.dst.as_str(), "ABC-2");
        assert_eq!(outward.label, "blocks");
        assert_eq!(outward.other_status_category, Some(StatusCategory::Done));
    }

    #[test]
    fn inward_link_keeps_owner_as_dst() {
        let wire: WireIssue = serde_json::from_str(SAMPLE).unwrap();
        let issue = wire.into_domain(None, None).unwrap();

        let inward = &issue.links[1];
        assert_eq!(inward.direction, LinkDirection::Inward);
        assert_eq!(inward.src.as_str(), "ABC-3");
        assert_eq!(inward.dst.as_str(), "ABC-1");
        assert_eq!(inward.label, "is blocked by");
        assert_eq!(inward.other_status, None);
    }

    #[test]
    fn unknown_priority_defaults_to_medium() {
        assert_eq!(parse_priority(None), Priority::Medium);
        let named = Named {
            name: "Blocker".to_string(),
        };
        assert_eq!(parse_priority(Some(&named)), Priority::Medium);
    }
}
