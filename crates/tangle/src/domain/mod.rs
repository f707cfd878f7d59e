//! Domain types for the issue dependency graph.
//!
//! This module contains the core domain types: issue keys, issues and their
//! typed links as fetched from Jira, and the derived graph/analysis records
//! produced by the engine.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an issue, e.g. `ABC-123`.
///
/// Ordering is project prefix first, then numeric ordinal, so `ABC-9` sorts
/// before `ABC-10`. Keys that do not have the `PREFIX-123` shape fall back to
/// plain lexicographic ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(pub String);

impl IssueKey {
    /// Create a new issue key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(prefix, ordinal)` if the key is well formed.
    pub fn parts(&self) -> Option<(&str, u64)> {
        let (prefix, ordinal) = self.0.rsplit_once('-')?;
        let ordinal = ordinal.parse().ok()?;
        Some((prefix, ordinal))
    }

    /// The project prefix, e.g. `ABC` for `ABC-123`.
    pub fn prefix(&self) -> &str {
        self.0.rsplit_once('-').map_or(self.0.as_str(), |(p, _)| p)
    }
}

impl PartialOrd for IssueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IssueKey {
    // Sorts ABC-9 before ABC-10. Comparing through the extracted
    // (prefix, ordinal, raw) key keeps the order total even when
    // malformed keys mix with well-formed ones.
    fn cmp(&self, other: &Self) -> Ordering {
        fn sort_key(key: &IssueKey) -> (&str, Option<u64>) {
            (key.prefix(), key.parts().map(|(_, ordinal)| ordinal))
        }
        sort_key(self)
            .cmp(&sort_key(other))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Issue priority as ranked by Jira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Top of the stack.
    Highest,
    /// Important, work on it soon.
    High,
    /// The default.
    Medium,
    /// Nice to have.
    Low,
    /// Bottom of the stack.
    Lowest,
}

/// Coarse lifecycle bucket for an issue's status.
///
/// Used to decide whether the fetch phase keeps spidering past an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Work not started.
    #[serde(rename = "To Do")]
    ToDo,
    /// Work underway.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Terminal category; links out of here are not followed by default.
    Done,
}

/// Direction of a link relative to the issue that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The relationship points into the owning issue; `dst` is the owner.
    /// Inward links are the canonical graph edges.
    Inward,
    /// The relationship points out of the owning issue; `src` is the owner.
    Outward,
}

/// A directed, typed relationship between two issues.
///
/// Every relationship appears twice in the fetched data: outward on one issue
/// and inward on the other. The engine builds graph edges from inward links
/// only, so each edge appears exactly once. `src -> dst` reads "src blocks
/// dst": the destination depends on the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link type name, e.g. `Blocks` or `Epic`.
    pub link_type: String,

    /// Direction relative to the owning issue.
    pub direction: LinkDirection,

    /// Key of the blocking end of the relationship.
    pub src: IssueKey,

    /// Key of the blocked end of the relationship.
    pub dst: IssueKey,

    /// Human-readable description, e.g. `blocks` or `is blocked by`.
    pub label: String,

    /// Status of the other endpoint at fetch time, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_status: Option<String>,

    /// Status category of the other endpoint at fetch time, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_status_category: Option<StatusCategory>,
}

impl Link {
    /// Key of the endpoint that is not the owning issue.
    pub fn other_key(&self) -> &IssueKey {
        match self.direction {
            LinkDirection::Inward => &self.src,
            LinkDirection::Outward => &self.dst,
        }
    }
}

/// A tracked work item as delivered by the issue source.
///
/// Immutable after the tidy phase; all derived state lives in [`Analysis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique key, e.g. `ABC-123`.
    pub key: IssueKey,

    /// One-line summary.
    pub summary: String,

    /// Issue type name, e.g. `Epic` or `Initiative`.
    pub issue_type: String,

    /// Project prefix the issue belongs to.
    pub project_key: String,

    /// Ranked priority.
    pub priority: Priority,

    /// Labels attached to the issue.
    pub labels: Vec<String>,

    /// Raw status name, e.g. `Blocked on vendor`.
    pub status: String,

    /// Coarse lifecycle bucket for the status.
    pub status_category: StatusCategory,

    /// Weak reference to the owning epic, by key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_key: Option<IssueKey>,

    /// Weak reference to a parent issue, by key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<IssueKey>,

    /// Last update timestamp from the issue source.
    pub updated: DateTime<Utc>,

    /// Typed links to other issues, both directions.
    pub links: Vec<Link>,
}

impl Issue {
    /// Iterate over the inward links (the canonical dependency edges).
    pub fn inward_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(|l| l.direction == LinkDirection::Inward)
    }

    /// Iterate over the outward links.
    pub fn outward_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(|l| l.direction == LinkDirection::Outward)
    }

    /// True if the issue's status category is terminal.
    pub fn is_done(&self) -> bool {
        self.status_category == StatusCategory::Done
    }
}

/// Warning codes attached to issues during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Warning {
    /// The issue is marked done but is still blocked by incomplete work.
    DoneButBlocked,
    /// The issue is a root but its type should never sit at the top of a
    /// graph.
    InvalidRoot,
    /// The issue belongs to a component with no issue of an allowed graph
    /// type.
    InvalidGraph,
    /// The issue has no surviving links at all.
    Orphaned,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DoneButBlocked => "doneButBlocked",
            Self::InvalidRoot => "invalidRoot",
            Self::InvalidGraph => "invalidGraph",
            Self::Orphaned => "orphaned",
        };
        write!(f, "{s}")
    }
}

/// Structural analysis for one issue, kept in a side table keyed by issue
/// key rather than mutated into the issue itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// No incoming dependency edge: nothing blocks this issue.
    pub root: bool,

    /// No outgoing dependency edge: this issue blocks nothing.
    pub leaf: bool,

    /// Both root and leaf: an isolated issue.
    pub orphan: bool,

    /// Warning codes attached during analysis.
    pub warnings: BTreeSet<Warning>,

    /// Own priority weight. `None` for members of cyclic components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,

    /// Weight of this issue plus everything that depends on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_score: Option<u64>,

    /// Weight of this issue plus everything it gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream_score: Option<u64>,

    /// Combined ranking score: own weight, plus the upstream scores of all
    /// leaf descendants, plus the downstream scores of all root ancestors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u64>,
}

/// A directed edge in a component, built from an inward link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    /// The blocking issue.
    pub src: IssueKey,

    /// The blocked issue.
    pub dst: IssueKey,

    /// Link type the edge was built from.
    pub link_type: String,
}

/// A connected component of the issue set.
///
/// Nodes are connected via links in either direction; edges carry the
/// canonical (inward) direction only, which gives the component a consistent
/// DAG orientation. Components always have at least two nodes; single issues
/// are orphans and reported separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Derived from the sorted root-node keys.
    pub label: String,

    /// Member issue keys, sorted.
    pub nodes: Vec<IssueKey>,

    /// Directed edge list, sorted; every endpoint is in `nodes`.
    pub edges: Vec<Edge>,

    /// False if the edge set contains a cycle.
    pub acyclic: bool,

    /// Topological order over `nodes` (every edge's `src` precedes its
    /// `dst`). `None` when the component is cyclic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topo_order: Option<Vec<IssueKey>>,
}

impl Graph {
    /// Number of nodes in the component.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}
