//! The graph engine: fetch, tidy, partition, analyse, score.
//!
//! [`Engine`] owns one run's issue set and everything derived from it. A run
//! is populate → (reporting reads the public state) → optionally store. All
//! analysis is synchronous and in-memory; only the fetch phase and the cache
//! touch the outside world.

mod analysis;
mod fetch;
mod partition;
mod score;
mod tidy;
mod toposort;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{Analysis, Graph, Issue, IssueKey};
use crate::error::Result;
use crate::jira::IssueSource;
use crate::store::DataStore;

/// Cache entry name for the issue collection.
const ISSUES_COLLECTION: &str = "issues";

/// Cache entry name for the derived graph collection.
const GRAPHS_COLLECTION: &str = "graphs";

/// One run's issue universe and its structural analysis.
///
/// Issues are immutable once tidied; every derived fact lives in the
/// side collections (`graphs`, `orphans`, `analyses`).
pub struct Engine {
    source: Box<dyn IssueSource>,
    store: Option<Box<dyn DataStore>>,
    config: Config,

    /// All fetched issues, keyed and ordered by issue key.
    pub issues: BTreeMap<IssueKey, Issue>,

    /// Connected components of size two or more.
    pub graphs: Vec<Graph>,

    /// Issues with no surviving connections at all.
    pub orphans: Vec<IssueKey>,

    /// Structural analysis per issue key.
    pub analyses: BTreeMap<IssueKey, Analysis>,
}

impl Engine {
    /// Create an engine over an issue source, an optional cache, and the run
    /// configuration.
    pub fn new(
        source: Box<dyn IssueSource>,
        store: Option<Box<dyn DataStore>>,
        config: Config,
    ) -> Self {
        Self {
            source,
            store,
            config,
            issues: BTreeMap::new(),
            graphs: Vec::new(),
            orphans: Vec::new(),
            analyses: BTreeMap::new(),
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load issues from the cache if possible, fetch otherwise, then tidy
    /// and analyse.
    pub async fn populate(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            if let Some(value) = store.read(ISSUES_COLLECTION).await? {
                self.issues = serde_json::from_value(value)?;
                info!(count = self.issues.len(), "loaded issues from cache");
            }
        }
        if self.issues.is_empty() {
            return self.refresh().await;
        }
        tidy::tidy(&mut self.issues);
        self.analyse();
        Ok(())
    }

    /// Fetch the issue set from the source, ignoring any cached state, then
    /// tidy and analyse.
    pub async fn refresh(&mut self) -> Result<()> {
        self.config.validate_for_fetch()?;
        self.issues = fetch::fetch_issues(self.source.as_ref(), &self.config).await?;
        tidy::tidy(&mut self.issues);
        self.analyse();
        Ok(())
    }

    /// Partition, classify, sort, and score the current issue set.
    fn analyse(&mut self) {
        let (components, orphans) = partition::partition(&self.issues);
        debug!(
            graphs = components.len(),
            orphans = orphans.len(),
            "partitioned issue set"
        );

        self.analyses = analysis::classify(&self.issues, &components, &orphans, &self.config);

        let weights = &self.config.priority_weights;
        let issues = &self.issues;
        let weight_of = |key: &IssueKey| {
            issues
                .get(key)
                .map_or(0, |issue| weights.weight(issue.priority))
        };

        self.graphs = components
            .into_iter()
            .map(|component| {
                let topo = toposort::toposort(&component.nodes, &component.edges);
                let acyclic = topo.is_some();
                if let Some(order) = &topo {
                    let scores = score::propagate(order, &component.edges, &weight_of);
                    for (key, node_scores) in scores {
                        if let Some(analysis) = self.analyses.get_mut(&key) {
                            analysis.score = Some(node_scores.weight);
                            analysis.upstream_score = Some(node_scores.upstream);
                            analysis.downstream_score = Some(node_scores.downstream);
                            analysis.total_score = Some(node_scores.total);
                        }
                    }
                }
                Graph {
                    label: graph_label(&component),
                    nodes: component.nodes,
                    edges: component.edges,
                    acyclic,
                    topo_order: topo,
                }
            })
            .collect();

        // An isolated issue is its own trivial DAG.
        for key in &orphans {
            if let Some(analysis) = self.analyses.get_mut(key) {
                let weight = weight_of(key);
                analysis.score = Some(weight);
                analysis.upstream_score = Some(weight);
                analysis.downstream_score = Some(weight);
                analysis.total_score = Some(weight);
            }
        }
        self.orphans = orphans;
    }

    /// Persist the issue and graph collections through the cache.
    pub async fn persist(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store
            .write(ISSUES_COLLECTION, &serde_json::to_value(&self.issues)?)
            .await?;
        store
            .write(GRAPHS_COLLECTION, &serde_json::to_value(&self.graphs)?)
            .await?;
        Ok(())
    }

    /// Drop in-memory state and delete the cached collections.
    pub async fn cleanup(&mut self) -> Result<()> {
        self.issues.clear();
        self.graphs.clear();
        self.orphans.clear();
        self.analyses.clear();
        if let Some(store) = &self.store {
            store.delete(ISSUES_COLLECTION).await?;
            store.delete(GRAPHS_COLLECTION).await?;
        }
        Ok(())
    }

    /// True if the issue carries one of the configured tracking labels.
    pub fn is_tracked(&self, issue: &Issue) -> bool {
        issue
            .labels
            .iter()
            .any(|label| self.config.tracked_issue_labels.contains(label))
    }

    /// Issues with at least one warning, in key order.
    pub fn warning_issues(&self) -> Vec<&Issue> {
        self.analyses
            .iter()
            .filter(|(_, analysis)| !analysis.warnings.is_empty())
            .filter_map(|(key, _)| self.issues.get(key))
            .collect()
    }

    /// Root issues, in key order.
    pub fn root_issues(&self) -> Vec<&Issue> {
        self.analyses
            .iter()
            .filter(|(_, analysis)| analysis.root)
            .filter_map(|(key, _)| self.issues.get(key))
            .collect()
    }

    /// Orphan issues, in key order.
    pub fn orphan_issues(&self) -> Vec<&Issue> {
        self.orphans
            .iter()
            .filter_map(|key| self.issues.get(key))
            .collect()
    }

    /// Tracked issues, in key order.
    pub fn tracked_issues(&self) -> Vec<&Issue> {
        self.issues
            .values()
            .filter(|issue| self.is_tracked(issue))
            .collect()
    }

    /// Issues ranked by total score, highest first; unscored issues are
    /// excluded. Ties break on key order.
    pub fn ranked_issues(&self) -> Vec<(&Issue, u64)> {
        let mut ranked: Vec<(&Issue, u64)> = self
            .analyses
            .iter()
            .filter_map(|(key, analysis)| {
                let total = analysis.total_score?;
                Some((self.issues.get(key)?, total))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.key.cmp(&b.0.key)));
        ranked
    }

    /// Graphs containing a cycle.
    pub fn cyclic_graphs(&self) -> Vec<&Graph> {
        self.graphs.iter().filter(|graph| !graph.acyclic).collect()
    }
}

/// A graph is labelled by its sorted root keys; a cyclic component without
/// any root falls back to its smallest node key.
fn graph_label(component: &partition::Component) -> String {
    let targets: std::collections::BTreeSet<&IssueKey> =
        component.edges.iter().map(|edge| &edge.dst).collect();
    let roots: Vec<&str> = component
        .nodes
        .iter()
        .filter(|node| !targets.contains(node))
        .map(IssueKey::as_str)
        .collect();
    if roots.is_empty() {
        component
            .nodes
            .first()
            .map(IssueKey::as_str)
            .unwrap_or_default()
            .to_string()
    } else {
        roots.join(", ")
    }
}
