//! Connected-component partitioning of the issue set.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Edge, Issue, IssueKey};

/// A maximal connected component, before cycle analysis.
#[derive(Debug, Clone)]
pub(crate) struct Component {
    /// Member keys, sorted.
    pub nodes: Vec<IssueKey>,
    /// Canonical directed edges, sorted and deduplicated.
    pub edges: Vec<Edge>,
}

/// Partition the issue set into connected components.
///
/// Traversal walks links in both directions so a component is everything
/// mutually reachable, but the recorded edge list keeps the inward direction
/// only, which gives each component a single consistent DAG orientation.
/// Components with fewer than two nodes are returned separately as orphans.
///
/// Uses an explicit stack rather than recursion so arbitrarily large
/// components cannot exhaust the call stack. O(issues + links).
pub(crate) fn partition(
    issues: &BTreeMap<IssueKey, Issue>,
) -> (Vec<Component>, Vec<IssueKey>) {
    let mut visited: BTreeSet<&IssueKey> = BTreeSet::new();
    let mut components = Vec::new();
    let mut orphans = Vec::new();

    // BTreeMap iteration order seeds each component deterministically.
    for seed in issues.keys() {
        if visited.contains(seed) {
            continue;
        }

        let mut nodes: Vec<IssueKey> = Vec::new();
        let mut stack: Vec<&IssueKey> = vec![seed];
        while let Some(key) = stack.pop() {
            if !visited.insert(key) {
                continue;
            }
            nodes.push(key.clone());
            for link in &issues[key].links {
                let other = link.other_key();
                if issues.contains_key(other) && !visited.contains(other) {
                    stack.push(other);
                }
            }
        }
        nodes.sort();

        if nodes.len() < 2 {
            orphans.extend(nodes);
            continue;
        }

        let mut edges: Vec<Edge> = nodes
            .iter()
            .flat_map(|key| {
                issues[key].inward_links().map(|link| Edge {
                    src: link.src.clone(),
                    dst: link.dst.clone(),
                    link_type: link.link_type.clone(),
                })
            })
            .collect();
        edges.sort();
        edges.dedup();

        components.push(Component { nodes, edges });
    }

    (components, orphans)
}
