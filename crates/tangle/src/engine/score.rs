//! Priority-weight propagation over an acyclic component.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Edge, IssueKey};

/// Propagated scores for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeScores {
    /// Own priority weight.
    pub weight: u64,
    /// Weight of the node plus everything that depends on it.
    pub upstream: u64,
    /// Weight of the node plus everything it gates.
    pub downstream: u64,
    /// Combined ranking score.
    pub total: u64,
}

/// Compute upstream, downstream, and total scores for an acyclic component.
///
/// `topo` must order every edge's `src` before its `dst` (the toposort
/// output). Both propagations are single passes over that order, so the
/// whole computation is memoized by construction:
///
/// - downstream, sinks first: `down(n) = w(n) + Σ down(m)` over edges `n→m`
/// - upstream, sources first: `up(n) = w(n) + Σ up(m)` over edges `m→n`
/// - `total(n) = w(n) + Σ up(l)` over leaf descendants `l` of `n`
///   `+ Σ down(r)` over root ancestors `r` of `n`
///
/// Descendant and ancestor sets exclude the node itself, so an isolated
/// node degenerates to `total = weight`. A node sitting on many high-value
/// paths scores high whether it gates much future work or leans on much
/// foundational work.
pub(crate) fn propagate(
    topo: &[IssueKey],
    edges: &[Edge],
    weight_of: impl Fn(&IssueKey) -> u64,
) -> BTreeMap<IssueKey, NodeScores> {
    let mut out_adj: BTreeMap<&IssueKey, Vec<&IssueKey>> =
        topo.iter().map(|n| (n, Vec::new())).collect();
    let mut in_adj: BTreeMap<&IssueKey, Vec<&IssueKey>> =
        topo.iter().map(|n| (n, Vec::new())).collect();
    for edge in edges {
        if out_adj.contains_key(&edge.dst) {
            if let Some(out) = out_adj.get_mut(&edge.src) {
                out.push(&edge.dst);
            }
            if let Some(inn) = in_adj.get_mut(&edge.dst) {
                inn.push(&edge.src);
            }
        }
    }

    let weights: BTreeMap<&IssueKey, u64> = topo.iter().map(|n| (n, weight_of(n))).collect();

    // Downstream and leaf-descendant sets, sinks first.
    let mut downstream: BTreeMap<&IssueKey, u64> = BTreeMap::new();
    let mut leaf_descendants: BTreeMap<&IssueKey, BTreeSet<&IssueKey>> = BTreeMap::new();
    for node in topo.iter().rev() {
        let mut down = weights[node];
        let mut leaves: BTreeSet<&IssueKey> = BTreeSet::new();
        for &next in &out_adj[node] {
            down += downstream[next];
            if out_adj[next].is_empty() {
                leaves.insert(next);
            }
            leaves.extend(&leaf_descendants[next]);
        }
        downstream.insert(node, down);
        leaf_descendants.insert(node, leaves);
    }

    // Upstream and root-ancestor sets, sources first.
    let mut upstream: BTreeMap<&IssueKey, u64> = BTreeMap::new();
    let mut root_ancestors: BTreeMap<&IssueKey, BTreeSet<&IssueKey>> = BTreeMap::new();
    for node in topo {
        let mut up = weights[node];
        let mut roots: BTreeSet<&IssueKey> = BTreeSet::new();
        for &prev in &in_adj[node] {
            up += upstream[prev];
            if in_adj[prev].is_empty() {
                roots.insert(prev);
            }
            roots.extend(&root_ancestors[prev]);
        }
        upstream.insert(node, up);
        root_ancestors.insert(node, roots);
    }

    topo.iter()
        .map(|node| {
            let total = weights[node]
                + leaf_descendants[node]
                    .iter()
                    .map(|l| upstream[*l])
                    .sum::<u64>()
                + root_ancestors[node]
                    .iter()
                    .map(|r| downstream[*r])
                    .sum::<u64>();
            (
                node.clone(),
                NodeScores {
                    weight: weights[node],
                    upstream: upstream[node],
                    downstream: downstream[node],
                    total,
                },
            )
        })
        .collect()
}
