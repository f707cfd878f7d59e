//! Cycle detection and topological ordering for one component.

use std::collections::BTreeMap;

use crate::domain::{Edge, IssueKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored and placed in the order.
    Black,
}

enum Visit<'a> {
    Enter(&'a IssueKey),
    Exit(&'a IssueKey),
}

/// Topologically sort a component's nodes, or detect that it is cyclic.
///
/// Returns an order in which every edge's `src` precedes its `dst`, or
/// `None` when the edge set contains a cycle. Nodes and edges are expected
/// pre-sorted (the partition phase guarantees this), which makes the chosen
/// order deterministic when several valid orders exist.
///
/// Three-color DFS: meeting a gray node again is a back edge onto the
/// current path, i.e. a cycle. O(nodes + edges).
pub(crate) fn toposort(nodes: &[IssueKey], edges: &[Edge]) -> Option<Vec<IssueKey>> {
    let mut adjacency: BTreeMap<&IssueKey, Vec<&IssueKey>> =
        nodes.iter().map(|n| (n, Vec::new())).collect();
    for edge in edges {
        if let Some(out) = adjacency.get_mut(&edge.src) {
            out.push(&edge.dst);
        }
    }

    let mut colors: BTreeMap<&IssueKey, Color> =
        nodes.iter().map(|n| (n, Color::White)).collect();
    let mut order: Vec<IssueKey> = Vec::with_capacity(nodes.len());
    let mut stack: Vec<Visit<'_>> = Vec::new();

    for start in nodes {
        if colors[start] != Color::White {
            continue;
        }
        stack.push(Visit::Enter(start));
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(node) => {
                    // A node queued twice pops Black the second time.
                    if colors[node] != Color::White {
                        continue;
                    }
                    colors.insert(node, Color::Gray);
                    stack.push(Visit::Exit(node));
                    for &next in &adjacency[node] {
                        match colors[next] {
                            Color::White => stack.push(Visit::Enter(next)),
                            Color::Gray => return None,
                            Color::Black => {}
                        }
                    }
                }
                Visit::Exit(node) => {
                    colors.insert(node, Color::Black);
                    order.push(node.clone());
                }
            }
        }
    }

    // Post-order collects sinks first; reverse to put sources first.
    order.reverse();
    Some(order)
}
