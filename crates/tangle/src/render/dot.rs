//! Graphviz source emission.
//!
//! Pure consumer of the engine's output: one `digraph` per component, nodes
//! drawn as small HTML tables with a tracking marker, the key, and a
//! status-category swatch. Turning the source into an image is left to the
//! `dot` binary.

use crate::domain::{Graph, Issue, StatusCategory};
use crate::engine::Engine;

const TODO_COLOR: &str = "#007DBA";
const IN_PROGRESS_COLOR: &str = "#F2A900";
const DONE_COLOR: &str = "#009A44";
const WARNING_COLOR: &str = "#DA291C";
const TRACKED_COLOR: &str = "#009A44";
const PLAIN_COLOR: &str = "#FFFFFF";

fn status_color(engine: &Engine, issue: &Issue) -> &'static str {
    let warned = engine
        .analyses
        .get(&issue.key)
        .is_some_and(|analysis| !analysis.warnings.is_empty());
    if warned {
        return WARNING_COLOR;
    }
    match issue.status_category {
        StatusCategory::ToDo => TODO_COLOR,
        StatusCategory::InProgress => IN_PROGRESS_COLOR,
        StatusCategory::Done => DONE_COLOR,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render one component as Graphviz dot source.
pub fn graph_to_dot(engine: &Engine, graph: &Graph) -> String {
    let mut stmts: Vec<String> = Vec::with_capacity(graph.nodes.len() + graph.edges.len());

    for key in &graph.nodes {
        let Some(issue) = engine.issues.get(key) else {
            continue;
        };
        let (tracked_color, tracked_label) = if engine.is_tracked(issue) {
            (TRACKED_COLOR, "T")
        } else {
            (PLAIN_COLOR, "&nbsp;")
        };
        stmts.push(format!(
            "\"{key}\"[label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLPADDING=\"4\" CELLSPACING=\"0\">\
             <TR><TD BGCOLOR=\"{tracked_color}\">{tracked_label}</TD>\
             <TD>{}</TD>\
             <TD BGCOLOR=\"{}\">&nbsp;</TD></TR></TABLE>>]",
            escape(key.as_str()),
            status_color(engine, issue),
        ));
    }
    for edge in &graph.edges {
        stmts.push(format!("\"{}\"->\"{}\"", edge.src, edge.dst));
    }

    format!(
        "digraph{{\n  rankdir=LR\n  node [shape=plain]\n  {}\n}}\n",
        stmts.join(";\n  ")
    )
}
