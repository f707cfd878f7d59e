//! Traversal policy tests: which links are followed and which issues are
//! kept when spidering out from the seed query.

mod common;

use common::{issue, link, test_config, with_status, MockSource};
use tangle::domain::{IssueKey, StatusCategory};
use tangle::engine::Engine;

async fn populated(
    seeds: &[&str],
    universe: Vec<tangle::domain::Issue>,
    config: tangle::config::Config,
) -> Engine {
    let mut engine = Engine::new(Box::new(MockSource::new(seeds, universe)), None, config);
    engine.populate().await.unwrap();
    engine
}

fn fetched_keys(engine: &Engine) -> Vec<&str> {
    engine.issues.keys().map(IssueKey::as_str).collect()
}

#[tokio::test]
async fn unfollowed_link_types_are_not_traversed() {
    let mut root = issue("ABC-1", "Initiative");
    let mut blocked = issue("ABC-2", "Task");
    let mut related = issue("ABC-3", "Task");
    link(&mut root, &mut blocked, "Blocks");
    link(&mut root, &mut related, "Relates");

    let engine = populated(&["ABC-1"], vec![root, blocked, related], test_config()).await;
    // "Relates" is not a followed link type, so ABC-3 is never requested.
    assert_eq!(fetched_keys(&engine), vec!["ABC-1", "ABC-2"]);
}

#[tokio::test]
async fn key_prefix_filter_drops_foreign_projects() {
    let mut root = issue("ABC-1", "Initiative");
    let mut foreign = issue("XYZ-1", "Task");
    link(&mut root, &mut foreign, "Blocks");

    let mut config = test_config();
    config.allowed_issue_key_prefixes = vec!["ABC".to_string()];
    let engine = populated(&["ABC-1"], vec![root, foreign], config).await;

    assert_eq!(fetched_keys(&engine), vec!["ABC-1"]);
    // The dangling link to XYZ-1 is tidied away, leaving an orphan.
    assert_eq!(engine.orphans, vec![IssueKey::from("ABC-1")]);
}

#[tokio::test]
async fn done_terminal_with_only_outward_links_is_dropped() {
    // ABC-1 blocks ABC-2; ABC-2 is done and in turn blocks ABC-3, which
    // would drag in ABC-3's whole neighborhood if ABC-2 were kept.
    let mut root = issue("ABC-1", "Initiative");
    let mut terminal = with_status(issue("ABC-2", "Task"), "Done", StatusCategory::Done);
    let mut beyond = issue("ABC-3", "Task");
    link(&mut root, &mut terminal, "Blocks");

    let mut only_outward = with_status(issue("ABC-2", "Task"), "Done", StatusCategory::Done);
    link(&mut only_outward, &mut beyond, "Blocks");
    // ABC-2's full record carries only the outward link; the inward side
    // lives on ABC-1's record.
    terminal.links = only_outward.links;

    let engine = populated(&["ABC-1"], vec![root, terminal, beyond], test_config()).await;
    assert_eq!(fetched_keys(&engine), vec!["ABC-1"]);
}

#[tokio::test]
async fn done_neighbor_reached_inward_is_still_kept() {
    let mut root = issue("ABC-1", "Initiative");
    let mut done = with_status(issue("ABC-2", "Task"), "Done", StatusCategory::Done);
    link(&mut root, &mut done, "Blocks");

    let engine = populated(&["ABC-1"], vec![root, done], test_config()).await;
    assert_eq!(fetched_keys(&engine), vec!["ABC-1", "ABC-2"]);
}

#[tokio::test]
async fn epic_children_join_the_epic_component() {
    let epic = issue("ABC-1", "Epic");
    let mut child = issue("ABC-2", "Task");
    child.epic_key = Some(IssueKey::from("ABC-1"));

    let engine = populated(&["ABC-1"], vec![epic, child], test_config()).await;

    assert_eq!(fetched_keys(&engine), vec!["ABC-1", "ABC-2"]);
    assert_eq!(engine.graphs.len(), 1);
    let graph = &engine.graphs[0];
    // The epic is delivered by its child: the edge runs child → epic.
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].src, IssueKey::from("ABC-2"));
    assert_eq!(graph.edges[0].dst, IssueKey::from("ABC-1"));
    assert_eq!(graph.edges[0].link_type, "Epic");
    assert_eq!(graph.label, "ABC-2");
}

#[tokio::test]
async fn traversal_terminates_on_mutual_links() {
    let mut a = issue("ABC-1", "Initiative");
    let mut b = issue("ABC-2", "Task");
    link(&mut a, &mut b, "Blocks");
    link(&mut b, &mut a, "Blocks");

    let engine = populated(&["ABC-1"], vec![a, b], test_config()).await;
    assert_eq!(fetched_keys(&engine), vec!["ABC-1", "ABC-2"]);
    assert!(!engine.graphs[0].acyclic);
}

#[tokio::test]
async fn fetch_fails_when_config_is_incomplete() {
    let mut config = test_config();
    config.query = String::new();
    let mut engine = Engine::new(
        Box::new(MockSource::new(&[], Vec::new())),
        None,
        config,
    );
    assert!(engine.populate().await.is_err());
}
