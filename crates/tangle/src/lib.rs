//! Tangle - dependency-graph analysis for Jira issues.
//!
//! This crate provides both the `tangle` CLI and a library around the graph
//! engine: a link-following fetch loop, connected-component partitioning,
//! cycle detection via topological sort, and priority-weight propagation
//! over the resulting DAGs.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod jira;
pub mod output;
pub mod render;
pub mod store;

// Public CLI module (needed by binary)
pub mod cli;
