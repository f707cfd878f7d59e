//! Rendering of engine output for external tools.

pub mod dot;
