//! Human-readable report printing.
//!
//! Pure consumer of the engine's public state; nothing here feeds back into
//! analysis.

use colored::Colorize;

use crate::domain::{Analysis, Issue, StatusCategory};
use crate::engine::Engine;

fn status_cell(issue: &Issue) -> String {
    match issue.status_category {
        StatusCategory::ToDo => issue.status.normal().to_string(),
        StatusCategory::InProgress => issue.status.yellow().to_string(),
        StatusCategory::Done => issue.status.green().to_string(),
    }
}

/// One issue on one line: key, status, summary.
pub fn print_issue(issue: &Issue) {
    println!(
        "{}  {}  {}",
        issue.key.to_string().cyan(),
        status_cell(issue),
        issue.summary
    );
}

/// One scored issue on one line, total score first.
pub fn print_scored_issue(issue: &Issue, total: u64) {
    println!(
        "{total:>6}  {}  {}  {}",
        issue.key.to_string().cyan(),
        status_cell(issue),
        issue.summary
    );
}

/// One issue with its warning codes.
pub fn print_warning_issue(issue: &Issue, analysis: &Analysis) {
    let codes: Vec<String> = analysis.warnings.iter().map(ToString::to_string).collect();
    println!(
        "[{}]  {}  {}  {}",
        codes.join(", ").red(),
        issue.key.to_string().cyan(),
        status_cell(issue),
        issue.summary
    );
}

/// Summary counts after an analyse run.
pub fn print_summary(engine: &Engine) {
    println!("{} issues", engine.issues.len());
    println!("{} graphs", engine.graphs.len());
    println!("{} root issues", engine.root_issues().len());
    println!("{} orphaned issues", engine.orphans.len());

    let cyclic = engine.cyclic_graphs().len();
    if cyclic > 0 {
        println!("{}", format!("{cyclic} graphs with cycles").yellow());
    }
    let warned = engine.warning_issues().len();
    if warned > 0 {
        println!("{}", format!("{warned} issues with warnings").yellow());
    }
}
