//! Command execution logic.

use anyhow::Result;

use super::{Cli, Commands};
use crate::config::Config;
use crate::engine::Engine;
use crate::jira;
use crate::output;
use crate::render::dot;
use crate::store::{DataStore, FileStore};

/// Load config, build the engine, and run the requested command.
pub(super) async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config).await?.with_env_credentials();

    if let Commands::Extract { prefixes } = &cli.command {
        config
            .allowed_issue_key_prefixes
            .extend(prefixes.iter().cloned());
    }

    if let Commands::Config = cli.command {
        return print_config(&config);
    }

    let mut engine = build_engine(config);
    match cli.command {
        Commands::Config => unreachable!("handled above"),
        Commands::Extract { .. } => {
            engine.refresh().await?;
            engine.persist().await?;
            output::print_summary(&engine);
        }
        Commands::Cleanup => {
            engine.cleanup().await?;
            println!("local data removed");
        }
        Commands::Analyse => {
            engine.populate().await?;
            engine.persist().await?;
            output::print_summary(&engine);
        }
        Commands::List => {
            engine.populate().await?;
            engine.persist().await?;
            for issue in engine.issues.values() {
                match engine.analyses.get(&issue.key).and_then(|a| a.total_score) {
                    Some(total) => output::print_scored_issue(issue, total),
                    None => output::print_issue(issue),
                }
            }
        }
        Commands::Roots => {
            engine.populate().await?;
            engine.persist().await?;
            for issue in engine.root_issues() {
                output::print_issue(issue);
            }
        }
        Commands::Orphans => {
            engine.populate().await?;
            engine.persist().await?;
            for issue in engine.orphan_issues() {
                output::print_issue(issue);
            }
        }
        Commands::Trackers => {
            engine.populate().await?;
            engine.persist().await?;
            for issue in engine.tracked_issues() {
                output::print_issue(issue);
            }
        }
        Commands::Warnings => {
            engine.populate().await?;
            engine.persist().await?;
            for issue in engine.warning_issues() {
                if let Some(analysis) = engine.analyses.get(&issue.key) {
                    output::print_warning_issue(issue, analysis);
                }
            }
        }
        Commands::Cycles => {
            engine.populate().await?;
            engine.persist().await?;
            let cyclic = engine.cyclic_graphs();
            println!("{} graphs with cycles", cyclic.len());
            for graph in cyclic {
                println!("{}", graph.label);
            }
        }
        Commands::Highest { percent } => {
            engine.populate().await?;
            engine.persist().await?;
            let ranked = engine.ranked_issues();
            let count = (ranked.len() * percent).div_ceil(100).max(1);
            println!("{count} highest scoring issues (top {percent}%)");
            for (issue, total) in ranked.into_iter().take(count) {
                output::print_scored_issue(issue, total);
            }
        }
        Commands::Dot => {
            engine.populate().await?;
            engine.persist().await?;
            let out_dir = engine.config().output.join("dot");
            tokio::fs::create_dir_all(&out_dir).await?;
            for (index, graph) in engine.graphs.iter().enumerate() {
                let path = out_dir.join(format!("{index}.dot"));
                tokio::fs::write(&path, dot::graph_to_dot(&engine, graph)).await?;
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn build_engine(config: Config) -> Engine {
    let source = Box::new(jira::Client::new(&config));
    let store: Option<Box<dyn DataStore>> = config
        .path
        .clone()
        .map(|path| Box::new(FileStore::new(path)) as Box<dyn DataStore>);
    Engine::new(source, store, config)
}

fn print_config(config: &Config) -> Result<()> {
    let mut masked = config.clone();
    if !masked.token.is_empty() {
        masked.token = "********".to_string();
    }
    print!("{}", serde_yaml::to_string(&masked)?);
    Ok(())
}
