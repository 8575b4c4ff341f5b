use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use linkexpr_rs::flow::definition::FlowDefinition;
use linkexpr_rs::flow::linkexpr::translate;
use linkexpr_rs::flow::{walk, Diagnostics, MemorySink};
use linkexpr_rs::{FlowLoader, LinkGate, RunScope, ScopeSchema, ScriptEngine};
use serde_json::json;

use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how a link expression is rewritten for the engine
    Translate {
        /// The link expression
        #[arg(short, long)]
        expr: String,
    },
    /// Decide every link of a flow against a scope
    Eval {
        /// Path to the flow definition
        #[arg(short, long)]
        flow: String,

        /// Path to the scope schema
        #[arg(short, long)]
        scope: String,

        /// Print decisions and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the nodes reached from a start node over firing links
    Walk {
        /// Path to the flow definition
        #[arg(short, long)]
        flow: String,

        /// Path to the scope schema
        #[arg(short, long)]
        scope: String,

        /// Node to start from
        #[arg(long)]
        from: String,
    },
}

fn load(flow: &str, scope: &str) -> Result<(FlowDefinition, RunScope)> {
    let def = FlowLoader::new()
        .load_flow(flow)
        .with_context(|| format!("failed to load flow from {}", flow))?;
    let schema =
        ScopeSchema::load(scope).with_context(|| format!("failed to load scope from {}", scope))?;
    let run_scope = RunScope::from_schema(&schema).context("failed to build run scope")?;
    Ok((def, run_scope))
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Translate { expr } => {
            let t = translate(&expr);
            println!("Attributes: {:?}", t.attributes);
            println!("Rewritten: {}", t.rewritten);
        }
        Commands::Eval { flow, scope, json } => {
            let (def, run_scope) = load(&flow, &scope)?;
            log::info!("Evaluating {} links of flow '{}'", def.links.len(), def.name);

            if json {
                let sink = Arc::new(MemorySink::default());
                let diagnostics = Diagnostics::new(sink.clone());
                let gate = LinkGate::from_definition(&def, &ScriptEngine::new(), diagnostics);
                let links: Vec<_> = def
                    .links
                    .iter()
                    .map(|link| {
                        json!({
                            "id": link.id,
                            "from": link.from,
                            "to": link.to,
                            "type": link.link_type,
                            "value": link.value,
                            "fires": gate.evaluate(link, &run_scope),
                        })
                    })
                    .collect();
                let diagnostics: Vec<_> = sink
                    .entries()
                    .into_iter()
                    .map(|e| json!({ "level": e.level.as_str(), "message": e.message }))
                    .collect();
                let report = json!({
                    "flow": def.name,
                    "links": links,
                    "diagnostics": diagnostics,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let gate =
                    LinkGate::from_definition(&def, &ScriptEngine::new(), Diagnostics::global());
                for link in &def.links {
                    let fires = gate.evaluate(link, &run_scope);
                    println!(
                        "link {} {} -> {}: {}",
                        link.id,
                        link.from,
                        link.to,
                        if fires { "fires" } else { "held" }
                    );
                }
            }
        }
        Commands::Walk { flow, scope, from } => {
            let (def, run_scope) = load(&flow, &scope)?;
            if !def.has_node(&from) {
                anyhow::bail!("flow '{}' has no node '{}'", def.name, from);
            }

            let gate = LinkGate::from_definition(&def, &ScriptEngine::new(), Diagnostics::global());
            let reached = walk(&def, &gate, &run_scope, &from);
            println!("Reached: {}", reached.join(" -> "));
        }
    }

    Ok(())
}
