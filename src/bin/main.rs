//! fieldflow CLI - inspect and normalize lineage models
//!
//! Usage:
//!   fieldflow inspect <model.json>
//!   fieldflow lineage <model.json> <handle> [--direction <direction>]
//!   fieldflow export <model.json> [-o <out.json>]
//!   fieldflow check <model.json>
//!
//! Examples:
//!   fieldflow lineage data_model.json BASE_Orders-total
//!   fieldflow lineage data_model.json BASE_Lines-qty --direction downstream
//!   fieldflow export legacy.json -o data_model.json

use clap::{Parser, Subcommand, ValueEnum};
use fieldflow::config::Settings;
use fieldflow::graph::EdgeKind;
use fieldflow::integrity::validate;
use fieldflow::lineage::{lineage_cycles, Direction};
use fieldflow::Session;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fieldflow")]
#[command(about = "fieldflow - field-level lineage for data models")]
#[command(version)]
struct Cli {
    /// Path to a fieldflow.toml (defaults to the usual lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the entities, fields and references in a model
    Inspect {
        /// Path to the model JSON
        file: PathBuf,
    },

    /// Print the lineage edges of one field
    Lineage {
        /// Path to the model JSON
        file: PathBuf,

        /// Field handle, e.g. BASE_Orders-total
        handle: String,

        /// Which way to follow references (defaults to the configured direction)
        #[arg(short, long)]
        direction: Option<DirectionArg>,
    },

    /// Import and re-export a model in normalized form
    Export {
        /// Path to the model JSON
        file: PathBuf,

        /// Output path (defaults to the configured export file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report inert references and reference cycles
    Check {
        /// Path to the model JSON
        file: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum DirectionArg {
    Upstream,
    Downstream,
    Both,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Upstream => Direction::Upstream,
            DirectionArg::Downstream => Direction::Downstream,
            DirectionArg::Both => Direction::Both,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Inspect { file } => cmd_inspect(&settings, file),
        Commands::Lineage {
            file,
            handle,
            direction,
        } => cmd_lineage(&settings, file, handle, direction),
        Commands::Export { file, output } => cmd_export(&settings, file, output),
        Commands::Check { file } => cmd_check(&settings, file),
    }
}

/// Open a model file in a fresh session, reporting failures on stderr.
fn open(settings: &Settings, file: &Path) -> Option<Session> {
    let mut session = Session::with_settings(settings);
    match session.import_file(file) {
        Ok(()) => Some(session),
        Err(e) => {
            eprintln!("Error loading '{}': {}", file.display(), e);
            None
        }
    }
}

fn cmd_inspect(settings: &Settings, file: PathBuf) -> ExitCode {
    let Some(session) = open(settings, &file) else {
        return ExitCode::FAILURE;
    };
    let graph = session.graph();

    println!("File: {}", file.display());
    println!();

    println!("Entities:");
    for node in graph.nodes() {
        let references = graph.edges_of_entity(&node.id).count();
        match &node.data.alias {
            Some(alias) => println!("  - {} (alias: {}, {} references)", node.id, alias, references),
            None => println!("  - {} ({} references)", node.id, references),
        }
        for field in &node.data.fields {
            match field.expression() {
                Some(expr) if !expr.is_empty() => println!("      {} = {}", field.name, expr),
                _ => println!("      {}", field.name),
            }
        }
    }
    println!();

    let normal = graph
        .edges()
        .iter()
        .filter(|e| e.kind == EdgeKind::Normal)
        .count();
    let calculation = graph.edge_count() - normal;
    println!(
        "{} entities, {} references ({} normal, {} calculation)",
        graph.node_count(),
        graph.edge_count(),
        normal,
        calculation
    );

    ExitCode::SUCCESS
}

fn cmd_lineage(
    settings: &Settings,
    file: PathBuf,
    handle: String,
    direction: Option<DirectionArg>,
) -> ExitCode {
    let Some(mut session) = open(settings, &file) else {
        return ExitCode::FAILURE;
    };
    if let Some(direction) = direction {
        session.set_direction(direction.into());
    }

    let Some(root) = session.select_field(&handle) else {
        eprintln!("Unknown field handle: {}", handle);
        return ExitCode::FAILURE;
    };

    let highlighter = session.highlighter();
    println!("{} lineage of {}:", highlighter.direction(), root.to_pointer());
    if highlighter.edges().is_empty() {
        println!("  (none)");
    }
    for id in highlighter.edges() {
        println!("  {}", id);
    }

    ExitCode::SUCCESS
}

fn cmd_export(settings: &Settings, file: PathBuf, output: Option<PathBuf>) -> ExitCode {
    let Some(session) = open(settings, &file) else {
        return ExitCode::FAILURE;
    };

    match session.export_file(output.as_deref()) {
        Ok(path) => {
            println!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Export error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_check(settings: &Settings, file: PathBuf) -> ExitCode {
    let Some(session) = open(settings, &file) else {
        return ExitCode::FAILURE;
    };
    let graph = session.graph();
    let mut problems = 0usize;

    if let Err(violations) = validate(graph) {
        eprintln!("Integrity violations:");
        for v in &violations {
            eprintln!("  {}", v);
        }
        problems += violations.len();
    }

    let inert = graph.inert_references();
    if !inert.is_empty() {
        eprintln!("Inert references:");
        for reference in &inert {
            eprintln!("  {}", reference);
        }
        problems += inert.len();
    }

    let cycles = lineage_cycles(graph);
    if !cycles.is_empty() {
        eprintln!("Reference cycles:");
        for cycle in &cycles {
            let fields: Vec<_> = cycle.iter().map(|h| h.to_pointer().to_string()).collect();
            eprintln!("  {}", fields.join(" <-> "));
        }
        problems += cycles.len();
    }

    if problems > 0 {
        eprintln!("{} problem(s) in {}", problems, file.display());
        return ExitCode::FAILURE;
    }

    println!("OK: {} is consistent", file.display());
    ExitCode::SUCCESS
}
