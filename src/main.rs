use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use depgraph::export::{self, ExportFormat};
use depgraph::graph::{AddOutcome, DependencyGraph};
use depgraph::parser;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Maintain a dependency graph snapshot and query it", long_about = None)]
struct Cli {
    /// Snapshot file to read and update
    #[arg(
        short,
        long,
        global = true,
        env = "DEPGRAPH_FILE",
        default_value = "depgraph.json"
    )]
    file: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty snapshot file
    Init {
        /// Skip cycle checks for this graph
        #[arg(long)]
        allow_cycles: bool,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },
    /// Add a node, or replace the dependencies of an existing one
    Add {
        /// Node id
        id: String,
        /// Ids the node depends on
        dependencies: Vec<String>,
    },
    /// Remove a node and every edge touching it
    Remove {
        /// Node id
        id: String,
    },
    /// Rename a node, keeping its edges
    Rename {
        /// Current id
        old: String,
        /// New id
        new: String,
    },
    /// Add dependency edges, refusing any that would close a cycle
    Link {
        /// Node that gains the dependencies
        dependent: String,
        /// Ids to depend on
        #[arg(required = true)]
        dependencies: Vec<String>,
    },
    /// Remove dependency edges
    Unlink {
        /// Node that loses the dependencies
        dependent: String,
        /// Ids to stop depending on
        #[arg(required = true)]
        dependencies: Vec<String>,
    },
    /// Show the direct relationships of a node
    Show {
        /// Node id
        id: String,
    },
    /// Report whether EXISTING depending on TARGET would close a cycle
    Check {
        /// Node that would gain the dependency
        existing: String,
        /// Node it would depend on
        target: String,
    },
    /// Print nodes in dependency-first load order
    Order,
    /// List cycles already present in the snapshot
    Cycles,
    /// Export the graph in another format
    Export {
        /// Output format: json, csv or markdown
        #[arg(long, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the snapshot at `path`, or an empty graph if it does not exist yet.
fn load(path: &Path) -> Result<DependencyGraph> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
        return Ok(DependencyGraph::new());
    }

    parser::load_graph(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Loads the snapshot for a command that relies on the cycle pre-check,
/// which only terminates on an acyclic graph.
fn load_acyclic(path: &Path) -> Result<DependencyGraph> {
    let graph = load(path)?;
    if !graph.cycle_allowed() && graph.has_cycles() {
        let cycles: Vec<String> = graph
            .detect_cycles()
            .iter()
            .map(|cycle| cycle.cycle_path())
            .collect();
        bail!(
            "{} contains cycles but does not allow them: {}",
            path.display(),
            cycles.join("; ")
        );
    }
    Ok(graph)
}

/// Fails if making `dependent` depend on any of `dependencies` would close
/// a cycle.
fn ensure_no_cycle(
    graph: &DependencyGraph,
    dependent: &str,
    dependencies: &[String],
) -> Result<()> {
    for dependency in dependencies {
        if graph.will_make_dependency_cycle(dependent, dependency) == Some(true) {
            bail!(
                "'{}' depending on '{}' would create a cycle",
                dependent,
                dependency
            );
        }
    }
    Ok(())
}

fn save(path: &Path, graph: &DependencyGraph) -> Result<()> {
    export::export_to_file(ExportFormat::Json, graph, path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn sorted(ids: &HashSet<String>) -> Vec<&str> {
    let mut ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.file.as_path();

    match cli.command {
        Commands::Init {
            allow_cycles,
            force,
        } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save(path, &DependencyGraph::with_cycles_allowed(allow_cycles))?;
            println!("Initialized {}", path.display());
        }
        Commands::Add { id, dependencies } => {
            let mut graph = load_acyclic(path)?;
            ensure_no_cycle(&graph, &id, &dependencies)?;
            let outcome = graph.add_node_with_dependencies(&id, dependencies);
            if outcome == AddOutcome::Failed {
                bail!("could not add '{}': node and dependency ids must be non-empty", id);
            }
            save(path, &graph)?;
            println!("{} {}", outcome, id);
        }
        Commands::Remove { id } => {
            let mut graph = load(path)?;
            let Some(removed) = graph.remove_node(&id) else {
                bail!("'{}' is not a node", id);
            };
            save(path, &graph)?;
            println!("Removed {}", id);
            if !removed.dependers.is_empty() {
                println!("Affected dependers: {}", removed.dependers.join(", "));
            }
        }
        Commands::Rename { old, new } => {
            let mut graph = load(path)?;
            if !graph.change_id(&old, &new) {
                bail!("cannot rename '{}' to '{}'", old, new);
            }
            save(path, &graph)?;
            println!("Renamed {} -> {}", old, new);
        }
        Commands::Link {
            dependent,
            dependencies,
        } => {
            let mut graph = load_acyclic(path)?;
            if !graph.is_node(&dependent) {
                bail!("'{}' is not a node", dependent);
            }
            ensure_no_cycle(&graph, &dependent, &dependencies)?;
            for dependency in &dependencies {
                if !graph.is_node(dependency) {
                    tracing::warn!(dependency = %dependency, "skipping unknown node");
                }
            }
            graph.add_dependencies(&dependent, &dependencies);
            save(path, &graph)?;
        }
        Commands::Unlink {
            dependent,
            dependencies,
        } => {
            let mut graph = load(path)?;
            graph.remove_dependencies(&dependent, &dependencies);
            save(path, &graph)?;
        }
        Commands::Show { id } => {
            let graph = load(path)?;
            if !graph.is_node(&id) {
                bail!("'{}' is not a node", id);
            }
            let deps = graph.get_dependencies(&id).map(sorted).unwrap_or_default();
            let dependers = graph.get_dependers(&id).map(sorted).unwrap_or_default();
            println!("{}", id);
            println!("  depends on:     {}", deps.join(", "));
            println!("  depended on by: {}", dependers.join(", "));
        }
        Commands::Check { existing, target } => {
            let graph = load_acyclic(path)?;
            match graph.will_make_dependency_cycle(&existing, &target) {
                Some(true) => println!("cycle: '{}' -> '{}' closes a cycle", existing, target),
                Some(false) => println!("ok: '{}' -> '{}' keeps the graph acyclic", existing, target),
                None => println!("skipped: cycles are allowed in this graph"),
            }
        }
        Commands::Order => {
            let graph = load(path)?;
            for id in graph.load_order()? {
                println!("{}", id);
            }
        }
        Commands::Cycles => {
            let graph = load(path)?;
            let cycles = graph.detect_cycles();
            if cycles.is_empty() {
                println!("No cycles");
            }
            for cycle in cycles {
                println!("{}", cycle.cycle_path());
            }
        }
        Commands::Export { format, output } => {
            let graph = load(path)?;
            match output {
                Some(output) => export::export_to_file(format, &graph, &output)
                    .with_context(|| format!("failed to write {}", output.display()))?,
                None => print!("{}", export::export_to_string(format, &graph)?),
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
