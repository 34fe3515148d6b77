use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use marketmap::config::MarketMapConfig;
use marketmap::graph::{self, MarketGraphData};
use marketmap::io::FormatRegistry;
use marketmap::simulation::ForceSimulation;
use marketmap::{LinkKind, NodeKind, ViewTransform};

/// Force-directed layout for market maps.
#[derive(Parser)]
#[command(name = "marketmap")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a layout and write it as snapshot JSON or SVG
    Layout {
        /// Input graph payload (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; format from extension (.json, .svg). Stdout JSON if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout/view config file (.json, .yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Viewport width
        #[arg(long, default_value = "800")]
        width: f64,

        /// Viewport height
        #[arg(long, default_value = "600")]
        height: f64,

        /// Seed for initial placement
        #[arg(long)]
        seed: Option<u64>,

        /// Number of simulation ticks
        #[arg(long)]
        ticks: Option<usize>,
    },
    /// Report what validation keeps and drops from a payload
    Inspect {
        /// Input graph payload (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "marketmap=debug"
    } else {
        "marketmap=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_graph(registry: &FormatRegistry, input: &Path) -> anyhow::Result<MarketGraphData> {
    let reader = registry.reader_for_path(input)?;
    reader
        .read(input)
        .with_context(|| format!("failed to read graph from {}", input.display()))
}

struct LayoutArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    width: f64,
    height: f64,
    seed: Option<u64>,
    ticks: Option<usize>,
}

fn layout(args: LayoutArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => MarketMapConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MarketMapConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.layout.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.layout.tick_count = ticks;
    }
    config.validate()?;

    let registry = FormatRegistry::with_defaults();
    let data = read_graph(&registry, &args.input)?;
    let (snapshot, stats) =
        ForceSimulation::new(&data, args.width, args.height, config.layout.clone()).run();
    info!(
        nodes = snapshot.nodes.len(),
        links = snapshot.links.len(),
        ticks = stats.ticks_run,
        dropped_links = stats.dropped_links,
        "computed layout"
    );

    let view = ViewTransform::new(args.width, args.height, config.view);
    match &args.output {
        Some(output) => {
            let writer = registry.writer_for_path(output)?;
            writer
                .write(&snapshot, &view, output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(output = %output.display(), "wrote layout");
        }
        None => {
            let writer = registry
                .writer_for_format("json")
                .context("json writer not registered")?;
            println!("{}", writer.render(&snapshot, &view)?);
        }
    }
    Ok(())
}

fn inspect(input: &Path) -> anyhow::Result<()> {
    let registry = FormatRegistry::with_defaults();
    let data = read_graph(&registry, input)?;
    let validated = graph::validate(&data);

    let mut nodes: BTreeMap<&str, usize> = BTreeMap::new();
    for node in &validated.nodes {
        *nodes.entry(node.kind.label()).or_default() += 1;
    }
    let mut links: BTreeMap<&str, usize> = BTreeMap::new();
    for link in &validated.links {
        *links.entry(link.kind.as_str()).or_default() += 1;
    }

    println!("nodes: {}", validated.nodes.len());
    for kind in NodeKind::ALL {
        println!("  {}: {}", kind.label(), nodes.get(kind.label()).unwrap_or(&0));
    }
    println!("links: {}", validated.links.len());
    for kind in LinkKind::ALL {
        println!("  {}: {}", kind.as_str(), links.get(kind.as_str()).unwrap_or(&0));
    }
    println!("dropped links: {}", validated.report.dropped_links);
    println!("duplicate nodes: {}", validated.report.duplicate_nodes);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Layout {
            input,
            output,
            config,
            width,
            height,
            seed,
            ticks,
        }) => layout(LayoutArgs {
            input,
            output,
            config,
            width,
            height,
            seed,
            ticks,
        })?,
        Some(Commands::Inspect { input }) => inspect(&input)?,
        None => {
            println!("marketmap: no command specified. Use --help for usage.");
        }
    }

    Ok(())
}
