use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ddi_graph_analyzer::cluster::Algorithm;
use ddi_graph_analyzer::config::DuplicatePolicy;
use ddi_graph_analyzer::data::{GraphSource, InteractionTsvSource, JsonGraphSource};
use ddi_graph_analyzer::pipeline::{self, StageOutcome};
use ddi_graph_analyzer::predict::Method;
use ddi_graph_analyzer::{storage, viz, Config, Diagnostics};

#[derive(Parser, Debug)]
#[clap(
    name = "ddi-graph-analyzer",
    about = "Graph analytics over drug-drug interaction data"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Minimum component size kept and analysed
    #[clap(long, global = true, default_value = "3")]
    min_component_size: usize,

    /// Seed for every randomised step
    #[clap(long, global = true, default_value = "42")]
    seed: u64,

    /// Skip visualizations
    #[clap(long, global = true)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, global = true, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct StagePaths {
    /// Interchange graph produced by `build`
    #[clap(long)]
    graph: PathBuf,

    /// Report file to write
    #[clap(long)]
    output: PathBuf,

    /// Directory for rendered views
    #[clap(long, default_value = "visualizations")]
    viz_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the interaction graph and drop small fragments
    Build {
        /// Raw tab-separated interaction pairs, or a graph JSON with --json-input
        #[clap(long)]
        input: PathBuf,

        /// Read the input as an interchange graph instead of raw pairs
        #[clap(long)]
        json_input: bool,

        /// Drug metadata JSON used to label nodes with common names
        #[clap(long)]
        metadata: Option<PathBuf>,

        /// Interchange graph to write
        #[clap(long)]
        output: PathBuf,

        /// Treat raw pairs as directed interactions
        #[clap(long)]
        directed: bool,

        /// Add one to the edge weight for every repeated pair
        #[clap(long)]
        accumulate_duplicates: bool,
    },

    /// Rank nodes by centrality per component
    Centrality {
        #[clap(flatten)]
        paths: StagePaths,

        /// Number of top nodes reported per measure
        #[clap(long, default_value = "5")]
        top_k: usize,
    },

    /// Detect and compare communities
    Cluster {
        #[clap(flatten)]
        paths: StagePaths,

        /// Algorithms to run (default: all)
        #[clap(long, value_enum, value_delimiter = ',')]
        algorithms: Vec<Algorithm>,

        /// Number of spectral clusters
        #[clap(long, default_value = "5")]
        spectral_clusters: usize,
    },

    /// Evaluate link prediction heuristics on held-out edges
    Predict {
        #[clap(flatten)]
        paths: StagePaths,

        /// Heuristics to evaluate (default: all)
        #[clap(long, value_enum, value_delimiter = ',')]
        methods: Vec<Method>,

        /// Fraction of edges held out as positives
        #[clap(long, default_value = "0.1")]
        test_fraction: f64,
    },
}

fn report_warnings(diagnostics: &Diagnostics) {
    if !diagnostics.is_empty() {
        log::info!("Stage finished with {} warnings", diagnostics.len());
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let mut config = Config::new(args.min_component_size, args.seed);
    let mut diagnostics = Diagnostics::new();

    match args.command {
        Command::Build {
            input,
            json_input,
            metadata,
            output,
            directed,
            accumulate_duplicates,
        } => {
            config.build.directed = directed;
            if accumulate_duplicates {
                config.build.duplicate_policy = DuplicatePolicy::Accumulate;
            }
            config.validate()?;

            let source: Box<dyn GraphSource> = if json_input {
                Box::new(JsonGraphSource)
            } else {
                Box::new(InteractionTsvSource::new(config.build.clone()))
            };

            log::info!("Building graph from {}", input.display());
            let outcome = pipeline::run_build(
                source.as_ref(),
                &input,
                metadata.as_deref(),
                &output,
                &config,
                &mut diagnostics,
            )
            .with_context(|| format!("Failed to build graph from {}", input.display()))?;

            if let StageOutcome::Completed(graph) = outcome {
                log::info!(
                    "Saved graph with {} nodes and {} edges to {}",
                    graph.node_count(),
                    graph.edge_count(),
                    output.display()
                );
            }
        }

        Command::Centrality { paths, top_k } => {
            config.centrality.top_k = top_k;
            config.validate()?;

            let outcome =
                pipeline::run_centrality(&paths.graph, &paths.output, &config, &mut diagnostics)
                    .with_context(|| format!("Centrality stage failed on {}", paths.graph.display()))?;

            if let StageOutcome::Completed(report) = outcome {
                if !args.skip_viz {
                    let graph = storage::load_graph(&paths.graph)?;
                    viz::render_centrality(&graph, &report, &paths.viz_dir)?;
                }
            }
        }

        Command::Cluster {
            paths,
            algorithms,
            spectral_clusters,
        } => {
            if !algorithms.is_empty() {
                config.cluster.algorithms = algorithms;
            }
            config.cluster.spectral_clusters = spectral_clusters;
            config.validate()?;

            let outcome =
                pipeline::run_clustering(&paths.graph, &paths.output, &config, &mut diagnostics)
                    .with_context(|| format!("Clustering stage failed on {}", paths.graph.display()))?;

            if let StageOutcome::Completed(report) = outcome {
                if let Some(best) = report.best {
                    log::info!("Highest modularity: {}", best.name());
                }
                if !args.skip_viz {
                    let graph = storage::load_graph(&paths.graph)?;
                    viz::render_clusters(&graph, &report, &paths.viz_dir)?;
                }
            }
        }

        Command::Predict {
            paths,
            methods,
            test_fraction,
        } => {
            if !methods.is_empty() {
                config.prediction.methods = methods;
            }
            config.prediction.test_fraction = test_fraction;
            config.validate()?;

            let outcome =
                pipeline::run_link_prediction(&paths.graph, &paths.output, &config, &mut diagnostics)
                    .with_context(|| format!("Prediction stage failed on {}", paths.graph.display()))?;

            if let StageOutcome::Completed(report) = outcome {
                if let Some(best) = report.best {
                    log::info!("Highest AUC: {}", best.name());
                }
                if !args.skip_viz {
                    viz::render_predictions(&report, &paths.viz_dir)?;
                }
            }
        }
    }

    report_warnings(&diagnostics);
    log::info!("Analysis complete");

    Ok(())
}
