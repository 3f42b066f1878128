//! why CLI: explain graph-class inclusion deductions from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use isgci_why::class::{ClassId, RelationKey};
use isgci_why::config::WhyConfig;
use isgci_why::explain::Explainer;
use isgci_why::import::TraceExport;
use isgci_why::logfile::{LogLine, read_log};
use isgci_why::paths::WhyPaths;
use isgci_why::store::{DurableStore, TraceStore};

#[derive(Parser)]
#[command(
    name = "why",
    version,
    about = "Explain why one graph class is related to another"
)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/isgci-why/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trace database, overriding the config file and WHY_STORE.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the proof trace for a relation.
    Explain {
        /// Subclass id.
        sub: ClassId,
        /// Superclass id.
        sup: ClassId,

        /// Show class names next to the ids.
        #[arg(long)]
        names: bool,

        /// Deepest proof level to expand.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Explain from a JSON trace export instead of the database.
        #[arg(long)]
        traces: Option<PathBuf>,

        /// JSON class-name export used with --traces.
        #[arg(long, requires = "traces")]
        names_file: Option<PathBuf>,
    },

    /// Print the stored record for a relation as JSON.
    Record {
        sub: ClassId,
        sup: ClassId,

        /// Include class names.
        #[arg(long)]
        names: bool,
    },

    /// Classify the lines of a deducer log.
    Log {
        /// Log file (default: the configured log_path).
        file: Option<PathBuf>,
    },

    /// Import a trace export into the database.
    Import {
        /// JSON export of the TraceData table.
        #[arg(long)]
        traces: PathBuf,

        /// JSON export of class names.
        #[arg(long)]
        names: Option<PathBuf>,
    },

    /// Show database statistics.
    Info,

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    // Traces go to stdout, diagnostics to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let paths = match WhyPaths::resolve() {
        Ok(paths) => Some(paths),
        Err(e) => {
            tracing::warn!("{e}; using working-directory defaults");
            None
        }
    };
    let mut config = WhyConfig::load(cli.config.as_deref(), paths.as_ref())?;
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }

    match cli.command {
        Commands::Explain {
            sub,
            sup,
            names,
            max_depth,
            traces,
            names_file,
        } => {
            let store: Arc<dyn TraceStore> = match traces {
                Some(traces) => {
                    let export = TraceExport::load(&traces, names_file.as_deref())?;
                    Arc::new(export.into_mem_store())
                }
                None => Arc::new(DurableStore::open(config.store_path()?)?),
            };
            let explainer =
                Explainer::new(store).with_max_depth(max_depth.unwrap_or(config.max_depth));
            let explanation = explainer.trace(RelationKey { sub, sup }, names)?;
            if explanation.is_no_data() {
                println!("No trace data available for {sub} -> {sup}");
            } else {
                print!("{explanation}");
            }
        }

        Commands::Record { sub, sup, names } => {
            let store = DurableStore::open(config.store_path()?)?;
            match store.fetch(RelationKey { sub, sup }, names)? {
                Some(record) => {
                    let json = serde_json::to_string_pretty(&record).into_diagnostic()?;
                    println!("{json}");
                }
                None => miette::bail!("no trace record for {sub} -> {sup}"),
            }
        }

        Commands::Log { file } => {
            let path = file.unwrap_or_else(|| config.log_path.clone());
            for line in read_log(&path)? {
                match &line {
                    LogLine::Header(text) | LogLine::Banner(text) | LogLine::Text(text) => {
                        println!("{:<8} {text}", line.kind());
                    }
                    LogLine::Relation { key, rest } => {
                        println!("{:<8} {key} {rest}", line.kind());
                    }
                }
            }
        }

        Commands::Import { traces, names } => {
            let export = TraceExport::load(&traces, names.as_deref())?;
            let store = DurableStore::create(config.store_path()?)?;
            let report = export.write_to(&store)?;
            println!("Imported {report} into {}", store.path().display());
        }

        Commands::Info => {
            let store = DurableStore::open(config.store_path()?)?;
            let (relations, names) = store.counts()?;
            println!("store:      {}", store.path().display());
            println!("relations:  {relations}");
            println!("names:      {names}");
            println!("max depth:  {}", config.max_depth);
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
