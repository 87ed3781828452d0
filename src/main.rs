use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use findref::dataset::DatasetRegistry;
use findref::index::{IndexState, IndexStore, stats};
use findref::query::{BuildKind, IndexLifecycle, Router};
use findref::utils::{AppConfig, LogTarget, init_logging};

#[derive(Parser)]
#[command(name = "findref")]
#[command(about = "Search cloud SDK and infrastructure-as-code reference docs from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search (default)
    Tui {
        /// Initial query, e.g. "boto3 s3 put"
        query: Vec<String>,
    },
    /// Route one query and print the items
    Query {
        /// Query words, e.g. tf aws bucket
        #[arg(required = true)]
        words: Vec<String>,

        /// Colored output
        #[arg(long)]
        color: bool,

        /// Print items as JSON
        #[arg(long, conflicts_with = "color")]
        json: bool,
    },
    /// Build the index of one dataset
    Index {
        dataset: String,

        /// Rebuild even if the index is fresh, refetching all pages
        #[arg(short, long)]
        force: bool,
    },
    /// List datasets and the state of their indexes
    List,
    /// Remove the index of one dataset
    Remove { dataset: String },
    /// Print the effective configuration, writing defaults if none exists
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui { query: Vec::new() });

    let log_target = match command {
        Commands::Tui { .. } if cfg!(feature = "interactive") => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_logging(log_target, cli.verbose)?;

    let config = AppConfig::load()?;

    match command {
        Commands::Tui { query } => {
            let router = Router::new(DatasetRegistry::builtin(&config)?, config.search_limit);
            let initial = (!query.is_empty()).then(|| query.join(" "));
            run_tui(router, initial)?;
        }
        Commands::Query { words, color, json } => {
            let router = Router::new(DatasetRegistry::builtin(&config)?, config.search_limit);
            let items = match router.route_blocking(&words.join(" ")) {
                Ok(items) => items,
                Err(e) => vec![e.to_item()],
            };
            if json {
                findref::output::print_json(&items)?;
            } else {
                findref::output::print_items(&items, color)?;
            }
        }
        Commands::Index { dataset, force } => {
            let registry = DatasetRegistry::builtin(&config)?;
            let entry = registry
                .get(&dataset)
                .ok_or_else(|| findref::Error::UnknownDataset(dataset.clone()))?;
            let kind = match entry.backend.index_state(&entry.dataset.cache_key()) {
                _ if force => BuildKind::Refresh,
                IndexState::Fresh => {
                    println!("{dataset} index is fresh (use --force to rebuild)");
                    return Ok(());
                }
                IndexState::Stale => BuildKind::Expired,
                IndexState::Absent => BuildKind::Initial,
            };
            IndexLifecycle::new(config.search_limit).build(entry, kind)?;
            println!("Built {dataset} index");
        }
        Commands::List => {
            let registry = DatasetRegistry::builtin(&config)?;
            let store = IndexStore::open_default()?;
            stats::list_datasets(&registry, &store);
        }
        Commands::Remove { dataset } => {
            let registry = DatasetRegistry::builtin(&config)?;
            let entry = registry
                .get(&dataset)
                .ok_or_else(|| findref::Error::UnknownDataset(dataset.clone()))?;
            entry
                .backend
                .remove_index(&entry.dataset.cache_key())
                .with_context(|| format!("Failed to remove {dataset} index"))?;
            println!("Removed index for: {dataset}");
        }
        Commands::Config => {
            config.save()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

#[cfg(feature = "interactive")]
fn run_tui(router: Router, initial: Option<String>) -> Result<()> {
    findref::tui::run(router, initial)
}

#[cfg(not(feature = "interactive"))]
fn run_tui(_router: Router, _initial: Option<String>) -> Result<()> {
    anyhow::bail!("built without the `interactive` feature; use `findref query <words>`")
}
