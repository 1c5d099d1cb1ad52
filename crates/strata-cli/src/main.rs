use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use strata_core::{
    format_search_results, unified_search, AstIndex, ClassRef, Config, IndexService, IndexSource,
    QueryEngine,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Structural code index for Java and Go repositories", long_about = None)]
struct Cli {
    /// Repository root (overrides config)
    #[arg(short, long, global = true)]
    repo: Option<PathBuf>,

    /// Config file (default: ./strata.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory (overrides config)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the index cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the repository and write a fresh cache snapshot
    Build,
    /// Find a class, or a method or field inside it
    Search {
        /// Class name, simple or fully qualified (inner classes as Outer$Inner)
        #[arg(long = "class")]
        class_name: String,
        /// Method name, optionally with a parameter list: "run(String s)"
        #[arg(long, conflicts_with = "field")]
        method: Option<String>,
        /// Field name
        #[arg(long)]
        field: Option<String>,
        /// Print results as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// List all transitive super classes of a class
    Supers {
        class_name: String,
        #[arg(long)]
        json: bool,
    },
    /// List all transitive sub classes of a class
    Subs {
        class_name: String,
        #[arg(long)]
        json: bool,
    },
    /// Show node counts by kind and language
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or clear the index cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache settings and files
    Info,
    /// List cache files for this repository
    List,
    /// Delete this repository's cache file
    Clear,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let service = IndexService::new(load_config(&cli)?);

    match cli.command {
        Commands::Build => {
            let index = with_spinner("Building index", || service.build())?;
            println!("Indexed {} nodes from {}", index.len(), service.repository_root().display());
        }
        Commands::Search {
            class_name,
            method,
            field,
            json,
        } => {
            let index = load_index(&service)?;
            let results = unified_search(
                &index,
                &class_name,
                method.as_deref(),
                field.as_deref(),
                service.search_options(),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{}", format_search_results(&results));
            }
        }
        Commands::Supers { class_name, json } => {
            let index = load_index(&service)?;
            let supers = QueryEngine::new(&index).super_classes(&class_name);
            print_class_refs(&class_name, "super classes", &supers, json)?;
        }
        Commands::Subs { class_name, json } => {
            let index = load_index(&service)?;
            let subs = QueryEngine::new(&index).sub_classes(&class_name);
            print_class_refs(&class_name, "sub classes", &subs, json)?;
        }
        Commands::Stats { json } => {
            let index = load_index(&service)?;
            let stats = index.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total nodes: {}", stats.total);
                println!("By kind:");
                for (kind, count) in &stats.by_kind {
                    println!("  {:<14} {}", kind.as_str(), count);
                }
                println!("By language:");
                for (language, count) in &stats.by_language {
                    println!("  {:<14} {}", language.as_str(), count);
                }
            }
        }
        Commands::Cache { action } => match action {
            CacheAction::Info => {
                let info = service.cache_info()?;
                println!("Cache enabled:      {}", info.enabled);
                println!("Rebuild on startup: {}", info.rebuild_on_startup);
                println!("Cache directory:    {}", info.cache_dir.display());
                println!("Cache file:         {}", info.cache_file.display());
                if info.files.is_empty() {
                    println!("No cache files.");
                }
                for file in &info.files {
                    let modified = file
                        .modified
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("  {} ({} bytes, modified {})", file.path.display(), file.size, modified);
                }
            }
            CacheAction::List => {
                let files = service.list_cache_files()?;
                if files.is_empty() {
                    println!("No cache files.");
                }
                for file in files {
                    println!("{}", file.display());
                }
            }
            CacheAction::Clear => {
                let removed = service.clear_cache()?;
                println!("Removed {} cache file(s)", removed.len());
            }
        },
    }

    Ok(())
}

/// Log to stderr. `STRATA_LOG` (or `RUST_LOG`) wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("STRATA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().wrap_err("failed to load config")?,
    };

    if let Some(repo) = &cli.repo {
        config.repository.path = repo.to_string_lossy().into_owned();
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache.cache_dir = dir.to_string_lossy().into_owned();
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    Ok(config)
}

fn load_index(service: &IndexService) -> Result<AstIndex> {
    let (index, source) = with_spinner("Loading index", || service.build_or_load())?;
    if source == IndexSource::Built {
        tracing::info!(nodes = index.len(), "index built from source");
    }
    Ok(index)
}

fn with_spinner<T, E, F>(message: &str, f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    pb.finish_and_clear();
    Ok(result?)
}

fn print_class_refs(class_name: &str, label: &str, refs: &[ClassRef], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(refs)?);
        return Ok(());
    }
    if refs.is_empty() {
        println!("No {label} found for {class_name}");
        return Ok(());
    }
    println!("{} {label} of {class_name}:", refs.len());
    for class_ref in refs {
        println!("  {class_ref}");
    }
    Ok(())
}
