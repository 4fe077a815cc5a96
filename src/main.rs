use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use speechscore::config::EngineConfig;
use speechscore::scorer::EngineBuildParams;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Skill catalog (CSV or JSON). Defaults to the embedded 110-skill catalog.
    #[arg(global = true, long)]
    catalog: Option<String>,

    /// Engine configuration file (JSON).
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an evaluation from its skill score records.
    Score(cmd::score::ScoreArgs),
    /// Resolve stored evaluations through the legacy fallbacks.
    Resolve(cmd::resolve::ResolveArgs),
    /// List the skill catalog.
    Catalog(cmd::catalog::CatalogArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Initializing speechscore...");

    let sub_matches = matches.subcommand().map(|(_, m)| m);
    let cli_config = match &cli.command {
        Commands::Score(args) => Some(&args.config),
        Commands::Resolve(args) => Some(&args.config),
        Commands::Catalog(_) => None,
    };

    let config = if let Some(path) = &cli.config {
        info!("⚙️  Loading Config from: {}", path);
        let mut file_config = EngineConfig::load_from_file(path).unwrap_or_else(|e| {
            error!("{}", e);
            process::exit(1);
        });
        if let (Some(cli_config), Some(sub_matches)) = (cli_config, sub_matches) {
            file_config.merge_from_cli(cli_config, sub_matches);
        }
        file_config
    } else {
        cli_config.cloned().unwrap_or_default()
    };

    if cli.catalog.is_none() {
        info!("📚 Using embedded skill catalog");
    }

    let engine_result =
        EngineBuildParams::load_from_disk(cli.catalog.as_deref(), Some(config), cli.debug);

    let engine = match engine_result {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("❌ FATAL ERROR INITIALIZING ENGINE: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Score(args) => cmd::score::run(args, engine),
        Commands::Resolve(args) => cmd::resolve::run(args, engine),
        Commands::Catalog(args) => cmd::catalog::run(args, engine),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
