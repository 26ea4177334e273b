// Command-line entry point for statstree.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use statstree::application::AnalyzeUsecase;
use statstree::domain::callgraph::RootPolicy;
use statstree::infrastructure::config::Config;
use statstree::infrastructure::{stored_profile_path, JsonStatsFile, PolicyTreeBuilder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Stats JSON file
    #[arg(required_unless_present = "stored", conflicts_with = "stored")]
    input: Option<PathBuf>,

    /// Name of a previously uploaded profile in the temp directory
    #[arg(long)]
    stored: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root tie-break policy (max-cumulative, last-match); overrides the config
    #[arg(short, long, value_parser = parse_policy)]
    policy: Option<RootPolicy>,
}

fn parse_policy(s: &str) -> Result<RootPolicy, String> {
    s.parse()
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let policy = cli.policy.unwrap_or(config.root_policy);

    let path = match (&cli.input, &cli.stored) {
        (Some(path), _) => path.clone(),
        (None, Some(name)) => stored_profile_path(name)?,
        (None, None) => anyhow::bail!("Please provide a stats file or --stored <name>"),
    };
    info!("Building call tree from {} ({})", path.display(), policy);

    let source = JsonStatsFile::new(path);
    let builder = PolicyTreeBuilder::new(policy);
    let usecase = AnalyzeUsecase {
        source: &source,
        builder: &builder,
    };

    let report = usecase.run()?;
    println!("{}", report);
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
