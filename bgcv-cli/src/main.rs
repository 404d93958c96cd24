use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::Result;

mod config;
mod commands;
mod error;

use commands::convert::ConvertArgs;
use commands::regions::RegionsArgs;
use commands::render::RenderArgs;
use config::Config;
use error::{format_error_with_suggestions, CliError};

#[derive(Parser)]
#[command(name = "bgcv")]
#[command(about = "BGC track viewer - multi-track diagrams of biosynthetic gene clusters")]
#[command(version)]
#[command(long_about = "
bgcv draws zoomable multi-track diagrams of biosynthetic gene cluster records and
exports them as standalone SVG or PNG.

Examples:
  bgcv regions --record NC_003888.3.json
  bgcv convert --record NC_003888.3.json --region 1 --out region1.json
  bgcv render --data region1.json --out region1.svg --show-labels
  bgcv render --record NC_003888.3.json --region 1 --zoom 12000-18000 --out zoom.png
  bgcv config > bgcv.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render viewer data or an antiSMASH region to SVG/PNG
    Render(RenderArgs),

    /// Convert an antiSMASH record into viewer data JSON
    Convert(ConvertArgs),

    /// List the regions of an antiSMASH record
    Regions(RegionsArgs),

    /// Print an example configuration file
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RenderFormat {
    Svg,
    Png,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Render(args) => commands::render::execute(&config, args)?,
        Commands::Convert(args) => commands::convert::execute(args)?,
        Commands::Regions(args) => commands::regions::execute(args)?,
        Commands::Config => print!("{}", Config::example_toml()?),
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => eprintln!("Error: {}", format_error_with_suggestions(cli_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}
