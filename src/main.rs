mod charts;
mod classify;
mod config;
mod error;
mod fills;
mod ingest;
mod locate;
mod report;
mod table;
mod types;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TraderPolicy};
use crate::error::Result;
use crate::ingest::IngestSettings;

/// Census of prediction-market metadata: which markets pay liquidity rewards,
/// which domains they belong to, and who trades them.
#[derive(Parser, Debug)]
#[command(name = "market-census", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream the market feed and keep markets with rewards or real volume
    Ingest {
        /// Newline-delimited JSON market feed
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Where to write the kept-market table
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Label kept markets by domain and summarise rewards and spread revenue
    Domains {
        #[arg(long)]
        results: Option<PathBuf>,
        /// Write PNG charts here instead of opening the terminal view
        #[arg(long)]
        charts: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Aggregate fills per wallet and classify traders
    Traders {
        #[arg(long)]
        fills: Option<PathBuf>,
        #[arg(long)]
        charts: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Threshold preset: `count` or `imbalance`
        #[arg(long, value_parser = TraderPolicy::parse)]
        policy: Option<TraderPolicy>,
    },
}

fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cli.command, cfg) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, mut cfg: Config) -> Result<()> {
    match command {
        Command::Ingest { feed, out } => {
            if let Some(p) = feed {
                cfg.feed_path = p;
            }
            if let Some(p) = out {
                cfg.results_path = p;
            }
            let settings = IngestSettings {
                keep_min_volume: cfg.keep_min_volume,
                progress_every: cfg.progress_every,
            };
            let outcome = ingest::run(&cfg.feed_path, &cfg.results_path, &settings)?;
            if let Some(path) = outcome.written_to {
                info!(
                    "[INGEST] Done: {} markets kept, {} of them paying rewards ({})",
                    outcome.stats.kept,
                    outcome.stats.rewarded_markets,
                    path.display()
                );
            }
            Ok(())
        }
        Command::Domains {
            results,
            charts,
            out_dir,
        } => {
            if let Some(p) = results {
                cfg.results_path = p;
            }
            apply_outputs(&mut cfg, charts, out_dir);
            report::run_domains(&cfg)
        }
        Command::Traders {
            fills,
            charts,
            out_dir,
            policy,
        } => {
            if let Some(p) = fills {
                cfg.fills_path = p;
            }
            if let Some(policy) = policy {
                cfg.set_trader_policy(policy);
            }
            apply_outputs(&mut cfg, charts, out_dir);
            report::run_traders(&cfg)
        }
    }
}

fn apply_outputs(cfg: &mut Config, charts: Option<PathBuf>, out_dir: Option<PathBuf>) {
    if charts.is_some() {
        cfg.chart_dir = charts;
    }
    if let Some(dir) = out_dir {
        cfg.output_dir = dir;
    }
}
