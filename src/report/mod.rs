pub mod domains;
pub mod traders;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, warn};

use crate::charts;
use crate::config::{outputs, Config, RESULT_FILE_NAMES};
use crate::error::Result;
use crate::fills::{open_fills, read_fills};
use crate::locate::locate;
use crate::table::models::{DomainStatsRow, TraderRow};
use crate::table::write_csv;
use crate::types::{DomainStats, TraderClass};
use crate::view;
use domains::{domain_stats, label, load_results, log_stats_head, SpreadModel};
use traders::{class_counts, classify_all, log_distribution, top_market_makers};

#[derive(Debug, Clone, PartialEq)]
pub struct DomainReport {
    pub markets: usize,
    pub stats: Vec<DomainStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderReport {
    pub wallets: usize,
    pub counts: [(TraderClass, u64); 4],
    pub market_makers_written: usize,
}

/// Label the prior result table by domain and write both derived tables.
pub fn build_domain_report(cfg: &Config) -> Result<DomainReport> {
    let path = locate("result table", &cfg.results_path, RESULT_FILE_NAMES)?;
    info!("[DOMAINS] Loading {}", path.display());
    let rows = load_results(BufReader::new(File::open(&path)?))?;

    let model = SpreadModel {
        avg_duration_days: cfg.avg_duration_days,
        spread_margin: cfg.spread_margin,
    };
    let markets = label(rows);
    let stats = domain_stats(&markets, &model);

    let labeled_path = cfg.output_dir.join(outputs::LABELED_MARKETS);
    write_csv(&labeled_path, markets.iter().map(|m| m.row(&model)))?;
    let stats_path = cfg.output_dir.join(outputs::DOMAIN_STATS);
    write_csv(&stats_path, stats.iter().map(DomainStatsRow::from))?;
    info!(
        "[DOMAINS] Saved {} and {}",
        labeled_path.display(),
        stats_path.display()
    );

    log_stats_head(&stats);
    Ok(DomainReport {
        markets: markets.len(),
        stats,
    })
}

pub fn run_domains(cfg: &Config) -> Result<()> {
    let report = build_domain_report(cfg)?;
    if report.markets == 0 {
        info!("[DOMAINS] No markets in the result table; nothing to chart");
        return Ok(());
    }

    match &cfg.chart_dir {
        Some(dir) => {
            charts::ensure_font(cfg.chart_font_path.as_deref())?;
            let share = dir.join(outputs::MARKET_SHARE_CHART);
            charts::draw_market_share(&share, &report.stats)?;
            let spread = dir.join(outputs::SPREAD_REVENUE_CHART);
            charts::draw_spread_revenue(&spread, &report.stats)?;
            log_charts(&[&share, &spread]);
            Ok(())
        }
        None => view::show_domains(&report.stats),
    }
}

/// Aggregate the fills export per wallet, classify, and write the market maker table.
pub fn build_trader_report(cfg: &Config) -> Result<TraderReport> {
    let fallback = cfg
        .fills_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned);
    let names: Vec<&str> = fallback.as_deref().into_iter().collect();
    let path = locate("fills file", &cfg.fills_path, &names)?;
    info!("[TRADERS] Aggregating fills from {}", path.display());

    let summary = read_fills(open_fills(&path)?)?;
    if summary.rows == summary.malformed && summary.rows > 0 {
        warn!("[TRADERS] Every fill row was malformed; check the column types");
    }
    let traders = classify_all(summary.profiles, &cfg.trader_thresholds);
    let counts = class_counts(&traders);
    info!("[TRADERS] Policy: {}", cfg.trader_policy);
    log_distribution(&counts);

    let makers = top_market_makers(&traders, cfg.top_market_makers);
    let written = if makers.is_empty() {
        info!("[TRADERS] No market makers found; market maker table not written");
        0
    } else {
        let out = cfg.output_dir.join(outputs::MARKET_MAKERS);
        let n = write_csv(
            &out,
            makers.iter().map(|t| TraderRow::new(&t.profile, t.class)),
        )?;
        info!("[TRADERS] Saved {n} market makers to {}", out.display());
        n
    };

    Ok(TraderReport {
        wallets: traders.len(),
        counts,
        market_makers_written: written,
    })
}

pub fn run_traders(cfg: &Config) -> Result<()> {
    let report = build_trader_report(cfg)?;
    if report.wallets == 0 {
        info!("[TRADERS] No fills to classify; nothing to chart");
        return Ok(());
    }

    match &cfg.chart_dir {
        Some(dir) => {
            charts::ensure_font(cfg.chart_font_path.as_deref())?;
            let hist = dir.join(outputs::TRADER_CHART);
            charts::draw_trader_histogram(&hist, &report.counts)?;
            log_charts(&[&hist]);
            Ok(())
        }
        None => view::show_traders(&report.counts),
    }
}

fn log_charts(paths: &[&Path]) {
    for p in paths {
        info!("[CHART] Wrote {}", p.display());
    }
}
