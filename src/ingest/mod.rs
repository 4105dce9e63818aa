pub mod parser;
pub mod stream;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppError, Result};
use crate::table::models::MarketRow;
use crate::table::write_csv;
use crate::types::MarketRecord;

pub use stream::{IngestStats, KeptMarkets};

#[derive(Debug)]
pub struct IngestOutcome {
    pub stats: IngestStats,
    /// `None` when nothing qualified and no table was written.
    pub written_to: Option<PathBuf>,
}

/// Settings the ingestion pass needs, split out of `Config` so tests can build them directly.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub keep_min_volume: f64,
    pub progress_every: u64,
}

/// Stream the feed at `feed_path`, keep interesting markets and write them,
/// richest reward first, to `out_path`.
pub fn run(feed_path: &Path, out_path: &Path, settings: &IngestSettings) -> Result<IngestOutcome> {
    let file = File::open(feed_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::InputMissing {
            what: "market feed",
            candidates: vec![feed_path.to_path_buf()],
        },
        _ => AppError::Io(e),
    })?;
    info!("[INGEST] Starting scan of {}", feed_path.display());

    let mut markets = KeptMarkets::new(
        BufReader::with_capacity(1 << 20, file),
        settings.keep_min_volume,
        settings.progress_every,
    );
    let mut kept: Vec<MarketRecord> = Vec::new();
    for market in markets.by_ref() {
        kept.push(market?);
    }
    let stats = markets.stats();

    info!(
        "[INGEST] Scan complete: {} lines scanned, {} kept, {} malformed, {} paying reward entries",
        stats.lines, stats.kept, stats.malformed, stats.reward_entries
    );

    if kept.is_empty() {
        info!("[INGEST] No qualifying markets found; nothing written");
        return Ok(IngestOutcome {
            stats,
            written_to: None,
        });
    }

    sort_by_reward(&mut kept);
    write_csv(out_path, kept.iter().map(MarketRow::from))?;
    info!("[INGEST] Results saved to {}", out_path.display());

    info!("[INGEST] Top {} markets by daily reward:", kept.len().min(5));
    for m in kept.iter().take(5) {
        info!(
            "[INGEST]   ${:>10.2}/day | vol ${:>14.2} | {}",
            m.daily_reward, m.total_volume, m.question
        );
    }

    Ok(IngestOutcome {
        stats,
        written_to: Some(out_path.to_path_buf()),
    })
}

/// Descending by daily reward. Stable, so equal rewards keep feed order.
pub fn sort_by_reward(markets: &mut [MarketRecord]) {
    markets.sort_by(|a, b| b.daily_reward.total_cmp(&a.daily_reward));
}
