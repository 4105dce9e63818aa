use std::io::BufRead;

use tracing::info;

use crate::error::Result;
use crate::ingest::parser::{extract_market, parse_line, ParsedLine};
use crate::types::MarketRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: u64,
    pub kept: u64,
    pub malformed: u64,
    /// Reward entries with a positive daily rate, across all lines.
    pub reward_entries: u64,
    /// Kept markets paying any reward.
    pub rewarded_markets: u64,
    /// Progress events emitted so far.
    pub progress_events: u64,
}

/// Lazy, single-pass reduction of a line-delimited market feed.
///
/// Reads one line at a time into a reused buffer, so memory is bounded by the
/// longest line plus whatever the caller retains. Only kept records are yielded;
/// dropped and malformed lines are folded into [`IngestStats`]. Read errors are
/// yielded once and end the iteration.
pub struct KeptMarkets<R> {
    reader: R,
    buf: Vec<u8>,
    keep_min_volume: f64,
    progress_every: u64,
    stats: IngestStats,
    done: bool,
}

impl<R: BufRead> KeptMarkets<R> {
    pub fn new(reader: R, keep_min_volume: f64, progress_every: u64) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(64 * 1024),
            keep_min_volume,
            progress_every: progress_every.max(1),
            stats: IngestStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    fn report_progress(&mut self) {
        if self.stats.lines % self.progress_every == 0 {
            self.stats.progress_events += 1;
            info!(
                lines = self.stats.lines,
                kept = self.stats.kept,
                malformed = self.stats.malformed,
                "[INGEST] {} lines processed...",
                self.stats.lines
            );
        }
    }
}

impl<R: BufRead> Iterator for KeptMarkets<R> {
    type Item = Result<MarketRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }

            self.stats.lines += 1;
            let kept = match parse_line(&self.buf) {
                ParsedLine::Malformed => {
                    self.stats.malformed += 1;
                    None
                }
                ParsedLine::Record(obj) => {
                    let extracted = extract_market(&obj, self.keep_min_volume);
                    self.stats.reward_entries += extracted.paying_reward_entries;
                    extracted.market
                }
            };
            self.report_progress();

            if let Some(market) = kept {
                self.stats.kept += 1;
                if market.daily_reward > 0.0 {
                    self.stats.rewarded_markets += 1;
                }
                return Some(Ok(market));
            }
        }
        None
    }
}
