use std::collections::HashSet;
use std::io::Read;

use tracing::{info, warn};

use crate::classify::classify_domain;
use crate::error::Result;
use crate::table::models::{LabeledMarketRow, ResultRow};
use crate::types::{Domain, DomainStats};

/// Spread estimate inputs. Both are configuration, never literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadModel {
    pub avg_duration_days: f64,
    pub spread_margin: f64,
}

impl SpreadModel {
    pub fn est_daily_volume(&self, total_volume: f64) -> f64 {
        total_volume / self.avg_duration_days
    }

    pub fn est_spread_revenue(&self, total_volume: f64) -> f64 {
        self.est_daily_volume(total_volume) * self.spread_margin
    }
}

/// A de-duplicated market with its domain label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMarket {
    pub question: String,
    pub slug: String,
    pub domain: Domain,
    pub total_volume: f64,
    pub daily_reward: f64,
}

impl LabeledMarket {
    pub fn row<'a>(&'a self, model: &SpreadModel) -> LabeledMarketRow<'a> {
        LabeledMarketRow {
            question: &self.question,
            slug: &self.slug,
            domain: self.domain,
            total_volume: self.total_volume,
            daily_reward_usdc: self.daily_reward,
            est_daily_volume: model.est_daily_volume(self.total_volume),
            est_spread_revenue: model.est_spread_revenue(self.total_volume),
        }
    }
}

/// Read a result table, dropping repeated slugs (first occurrence wins).
pub fn load_results<R: Read>(reader: R) -> Result<Vec<ResultRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    let mut malformed = 0u64;
    let mut duplicates = 0u64;

    for result in rdr.deserialize::<ResultRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => {
                malformed += 1;
                continue;
            }
        };
        if seen.insert(row.slug.clone()) {
            rows.push(row);
        } else {
            duplicates += 1;
        }
    }

    if malformed > 0 {
        warn!("[DOMAINS] Skipped {malformed} unreadable result rows");
    }
    info!(
        "[DOMAINS] Data loaded: {} unique markets ({} duplicate slugs dropped)",
        rows.len(),
        duplicates
    );
    Ok(rows)
}

pub fn label(rows: Vec<ResultRow>) -> Vec<LabeledMarket> {
    rows.into_iter()
        .map(|r| LabeledMarket {
            domain: classify_domain(&r.question, &r.slug),
            question: r.question,
            slug: r.slug,
            total_volume: r.total_volume,
            daily_reward: r.daily_reward_usdc,
        })
        .collect()
}

/// Sum reward, volume and spread estimate per domain.
///
/// Only domains with at least one market appear. Sorted by daily reward,
/// descending; ties keep rule order.
pub fn domain_stats(markets: &[LabeledMarket], model: &SpreadModel) -> Vec<DomainStats> {
    let mut stats: Vec<DomainStats> = Domain::ALL.iter().map(|&d| DomainStats::empty(d)).collect();
    for m in markets {
        // Domain::ALL is in declaration order, so the discriminant is the index.
        let s = &mut stats[m.domain as usize];
        s.market_count += 1;
        s.daily_reward += m.daily_reward;
        s.total_volume += m.total_volume;
        s.est_spread_revenue += model.est_spread_revenue(m.total_volume);
    }
    stats.retain(|s| s.market_count > 0);
    stats.sort_by(|a, b| b.daily_reward.total_cmp(&a.daily_reward));
    stats
}

/// Same stats, re-sorted by another column (descending, stable).
pub fn sorted_by<F>(stats: &[DomainStats], key: F) -> Vec<DomainStats>
where
    F: Fn(&DomainStats) -> f64,
{
    let mut out = stats.to_vec();
    out.sort_by(|a, b| key(b).total_cmp(&key(a)));
    out
}

pub fn log_stats_head(stats: &[DomainStats]) {
    info!(
        "[DOMAINS] {:<16} {:>8} {:>16} {:>20} {:>18}",
        "domain", "markets", "daily_reward", "total_volume", "est_spread_rev"
    );
    for s in stats {
        info!(
            "[DOMAINS] {:<16} {:>8} {:>16.2} {:>20.2} {:>18.2}",
            s.domain.label(),
            s.market_count,
            s.daily_reward,
            s.total_volume,
            s.est_spread_revenue
        );
    }
}
