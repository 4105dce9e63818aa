use tracing::info;

use crate::classify::{classify_trader, TraderThresholds};
use crate::types::{TraderClass, TraderProfile};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTrader {
    pub profile: TraderProfile,
    pub class: TraderClass,
}

pub fn classify_all(profiles: Vec<TraderProfile>, t: &TraderThresholds) -> Vec<ClassifiedTrader> {
    profiles
        .into_iter()
        .map(|profile| ClassifiedTrader {
            class: classify_trader(&profile, t),
            profile,
        })
        .collect()
}

/// Trader count per class, in histogram display order. Empty classes report 0.
pub fn class_counts(traders: &[ClassifiedTrader]) -> [(TraderClass, u64); 4] {
    TraderClass::DISPLAY_ORDER.map(|class| {
        let n = traders.iter().filter(|t| t.class == class).count() as u64;
        (class, n)
    })
}

/// Biggest market makers by volume; ties broken by wallet so output is stable.
pub fn top_market_makers(traders: &[ClassifiedTrader], limit: usize) -> Vec<&ClassifiedTrader> {
    let mut makers: Vec<&ClassifiedTrader> = traders
        .iter()
        .filter(|t| t.class == TraderClass::MarketMaker)
        .collect();
    makers.sort_by(|a, b| {
        b.profile
            .total_volume
            .total_cmp(&a.profile.total_volume)
            .then_with(|| a.profile.wallet.cmp(&b.profile.wallet))
    });
    makers.truncate(limit);
    makers
}

pub fn log_distribution(counts: &[(TraderClass, u64)]) {
    info!("[TRADERS] Distribution:");
    for (class, n) in counts {
        info!("[TRADERS]   {:<16} {:>10}", class.label(), n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trader(wallet: &str, trade_count: u64, total_volume: f64) -> TraderProfile {
        TraderProfile {
            wallet: wallet.to_string(),
            trade_count,
            total_volume,
            buy_volume: total_volume / 2.0,
            sell_volume: total_volume / 2.0,
            avg_size: total_volume / trade_count as f64,
            imbalance_ratio: 0.0,
        }
    }

    fn sample() -> Vec<ClassifiedTrader> {
        classify_all(
            vec![
                trader("0xmm1", 5000, 40_000.0),
                trader("0xmm2", 2000, 90_000.0),
                trader("0xmm3", 1500, 40_000.0),
                trader("0xwhale", 2, 20_000.0),
                trader("0xretail", 3, 60.0),
                trader("0xreg", 200, 10_000.0),
            ],
            &TraderThresholds::count_based(),
        )
    }

    #[test]
    fn counts_follow_display_order_including_empty() {
        let counts = class_counts(&sample());
        assert_eq!(
            counts,
            [
                (TraderClass::Retail, 1),
                (TraderClass::RegularTrader, 1),
                (TraderClass::Whale, 1),
                (TraderClass::MarketMaker, 3),
            ]
        );
        assert_eq!(class_counts(&[]).iter().map(|(_, n)| n).sum::<u64>(), 0);
    }

    #[test]
    fn top_market_makers_by_volume_then_wallet() {
        let traders = sample();
        let top: Vec<&str> = top_market_makers(&traders, 10)
            .iter()
            .map(|t| t.profile.wallet.as_str())
            .collect();
        assert_eq!(top, vec!["0xmm2", "0xmm1", "0xmm3"]);

        assert_eq!(top_market_makers(&traders, 2).len(), 2);
        assert!(top_market_makers(&traders, 0).is_empty());
    }
}
