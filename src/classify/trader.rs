use crate::types::{TraderClass, TraderProfile};

/// Named thresholds for the trader rule chain. All comparisons are strict.
///
/// The two presets disagree on what a market maker looks like; neither is
/// authoritative, so both are kept and selected through configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraderThresholds {
    /// Market maker: more trades than this...
    pub mm_min_trades: u64,
    /// ...and, when set, a buy/sell imbalance below this.
    pub mm_max_imbalance: Option<f64>,
    /// Whale: average ticket above this...
    pub whale_min_avg_size: f64,
    /// ...or, when set, total volume above this with imbalance above `whale_min_imbalance`.
    pub whale_min_volume: Option<f64>,
    pub whale_min_imbalance: f64,
    /// Retail: average ticket below this and fewer trades than `retail_max_trades`.
    pub retail_max_avg_size: f64,
    pub retail_max_trades: u64,
}

impl TraderThresholds {
    pub fn count_based() -> Self {
        Self {
            mm_min_trades: 1000,
            mm_max_imbalance: None,
            whale_min_avg_size: 5000.0,
            whale_min_volume: None,
            whale_min_imbalance: 0.6,
            retail_max_avg_size: 100.0,
            retail_max_trades: 50,
        }
    }

    pub fn imbalance_based() -> Self {
        Self {
            mm_min_trades: 50,
            mm_max_imbalance: Some(0.3),
            whale_min_avg_size: 2000.0,
            whale_min_volume: Some(50_000.0),
            whale_min_imbalance: 0.6,
            retail_max_avg_size: 100.0,
            retail_max_trades: 20,
        }
    }

    fn is_market_maker(&self, p: &TraderProfile) -> bool {
        p.trade_count > self.mm_min_trades
            && self
                .mm_max_imbalance
                .map_or(true, |max| p.imbalance_ratio < max)
    }

    fn is_whale(&self, p: &TraderProfile) -> bool {
        p.avg_size > self.whale_min_avg_size
            || self.whale_min_volume.map_or(false, |min| {
                p.total_volume > min && p.imbalance_ratio > self.whale_min_imbalance
            })
    }

    fn is_retail(&self, p: &TraderProfile) -> bool {
        p.avg_size < self.retail_max_avg_size && p.trade_count < self.retail_max_trades
    }
}

impl Default for TraderThresholds {
    fn default() -> Self {
        Self::count_based()
    }
}

/// First matching rule wins: market maker, whale, retail, otherwise regular trader.
pub fn classify_trader(profile: &TraderProfile, t: &TraderThresholds) -> TraderClass {
    if t.is_market_maker(profile) {
        TraderClass::MarketMaker
    } else if t.is_whale(profile) {
        TraderClass::Whale
    } else if t.is_retail(profile) {
        TraderClass::Retail
    } else {
        TraderClass::RegularTrader
    }
}
