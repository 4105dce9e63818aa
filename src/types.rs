use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// One kept line of the market feed. Built once by the extractor, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecord {
    pub question: String,
    pub slug: String,
    pub active: bool,
    pub total_volume: f64,
    /// Sum of positive `rewardsDailyRate` values across `clobRewards`.
    pub daily_reward: f64,
    pub market_maker_address: Option<String>,
    /// Asset of the last reward entry that paid, or `"unknown"`.
    pub reward_asset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    Sports,
    Crypto,
    #[serde(rename = "Politics (USA)")]
    PoliticsUsa,
    Geopolitics,
    Economy,
    #[serde(rename = "Culture & Tech")]
    CultureTech,
    Other,
}

impl Domain {
    /// Rule order; also the tie-break order for equal aggregates.
    pub const ALL: [Domain; 7] = [
        Domain::Sports,
        Domain::Crypto,
        Domain::PoliticsUsa,
        Domain::Geopolitics,
        Domain::Economy,
        Domain::CultureTech,
        Domain::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Domain::Sports => "Sports",
            Domain::Crypto => "Crypto",
            Domain::PoliticsUsa => "Politics (USA)",
            Domain::Geopolitics => "Geopolitics",
            Domain::Economy => "Economy",
            Domain::CultureTech => "Culture & Tech",
            Domain::Other => "Other",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-domain sums over the de-duplicated market table.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainStats {
    pub domain: Domain,
    pub market_count: usize,
    pub daily_reward: f64,
    pub total_volume: f64,
    pub est_spread_revenue: f64,
}

impl DomainStats {
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            market_count: 0,
            daily_reward: 0.0,
            total_volume: 0.0,
            est_spread_revenue: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Fills & traders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
    /// Anything other than BUY/SELL after upper-casing. Counted, but on neither side.
    Other,
}

impl Side {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            _ => Side::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub wallet: String,
    pub side: Side,
    pub price: f64,
    pub size: f64,
}

impl Fill {
    pub fn amount_usd(&self) -> f64 {
        self.price * self.size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderProfile {
    pub wallet: String,
    pub trade_count: u64,
    pub total_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub avg_size: f64,
    /// |buy - sell| / total, 0 when total is 0.
    pub imbalance_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraderClass {
    #[serde(rename = "Market Maker")]
    MarketMaker,
    Whale,
    Retail,
    #[serde(rename = "Regular Trader")]
    RegularTrader,
}

impl TraderClass {
    /// Histogram order, smallest players first.
    pub const DISPLAY_ORDER: [TraderClass; 4] = [
        TraderClass::Retail,
        TraderClass::RegularTrader,
        TraderClass::Whale,
        TraderClass::MarketMaker,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TraderClass::MarketMaker => "Market Maker",
            TraderClass::Whale => "Whale",
            TraderClass::Retail => "Retail",
            TraderClass::RegularTrader => "Regular Trader",
        }
    }
}

impl std::fmt::Display for TraderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_is_case_normalised() {
        assert_eq!(Side::parse("buy"), Side::Buy);
        assert_eq!(Side::parse(" Sell "), Side::Sell);
        assert_eq!(Side::parse("MINT"), Side::Other);
    }

    #[test]
    fn labels_match_serde_names() {
        for domain in Domain::ALL {
            let json = serde_json::to_string(&domain).unwrap();
            assert_eq!(json, format!("\"{}\"", domain.label()));
        }
        for class in TraderClass::DISPLAY_ORDER {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.label()));
        }
    }
}
