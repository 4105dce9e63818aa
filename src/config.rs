use std::path::PathBuf;

use crate::classify::trader::TraderThresholds;
use crate::error::{AppError, Result};

pub const MARKETS_FEED_PATH: &str = "markets.jsonl";
pub const RESULTS_PATH: &str = "analysis_results.csv";
pub const FILLS_PATH: &str = "fills.csv.gz";

/// Result table names accepted by the chart stages, newest naming first.
pub const RESULT_FILE_NAMES: &[&str] = &["analysis_results.csv", "resultats_analyse.csv"];

/// Assumed lifetime of a market, used to turn total volume into a daily figure.
pub const AVG_DURATION_DAYS: f64 = 30.0;

/// Fraction of daily volume a market maker is assumed to capture as spread.
pub const SPREAD_MARGIN: f64 = 0.005;

/// Lines between two ingestion progress events (kept, dropped and malformed all count).
pub const PROGRESS_EVERY: u64 = 50_000;

/// A market with no rewards and no market maker is kept only above this volume (strict).
pub const KEEP_MIN_VOLUME: f64 = 1000.0;

/// How many market makers the trader stage exports.
pub const TOP_MARKET_MAKERS: usize = 1000;

/// Output file names written under `output_dir` / `chart_dir`.
pub mod outputs {
    pub const LABELED_MARKETS: &str = "markets_by_domain.csv";
    pub const DOMAIN_STATS: &str = "domain_stats.csv";
    pub const MARKET_MAKERS: &str = "market_makers.csv";
    pub const MARKET_SHARE_CHART: &str = "market_share.png";
    pub const SPREAD_REVENUE_CHART: &str = "spread_revenue.png";
    pub const TRADER_CHART: &str = "trader_classification.png";
}

/// Fonts tried for chart text when `CHART_FONT_PATH` is not set.
pub const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraderPolicy {
    /// Trade count and average ticket size only.
    CountBased,
    /// Adds buy/sell imbalance to the market maker and whale rules.
    ImbalanceBased,
}

impl TraderPolicy {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "count" | "count_based" | "a" => Ok(TraderPolicy::CountBased),
            "imbalance" | "imbalance_based" | "b" => Ok(TraderPolicy::ImbalanceBased),
            other => Err(AppError::Config(format!(
                "TRADER_POLICY must be 'count' or 'imbalance', got '{other}'"
            ))),
        }
    }

    pub fn thresholds(self) -> TraderThresholds {
        match self {
            TraderPolicy::CountBased => TraderThresholds::count_based(),
            TraderPolicy::ImbalanceBased => TraderThresholds::imbalance_based(),
        }
    }
}

impl std::fmt::Display for TraderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraderPolicy::CountBased => write!(f, "count"),
            TraderPolicy::ImbalanceBased => write!(f, "imbalance"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Newline-delimited market metadata export (MARKETS_FEED_PATH)
    pub feed_path: PathBuf,
    /// Kept-market table written by `ingest`, read by `domains` (RESULTS_PATH)
    pub results_path: PathBuf,
    /// Trade fills, gzip-compressed when the name ends in `.gz` (FILLS_PATH)
    pub fills_path: PathBuf,
    /// Directory for derived CSV tables (OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Directory for PNG charts; interactive view when unset (CHART_DIR)
    pub chart_dir: Option<PathBuf>,
    /// TrueType font used for chart text (CHART_FONT_PATH)
    pub chart_font_path: Option<PathBuf>,
    pub avg_duration_days: f64,
    pub spread_margin: f64,
    pub progress_every: u64,
    pub keep_min_volume: f64,
    pub top_market_makers: usize,
    pub trader_policy: TraderPolicy,
    /// Preset for `trader_policy` with any TRADER_* overrides applied.
    pub trader_thresholds: TraderThresholds,
    pub threshold_overrides: ThresholdOverrides,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let f64_or = |key: &str, default: f64| {
            var(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        let trader_policy = match var("TRADER_POLICY") {
            Some(p) => TraderPolicy::parse(&p)?,
            None => TraderPolicy::CountBased,
        };
        let threshold_overrides = parse_threshold_overrides(&var)?;
        let trader_thresholds = threshold_overrides.apply(trader_policy.thresholds());

        let avg_duration_days = f64_or("AVG_DURATION_DAYS", AVG_DURATION_DAYS);
        if avg_duration_days <= 0.0 {
            return Err(AppError::Config(
                "AVG_DURATION_DAYS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            feed_path: var("MARKETS_FEED_PATH")
                .unwrap_or_else(|| MARKETS_FEED_PATH.to_string())
                .into(),
            results_path: var("RESULTS_PATH")
                .unwrap_or_else(|| RESULTS_PATH.to_string())
                .into(),
            fills_path: var("FILLS_PATH")
                .unwrap_or_else(|| FILLS_PATH.to_string())
                .into(),
            output_dir: var("OUTPUT_DIR").unwrap_or_else(|| ".".to_string()).into(),
            chart_dir: var("CHART_DIR").map(PathBuf::from),
            chart_font_path: var("CHART_FONT_PATH").map(PathBuf::from),
            avg_duration_days,
            spread_margin: f64_or("SPREAD_MARGIN", SPREAD_MARGIN),
            progress_every: var("PROGRESS_EVERY")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(PROGRESS_EVERY),
            keep_min_volume: f64_or("KEEP_MIN_VOLUME", KEEP_MIN_VOLUME),
            top_market_makers: var("TOP_MARKET_MAKERS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(TOP_MARKET_MAKERS),
            trader_policy,
            trader_thresholds,
            threshold_overrides,
        })
    }

    /// Switch preset; `TRADER_*` overrides still win over the new preset's values.
    pub fn set_trader_policy(&mut self, policy: TraderPolicy) {
        self.trader_policy = policy;
        self.trader_thresholds = self.threshold_overrides.apply(policy.thresholds());
    }
}

/// `TRADER_*` values from the environment, applied on top of whichever preset is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub mm_min_trades: Option<u64>,
    pub mm_max_imbalance: Option<Option<f64>>,
    pub whale_min_avg_size: Option<f64>,
    pub whale_min_volume: Option<Option<f64>>,
    pub whale_min_imbalance: Option<f64>,
    pub retail_max_avg_size: Option<f64>,
    pub retail_max_trades: Option<u64>,
}

impl ThresholdOverrides {
    pub fn apply(&self, mut t: TraderThresholds) -> TraderThresholds {
        if let Some(n) = self.mm_min_trades {
            t.mm_min_trades = n;
        }
        if let Some(v) = self.mm_max_imbalance {
            t.mm_max_imbalance = v;
        }
        if let Some(v) = self.whale_min_avg_size {
            t.whale_min_avg_size = v;
        }
        if let Some(v) = self.whale_min_volume {
            t.whale_min_volume = v;
        }
        if let Some(v) = self.whale_min_imbalance {
            t.whale_min_imbalance = v;
        }
        if let Some(v) = self.retail_max_avg_size {
            t.retail_max_avg_size = v;
        }
        if let Some(n) = self.retail_max_trades {
            t.retail_max_trades = n;
        }
        t
    }
}

/// Optional thresholds accept `none`/`off` to disable the clause they guard.
fn parse_threshold_overrides<F>(var: &F) -> Result<ThresholdOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let num = |key: &str| -> Result<Option<f64>> {
        match var(key) {
            None => Ok(None),
            Some(v) => v
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| AppError::Config(format!("{key} must be a number, got '{v}'"))),
        }
    };
    let count = |key: &str| -> Result<Option<u64>> {
        match var(key) {
            None => Ok(None),
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| AppError::Config(format!("{key} must be an integer, got '{v}'"))),
        }
    };
    let optional = |key: &str| -> Result<Option<Option<f64>>> {
        match var(key) {
            Some(v) if matches!(v.trim().to_lowercase().as_str(), "none" | "off") => Ok(Some(None)),
            _ => num(key).map(|n| n.map(Some)),
        }
    };

    Ok(ThresholdOverrides {
        mm_min_trades: count("TRADER_MM_MIN_TRADES")?,
        mm_max_imbalance: optional("TRADER_MM_MAX_IMBALANCE")?,
        whale_min_avg_size: num("TRADER_WHALE_MIN_AVG_SIZE")?,
        whale_min_volume: optional("TRADER_WHALE_MIN_VOLUME")?,
        whale_min_imbalance: num("TRADER_WHALE_MIN_IMBALANCE")?,
        retail_max_avg_size: num("TRADER_RETAIL_MAX_AVG_SIZE")?,
        retail_max_trades: count("TRADER_RETAIL_MAX_TRADES")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_match_constants() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.feed_path, PathBuf::from(MARKETS_FEED_PATH));
        assert_eq!(cfg.avg_duration_days, AVG_DURATION_DAYS);
        assert_eq!(cfg.spread_margin, SPREAD_MARGIN);
        assert_eq!(cfg.progress_every, PROGRESS_EVERY);
        assert_eq!(cfg.keep_min_volume, KEEP_MIN_VOLUME);
        assert_eq!(cfg.top_market_makers, TOP_MARKET_MAKERS);
        assert_eq!(cfg.trader_policy, TraderPolicy::CountBased);
        assert_eq!(cfg.trader_thresholds, TraderThresholds::count_based());
        assert!(cfg.chart_dir.is_none());
    }

    #[test]
    fn numeric_overrides_apply_and_garbage_falls_back() {
        let cfg = config_from(&[
            ("SPREAD_MARGIN", "0.01"),
            ("KEEP_MIN_VOLUME", "not-a-number"),
            ("PROGRESS_EVERY", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.spread_margin, 0.01);
        assert_eq!(cfg.keep_min_volume, KEEP_MIN_VOLUME);
        assert_eq!(cfg.progress_every, PROGRESS_EVERY);
    }

    #[test]
    fn imbalance_policy_with_overrides() {
        let cfg = config_from(&[
            ("TRADER_POLICY", "imbalance"),
            ("TRADER_MM_MIN_TRADES", "80"),
            ("TRADER_WHALE_MIN_VOLUME", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.trader_policy, TraderPolicy::ImbalanceBased);
        assert_eq!(cfg.trader_thresholds.mm_min_trades, 80);
        assert_eq!(cfg.trader_thresholds.mm_max_imbalance, Some(0.3));
        assert_eq!(cfg.trader_thresholds.whale_min_volume, None);
    }

    #[test]
    fn switching_policy_keeps_env_overrides() {
        let mut cfg = config_from(&[
            ("TRADER_MM_MIN_TRADES", "80"),
            ("TRADER_WHALE_MIN_VOLUME", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.trader_thresholds.mm_min_trades, 80);

        cfg.set_trader_policy(TraderPolicy::ImbalanceBased);
        assert_eq!(cfg.trader_policy, TraderPolicy::ImbalanceBased);
        assert_eq!(cfg.trader_thresholds.mm_min_trades, 80);
        assert_eq!(cfg.trader_thresholds.whale_min_volume, None);
        // Untouched values come from the new preset.
        assert_eq!(cfg.trader_thresholds.mm_max_imbalance, Some(0.3));
        assert_eq!(cfg.trader_thresholds.retail_max_trades, 20);
    }

    #[test]
    fn bad_policy_or_threshold_is_a_config_error() {
        assert!(matches!(
            config_from(&[("TRADER_POLICY", "vibes")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("TRADER_RETAIL_MAX_TRADES", "lots")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("AVG_DURATION_DAYS", "0")]),
            Err(AppError::Config(_))
        ));
    }
}
