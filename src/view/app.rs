use crate::charts::thousands;
use crate::report::domains::sorted_by;
use crate::types::{DomainStats, TraderClass};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Dataset {
    Domains(Vec<DomainStats>),
    Traders(Vec<(TraderClass, u64)>),
}

/// One bar as the terminal renders it. Values are integers, so shares are
/// carried in tenths of a percent.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub label: String,
    pub value: u64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub title: String,
    pub dataset: Dataset,
    pub tab: usize,
}

const DOMAIN_TABS: &[&str] = &["Reward share", "Volume share", "Spread revenue"];
const TRADER_TABS: &[&str] = &["Trader classes (log scale)"];

impl AppState {
    pub fn new(title: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            title: title.into(),
            dataset,
            tab: 0,
        }
    }

    pub fn tabs(&self) -> &'static [&'static str] {
        match self.dataset {
            Dataset::Domains(_) => DOMAIN_TABS,
            Dataset::Traders(_) => TRADER_TABS,
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % self.tabs().len();
    }

    pub fn prev_tab(&mut self) {
        let n = self.tabs().len();
        self.tab = (self.tab + n - 1) % n;
    }

    /// Bars for the selected tab, largest first.
    pub fn bars(&self) -> Vec<BarSpec> {
        match &self.dataset {
            Dataset::Domains(stats) => match self.tab {
                0 => share_bars(stats, |s| s.daily_reward),
                1 => share_bars(stats, |s| s.total_volume),
                _ => sorted_by(stats, |s| s.est_spread_revenue)
                    .iter()
                    .map(|s| BarSpec {
                        label: s.domain.label().to_string(),
                        value: s.est_spread_revenue.max(0.0).round() as u64,
                        text: format_usd(s.est_spread_revenue),
                    })
                    .collect(),
            },
            Dataset::Traders(counts) => counts
                .iter()
                .map(|(class, n)| BarSpec {
                    label: class.label().to_string(),
                    value: log_bar(*n),
                    text: n.to_string(),
                })
                .collect(),
        }
    }
}

/// Bar length for a count on a log scale; the count itself stays in the label.
fn log_bar(n: u64) -> u64 {
    ((n as f64).ln_1p() * 100.0).round() as u64
}

fn share_bars(stats: &[DomainStats], value: fn(&DomainStats) -> f64) -> Vec<BarSpec> {
    let total: f64 = stats.iter().map(value).sum();
    sorted_by(stats, value)
        .iter()
        .map(|s| {
            let share = if total > 0.0 { value(s) / total } else { 0.0 };
            BarSpec {
                label: s.domain.label().to_string(),
                value: (share * 1000.0).round() as u64,
                text: format_share(share),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_usd(v: f64) -> String {
    format!("${}", thousands(v))
}

pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
