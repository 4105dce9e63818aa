//! CSV row shapes for every table the tool reads or writes.
//! Column names are the contract shared between the stages.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Domain, DomainStats, MarketRecord, TraderClass, TraderProfile};

/// Kept-market table written by `ingest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRow<'a> {
    pub question: &'a str,
    pub slug: &'a str,
    pub active: bool,
    pub total_volume: f64,
    pub daily_reward_usdc: f64,
    pub mm_address: Option<&'a str>,
    pub reward_asset: &'a str,
}

impl<'a> From<&'a MarketRecord> for MarketRow<'a> {
    fn from(m: &'a MarketRecord) -> Self {
        Self {
            question: &m.question,
            slug: &m.slug,
            active: m.active,
            total_volume: m.total_volume,
            daily_reward_usdc: m.daily_reward,
            mm_address: m.market_maker_address.as_deref(),
            reward_asset: &m.reward_asset,
        }
    }
}

/// A row of a prior result table. Only the four required columns are read;
/// older exports may carry extra columns, which are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRow {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub question: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_volume: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub daily_reward_usdc: f64,
}

/// Market table joined with its domain and spread estimate, written by `domains`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMarketRow<'a> {
    pub question: &'a str,
    pub slug: &'a str,
    pub domain: Domain,
    pub total_volume: f64,
    pub daily_reward_usdc: f64,
    pub est_daily_volume: f64,
    pub est_spread_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStatsRow {
    pub domain: Domain,
    pub market_count: usize,
    pub daily_reward_usdc: f64,
    pub total_volume: f64,
    pub est_spread_revenue: f64,
}

impl From<&DomainStats> for DomainStatsRow {
    fn from(s: &DomainStats) -> Self {
        Self {
            domain: s.domain,
            market_count: s.market_count,
            daily_reward_usdc: s.daily_reward,
            total_volume: s.total_volume,
            est_spread_revenue: s.est_spread_revenue,
        }
    }
}

/// One fill as found in the fills export; extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FillRow {
    pub wallet: String,
    pub side: String,
    pub price: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraderRow<'a> {
    pub wallet: &'a str,
    pub trade_count: u64,
    pub total_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub avg_size: f64,
    pub imbalance_ratio: f64,
    pub category: TraderClass,
}

impl<'a> TraderRow<'a> {
    pub fn new(p: &'a TraderProfile, category: TraderClass) -> Self {
        Self {
            wallet: &p.wallet,
            trade_count: p.trade_count,
            total_volume: p.total_volume,
            buy_volume: p.buy_volume,
            sell_volume: p.sell_volume,
            avg_size: p.avg_size,
            imbalance_ratio: p.imbalance_ratio,
            category,
        }
    }
}

/// Empty, missing or unparsable numbers become 0.
fn lenient_f64<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

fn text_or_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_rows_tolerate_extra_columns_and_bad_numbers() {
        let data = "question,slug,active,total_volume,daily_reward_usdc,domain\n\
                    Q1,s1,True,1500.5,,Sports\n\
                    Q2,s2,False,n/a,12,Other\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<ResultRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slug, "s1");
        assert_eq!(rows[0].total_volume, 1500.5);
        assert_eq!(rows[0].daily_reward_usdc, 0.0);
        assert_eq!(rows[1].total_volume, 0.0);
        assert_eq!(rows[1].daily_reward_usdc, 12.0);
    }

    #[test]
    fn result_rows_with_only_required_columns() {
        let data = "slug,question,daily_reward_usdc,total_volume\na,Q,1,2\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let row: ResultRow = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(row.question, "Q");
        assert_eq!(row.total_volume, 2.0);
    }

    #[test]
    fn market_row_writes_expected_header() {
        let record = MarketRecord {
            question: "Q, with comma".to_string(),
            slug: "q".to_string(),
            active: true,
            total_volume: 1500.0,
            daily_reward: 0.0,
            market_maker_address: None,
            reward_asset: "unknown".to_string(),
        };
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(MarketRow::from(&record)).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "question,slug,active,total_volume,daily_reward_usdc,mm_address,reward_asset\n\
             \"Q, with comma\",q,true,1500.0,0.0,,unknown\n"
        );
    }
}
