use serde_json::{Map, Value};

use crate::types::MarketRecord;

pub const UNKNOWN_ASSET: &str = "unknown";
const MISSING_TEXT: &str = "N/A";

/// Outcome of decoding one raw feed line.
#[derive(Debug)]
pub enum ParsedLine {
    Record(Map<String, Value>),
    /// Not UTF-8, not JSON, or JSON that is not an object.
    Malformed,
}

/// Extractor output for one decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// `None` when the record fails every keep criterion.
    pub market: Option<MarketRecord>,
    /// Reward entries that contributed a positive rate.
    pub paying_reward_entries: u64,
}

pub fn parse_line(raw: &[u8]) -> ParsedLine {
    let Ok(text) = std::str::from_utf8(raw) else {
        return ParsedLine::Malformed;
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => ParsedLine::Record(map),
        _ => ParsedLine::Malformed,
    }
}

/// Numbers arrive either as JSON numbers or numeric strings ("1234.5").
pub fn lenient_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|x| x.is_finite())
}

pub fn extract_market(obj: &Map<String, Value>, keep_min_volume: f64) -> Extracted {
    let text = |key: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(MISSING_TEXT)
            .to_string()
    };

    let total_volume = obj
        .get("volume")
        .and_then(lenient_f64)
        .filter(|v| *v > 0.0)
        .unwrap_or(0.0);

    let market_maker_address = obj
        .get("marketMakerAddress")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut daily_reward = 0.0;
    let mut reward_asset = UNKNOWN_ASSET.to_string();
    let mut paying_reward_entries = 0;

    let rewards = obj
        .get("clobRewards")
        .and_then(|r| r.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for entry in rewards {
        let rate = entry
            .get("rewardsDailyRate")
            .and_then(lenient_f64)
            .unwrap_or(0.0);
        if rate > 0.0 {
            daily_reward += rate;
            // Last paying entry wins.
            reward_asset = entry
                .get("assetAddress")
                .and_then(|a| a.as_str())
                .unwrap_or(UNKNOWN_ASSET)
                .to_string();
            paying_reward_entries += 1;
        }
    }

    let keep =
        total_volume > keep_min_volume || daily_reward > 0.0 || market_maker_address.is_some();

    let market = keep.then(|| MarketRecord {
        question: text("question"),
        slug: text("slug"),
        active: obj.get("active").and_then(|a| a.as_bool()).unwrap_or(false),
        total_volume,
        daily_reward,
        market_maker_address,
        reward_asset,
    });

    Extracted {
        market,
        paying_reward_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KEEP_MIN_VOLUME;

    fn extract(raw: &str) -> Extracted {
        match parse_line(raw.as_bytes()) {
            ParsedLine::Record(obj) => extract_market(&obj, KEEP_MIN_VOLUME),
            ParsedLine::Malformed => panic!("expected a record for {raw}"),
        }
    }

    #[test]
    fn malformed_lines_are_flagged_not_fatal() {
        for raw in [
            &b"{not json"[..],
            b"",
            b"   ",
            b"[1,2,3]",
            b"42",
            b"\"just a string\"",
            b"{\"question\": \"\xff\xfe\"}",
        ] {
            assert!(matches!(parse_line(raw), ParsedLine::Malformed), "{raw:?}");
        }
    }

    #[test]
    fn trailing_newline_is_accepted() {
        assert!(matches!(parse_line(b"{\"slug\":\"a\"}\n"), ParsedLine::Record(_)));
        assert!(matches!(parse_line(b"{\"slug\":\"a\"}\r\n"), ParsedLine::Record(_)));
    }

    #[test]
    fn volume_keep_threshold_is_strict() {
        assert!(extract(r#"{"slug":"a","volume":1500}"#).market.is_some());
        assert!(extract(r#"{"slug":"b","volume":500}"#).market.is_none());
        assert!(extract(r#"{"slug":"c","volume":"1000"}"#).market.is_none());
        assert!(extract(r#"{"slug":"d","volume":"1000.01"}"#).market.is_some());
    }

    #[test]
    fn zero_rate_entry_does_not_override_asset() {
        let ex = extract(
            r#"{"slug":"r","clobRewards":[{"rewardsDailyRate":"10.5","assetAddress":"0xA"},{"rewardsDailyRate":"0","assetAddress":"0xB"}]}"#,
        );
        let market = ex.market.unwrap();
        assert!((market.daily_reward - 10.5).abs() < 1e-9);
        assert_eq!(market.reward_asset, "0xA");
        assert_eq!(ex.paying_reward_entries, 1);
    }

    #[test]
    fn rewards_sum_and_last_paying_asset_wins() {
        let ex = extract(
            r#"{"clobRewards":[{"rewardsDailyRate":2,"assetAddress":"0xA"},{"rewardsDailyRate":"bogus","assetAddress":"0xC"},{"rewardsDailyRate":3.5}]}"#,
        );
        let market = ex.market.unwrap();
        assert!((market.daily_reward - 5.5).abs() < 1e-9);
        assert_eq!(market.reward_asset, UNKNOWN_ASSET);
        assert_eq!(ex.paying_reward_entries, 2);
    }

    #[test]
    fn market_maker_address_alone_keeps_record() {
        let market = extract(r#"{"question":"Q","slug":"s","volume":0,"marketMakerAddress":"0xmm"}"#)
            .market
            .unwrap();
        assert_eq!(market.market_maker_address.as_deref(), Some("0xmm"));
        assert!(extract(r#"{"slug":"s","marketMakerAddress":null}"#).market.is_none());
        assert!(extract(r#"{"slug":"s","marketMakerAddress":""}"#).market.is_none());
    }

    #[test]
    fn missing_and_bad_fields_default() {
        let market = extract(
            r#"{"volume":"lots","marketMakerAddress":"0x1","clobRewards":"not-a-list","active":"yes"}"#,
        )
        .market
        .unwrap();
        assert_eq!(market.question, "N/A");
        assert_eq!(market.slug, "N/A");
        assert!(!market.active);
        assert_eq!(market.total_volume, 0.0);
        assert_eq!(market.daily_reward, 0.0);
        assert_eq!(market.reward_asset, UNKNOWN_ASSET);
    }

    #[test]
    fn negative_volume_is_clamped_to_zero() {
        let market = extract(r#"{"volume":-5000,"marketMakerAddress":"0x1"}"#).market.unwrap();
        assert_eq!(market.total_volume, 0.0);
    }

    #[test]
    fn full_record_extracts_every_field() {
        let market = extract(
            r#"{"question":"Will BTC hit 100k?","slug":"btc-100k","active":true,"volume":"25000.5","marketMakerAddress":"0xmm","clobRewards":[{"rewardsDailyRate":"40","assetAddress":"0xusdc"}]}"#,
        )
        .market
        .unwrap();
        assert_eq!(
            market,
            MarketRecord {
                question: "Will BTC hit 100k?".to_string(),
                slug: "btc-100k".to_string(),
                active: true,
                total_volume: 25000.5,
                daily_reward: 40.0,
                market_maker_address: Some("0xmm".to_string()),
                reward_asset: "0xusdc".to_string(),
            }
        );
    }
}
