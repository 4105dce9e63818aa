use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::table::models::FillRow;
use crate::types::{Fill, Side, TraderProfile};

const REQUIRED_COLUMNS: [&str; 4] = ["wallet", "side", "price", "size"];

#[derive(Debug, Clone, PartialEq)]
pub struct FillsSummary {
    pub rows: u64,
    /// Rows skipped because a required field was missing or not a number.
    pub malformed: u64,
    /// One profile per wallet, sorted by wallet.
    pub profiles: Vec<TraderProfile>,
}

/// Running totals for one wallet.
#[derive(Debug, Default, Clone)]
struct Accumulator {
    trade_count: u64,
    total_volume: f64,
    buy_volume: f64,
    sell_volume: f64,
}

impl Accumulator {
    fn add(&mut self, fill: &Fill) {
        let amount = fill.amount_usd();
        self.trade_count += 1;
        self.total_volume += amount;
        match fill.side {
            Side::Buy => self.buy_volume += amount,
            Side::Sell => self.sell_volume += amount,
            Side::Other => {}
        }
    }

    fn finish(self, wallet: String) -> TraderProfile {
        // trade_count >= 1: an accumulator only exists once a fill was added.
        let avg_size = self.total_volume / self.trade_count as f64;
        let imbalance_ratio = if self.total_volume == 0.0 {
            0.0
        } else {
            (self.buy_volume - self.sell_volume).abs() / self.total_volume
        };
        TraderProfile {
            wallet,
            trade_count: self.trade_count,
            total_volume: self.total_volume,
            buy_volume: self.buy_volume,
            sell_volume: self.sell_volume,
            avg_size,
            imbalance_ratio,
        }
    }
}

/// Group fills by wallet into profiles, sorted by wallet so output is stable.
pub fn aggregate<I>(fills: I) -> Vec<TraderProfile>
where
    I: IntoIterator<Item = Fill>,
{
    let mut by_wallet: HashMap<String, Accumulator> = HashMap::new();
    for fill in fills {
        if let Some(acc) = by_wallet.get_mut(&fill.wallet) {
            acc.add(&fill);
        } else {
            let mut acc = Accumulator::default();
            acc.add(&fill);
            by_wallet.insert(fill.wallet, acc);
        }
    }

    let mut profiles: Vec<TraderProfile> = by_wallet
        .into_iter()
        .map(|(wallet, acc)| acc.finish(wallet))
        .collect();
    profiles.sort_by(|a, b| a.wallet.cmp(&b.wallet));
    profiles
}

/// Open a fills export, transparently gunzipping `.gz` files.
pub fn open_fills(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(1 << 20, file);
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Stream a fills CSV and aggregate it per wallet without holding the fills in memory.
pub fn read_fills<R: Read>(reader: R) -> Result<FillsSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(AppError::Format(format!(
                "fills file is missing column '{col}' (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    let mut rows = 0u64;
    let mut malformed = 0u64;
    let mut read_error: Option<csv::Error> = None;

    // Stops at the first read error; bad rows are counted and skipped.
    let fills = rdr
        .deserialize::<FillRow>()
        .map_while(|result| match result {
            Ok(row) => {
                rows += 1;
                Some(Some(Fill {
                    side: Side::parse(&row.side),
                    wallet: row.wallet,
                    price: row.price,
                    size: row.size,
                }))
            }
            Err(e) if e.is_io_error() => {
                read_error = Some(e);
                None
            }
            Err(_) => {
                rows += 1;
                malformed += 1;
                Some(None)
            }
        })
        .flatten();
    let profiles = aggregate(fills);
    if let Some(e) = read_error {
        return Err(e.into());
    }

    if malformed > 0 {
        warn!("[TRADERS] Skipped {malformed} of {rows} fill rows with missing or non-numeric fields");
    }
    info!("[TRADERS] {} fills loaded across {} wallets", rows - malformed, profiles.len());

    Ok(FillsSummary {
        rows,
        malformed,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn fill(wallet: &str, side: Side, price: f64, size: f64) -> Fill {
        Fill {
            wallet: wallet.to_string(),
            side,
            price,
            size,
        }
    }

    #[test]
    fn profile_math() {
        let profiles = aggregate(vec![
            fill("0xa", Side::Buy, 0.5, 100.0),
            fill("0xa", Side::Sell, 0.25, 40.0),
            fill("0xa", Side::Buy, 1.0, 20.0),
            fill("0xb", Side::Sell, 0.1, 10.0),
        ]);
        assert_eq!(profiles.len(), 2);

        let a = &profiles[0];
        assert_eq!(a.wallet, "0xa");
        assert_eq!(a.trade_count, 3);
        assert!((a.total_volume - 80.0).abs() < 1e-9);
        assert!((a.buy_volume - 70.0).abs() < 1e-9);
        assert!((a.sell_volume - 10.0).abs() < 1e-9);
        assert!((a.avg_size - 80.0 / 3.0).abs() < 1e-9);
        assert!((a.imbalance_ratio - 0.75).abs() < 1e-9);

        let b = &profiles[1];
        assert_eq!(b.trade_count, 1);
        assert!((b.imbalance_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_volume_wallet_has_zero_imbalance() {
        let profiles = aggregate(vec![fill("0xz", Side::Buy, 0.0, 50.0)]);
        assert_eq!(profiles[0].total_volume, 0.0);
        assert_eq!(profiles[0].avg_size, 0.0);
        assert_eq!(profiles[0].imbalance_ratio, 0.0);
    }

    #[test]
    fn unknown_side_counts_toward_totals_only() {
        let profiles = aggregate(vec![
            fill("0xa", Side::Other, 1.0, 10.0),
            fill("0xa", Side::Buy, 1.0, 10.0),
        ]);
        let p = &profiles[0];
        assert_eq!(p.trade_count, 2);
        assert!((p.total_volume - 20.0).abs() < 1e-9);
        assert!((p.imbalance_ratio - 0.5).abs() < 1e-9);
    }

    const CSV: &str = "timestamp,wallet,side,price,size\n\
                       1,0xa,buy,0.5,100\n\
                       2,0xb,SELL,0.2,50\n\
                       3,0xa,Sell,0.5,,\n\
                       4,0xa,sell,oops,10\n\
                       5,0xa, SELL ,0.5,20\n";

    #[test]
    fn reads_plain_csv_and_skips_bad_rows() {
        let summary = read_fills(CSV.as_bytes()).unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.malformed, 2);
        assert_eq!(summary.profiles.len(), 2);
        let a = &summary.profiles[0];
        assert_eq!(a.trade_count, 2);
        assert!((a.buy_volume - 50.0).abs() < 1e-9);
        assert!((a.sell_volume - 10.0).abs() < 1e-9);
    }

    #[test]
    fn reads_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fills.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(CSV.as_bytes()).unwrap();
        enc.finish().unwrap();

        let summary = read_fills(open_fills(&path).unwrap()).unwrap();
        assert_eq!(summary, read_fills(CSV.as_bytes()).unwrap());
    }

    #[test]
    fn csv_profiles_match_aggregating_the_same_fills() {
        let from_csv = read_fills(CSV.as_bytes()).unwrap().profiles;
        let direct = aggregate(vec![
            fill("0xa", Side::Buy, 0.5, 100.0),
            fill("0xb", Side::Sell, 0.2, 50.0),
            fill("0xa", Side::Sell, 0.5, 20.0),
        ]);
        assert_eq!(from_csv, direct);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("truncated download"))
        }
    }

    #[test]
    fn read_error_mid_file_is_fatal() {
        let reader = "wallet,side,price,size\n0xa,BUY,1,1\n".as_bytes().chain(FailingReader);
        assert!(matches!(read_fills(reader), Err(AppError::Csv(_))));
    }

    #[test]
    fn missing_column_is_a_format_error() {
        let err = read_fills("wallet,price,size\n0xa,1,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Format(msg) if msg.contains("'side'")));
    }
}
