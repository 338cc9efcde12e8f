use crate::exchanges::OrderRecord;
use crate::history::Totals;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::Path;

/// Column order of the report file.
pub const CSV_COLUMNS: [&str; 14] = [
    "orderNumber",
    "advNo",
    "tradeType",
    "asset",
    "fiat",
    "fiatSymbol",
    "amount",
    "totalPrice",
    "unitPrice",
    "orderStatus",
    "createTime",
    "commission",
    "counterPartNickName",
    "advertisementRole",
];

/// Writes `records` to `path`, replacing any existing file. Returns the number
/// of data rows written.
pub fn write_csv(records: &[OrderRecord], path: impl AsRef<Path>) -> Result<usize, csv::Error> {
    // The header is written by hand so an empty history still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;

    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(records.len())
}

pub fn format_summary(totals: &Totals) -> String {
    let mut text = String::new();

    for (asset, sides) in &totals.assets {
        let _ = writeln!(text, "Total {} (BUY): {}", asset, display(sides.buy));
        let _ = writeln!(text, "Total {} (SELL): {}", asset, display(sides.sell));
    }
    let _ = writeln!(text, "Total Fiat (BUY): {}", display(totals.fiat.buy));
    let _ = writeln!(text, "Total Fiat (SELL): {}", display(totals.fiat.sell));

    text
}

fn display(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SideTotals;
    use std::str::FromStr;
    use tempfile::tempdir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order_history.csv");
        let records = vec![
            OrderRecord {
                order_number: Some("1001".to_string()),
                trade_type: Some("BUY".to_string()),
                asset: Some("USDT".to_string()),
                amount: Some("50.00".to_string()),
                counter_part_nick_name: Some("Smith, J".to_string()),
                ..Default::default()
            },
            OrderRecord {
                order_number: Some("1002".to_string()),
                create_time: Some("1700000000000".to_string()),
                ..Default::default()
            },
        ];

        let written = write_csv(&records, &path).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 14);
        assert_eq!(&rows[0][0], "1001");
        assert_eq!(&rows[0][4], "");
        assert_eq!(&rows[0][12], "Smith, J");
        assert_eq!(&rows[1][10], "1700000000000");
        assert_eq!(&rows[1][2], "");
    }

    #[test]
    fn test_csv_for_empty_history_has_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(content.trim_end(), CSV_COLUMNS.join(","));
    }

    #[test]
    fn test_csv_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        assert!(write_csv(&[], &path).is_err());
    }

    #[test]
    fn test_summary_lines() {
        let mut totals = Totals::default();
        totals.assets.insert(
            "USDT".to_string(),
            SideTotals {
                buy: dec("110.00"),
                sell: dec("40"),
            },
        );
        totals.assets.insert(
            "BTC".to_string(),
            SideTotals {
                buy: Decimal::ZERO,
                sell: dec("0.250"),
            },
        );
        totals.fiat = SideTotals {
            buy: dec("9900.00"),
            sell: dec("18640.5"),
        };

        assert_eq!(
            format_summary(&totals),
            "Total USDT (BUY): 110\n\
             Total USDT (SELL): 40\n\
             Total BTC (BUY): 0\n\
             Total BTC (SELL): 0.25\n\
             Total Fiat (BUY): 9900\n\
             Total Fiat (SELL): 18640.5\n"
        );
    }

    #[test]
    fn test_summary_without_orders() {
        assert_eq!(
            format_summary(&Totals::default()),
            "Total Fiat (BUY): 0\nTotal Fiat (SELL): 0\n"
        );
    }
}
