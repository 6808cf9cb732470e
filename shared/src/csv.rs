//! 交易记录 CSV 导出

use chrono::NaiveDate;

use crate::controllers::UNKNOWN;
use crate::date;
use crate::models::Transaction;

pub const HEADERS: [&str; 7] = ["Date", "Part", "Type", "Quantity", "Machine", "User", "Notes"];
pub const MIME_TYPE: &str = "text/csv";

/// 每个单元格都加引号，内部引号加倍
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// 按传入顺序生成 CSV，表头不加引号
pub fn transactions_csv(transactions: &[Transaction]) -> String {
    let mut out = HEADERS.join(",");
    out.push('\n');
    for t in transactions {
        let cells = [
            date::csv_timestamp(t.timestamp.as_deref()),
            t.part_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            t.kind.as_str().to_string(),
            t.quantity.to_string(),
            t.machine.clone().unwrap_or_default(),
            t.user_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            t.notes.clone().unwrap_or_default(),
        ];
        let line: Vec<String> = cells.iter().map(|c| quote(c)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("transactions_{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_are_quoted_and_defaults_applied() {
        let txs: Vec<Transaction> = serde_json::from_value(json!([
            {"id": 1, "user_id": 1, "user_name": null, "part_id": 2, "part_name": "Seal \"XL\"",
             "type": "OUT", "quantity": 3, "machine": null, "notes": "line 4",
             "timestamp": "2024-02-03T04:05:06"}
        ]))
        .unwrap();

        let csv = transactions_csv(&txs);
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("Date,Part,Type,Quantity,Machine,User,Notes"));
        assert_eq!(
            lines.next(),
            Some(r#""2024-02-03 04:05:06","Seal ""XL""","OUT","3","","Unknown","line 4""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_export_is_just_the_header() {
        assert_eq!(transactions_csv(&[]), "Date,Part,Type,Quantity,Machine,User,Notes\n");
    }

    #[test]
    fn file_name_carries_the_date() {
        let day = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(export_file_name(day), "transactions_2024-07-09.csv");
    }
}
