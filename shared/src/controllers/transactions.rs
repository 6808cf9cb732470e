//! 交易记录页：历史列表、筛选、CSV 导出与出入库登记

use chrono::NaiveDate;
use tracing::{debug, info};

use super::{ListView, TransactionRow};
use crate::csv;
use crate::date;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::{Part, Transaction, TransactionType};
use crate::protocol::{ListParts, ListTransactions, RecordStockIn, RecordStockOut, StockMovement};
use crate::session::KeyValueStore;

pub const NO_MATCHING_TRANSACTIONS: &str = "No transactions found for the selected criteria";
pub const MISSING_FIELDS: &str = "Please fill in all required fields with valid values";

/// 交易筛选：类型精确匹配，日期范围按 UTC 日历日期闭区间比较
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if self.kind.is_some_and(|kind| kind != t.kind) {
            return false;
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        // 有日期条件时，没有可解析时间戳的记录一律排除
        let Some(day) = t.timestamp.as_deref().and_then(date::calendar_date) else {
            return false;
        };
        self.start.is_none_or(|start| day >= start) && self.end.is_none_or(|end| day <= end)
    }
}

/// 出入库表单草稿，提交前在本地校验
#[derive(Debug, Clone, PartialEq)]
pub struct StockMovementDraft {
    pub part_id: Option<i64>,
    pub kind: TransactionType,
    pub quantity: Option<i64>,
    pub machine: String,
    pub notes: String,
}

impl StockMovementDraft {
    /// 校验并生成请求体；`parts` 为最近一次获取的零件列表
    pub fn validate(&self, parts: &[Part]) -> ApiResult<StockMovement> {
        let (Some(part_id), Some(quantity)) = (self.part_id, self.quantity) else {
            return Err(ApiError::validation(MISSING_FIELDS));
        };
        if quantity <= 0 {
            return Err(ApiError::validation(MISSING_FIELDS));
        }
        if self.kind == TransactionType::Out {
            if let Some(part) = parts.iter().find(|p| p.id == part_id) {
                if part.quantity < quantity {
                    return Err(ApiError::validation(format!(
                        "Insufficient stock! Available: {}, Requested: {}",
                        part.quantity, quantity
                    )));
                }
            }
        }
        Ok(StockMovement {
            part_id,
            quantity,
            machine: self.machine.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartOption {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub fn success_message(kind: TransactionType) -> String {
    format!("Stock {} transaction created successfully!", kind)
}

#[derive(Debug, Clone, Default)]
pub struct TransactionsController {
    transactions: Vec<Transaction>,
    parts: Vec<Part>,
}

impl TransactionsController {
    pub fn new(transactions: Vec<Transaction>, parts: Vec<Part>) -> Self {
        Self {
            transactions,
            parts,
        }
    }

    /// 获取交易历史（服务端顺序，最新在前）
    pub async fn fetch<T, K, N>(client: &ApiClient<T, K, N>, limit: u32) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let envelope = client
            .call(&ListTransactions { limit: Some(limit) })
            .await?;
        Ok(envelope.map(|e| {
            debug!(count = e.transactions.len(), "transactions loaded");
            Self::new(e.transactions, Vec::new())
        }))
    }

    /// 刷新零件选择器所需的零件列表
    pub async fn with_parts<T, K, N>(self, client: &ApiClient<T, K, N>) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let envelope = client.call(&ListParts).await?;
        Ok(envelope.map(|e| Self {
            parts: e.parts,
            ..self
        }))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn view(&self, filter: &TransactionFilter) -> ListView<TransactionRow> {
        let rows = self
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .map(TransactionRow::from)
            .collect();
        ListView::from_rows(rows, NO_MATCHING_TRANSACTIONS)
    }

    pub fn part_options(&self) -> Vec<PartOption> {
        self.parts
            .iter()
            .map(|p| PartOption {
                id: p.id,
                label: format!("{} (Available: {})", p.name, p.quantity),
            })
            .collect()
    }

    /// 导出当前筛选结果
    pub fn export_csv(&self, filter: &TransactionFilter, today: NaiveDate) -> CsvExport {
        CsvExport {
            file_name: csv::export_file_name(today),
            content: csv::transactions_csv(&self.filtered(filter)),
        }
    }

    /// 登记出入库，成功后重载交易历史与零件列表
    pub async fn record_and_reload<T, K, N>(
        &self,
        client: &ApiClient<T, K, N>,
        draft: &StockMovementDraft,
        limit: u32,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let movement = draft.validate(&self.parts)?;
        let receipt = match draft.kind {
            TransactionType::In => client.call(&RecordStockIn(movement)).await?,
            TransactionType::Out => client.call(&RecordStockOut(movement)).await?,
        };
        let Some(receipt) = receipt else {
            return Ok(None);
        };
        info!(
            kind = %draft.kind,
            part = receipt.part.id,
            remaining = receipt.part.quantity,
            "stock movement recorded"
        );

        match Self::fetch(client, limit).await? {
            Some(reloaded) => reloaded.with_parts(client).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::fixtures::{part, transaction};
    use crate::http::tests::Harness;
    use crate::http::{HttpMethod, RequestBody};
    use serde_json::json;

    fn history() -> Vec<Transaction> {
        serde_json::from_value(json!([
            transaction(1, "IN", 10, "2024-03-01T08:00:00"),
            transaction(2, "OUT", 4, "2024-03-02T23:59:00"),
            transaction(3, "IN", 6, "2024-03-03T00:00:01"),
            {"id": 4, "user_id": 2, "part_id": 1, "type": "IN", "quantity": 1, "timestamp": null}
        ]))
        .unwrap()
    }

    fn parts() -> Vec<Part> {
        serde_json::from_value(json!([part(1, "Bearing 6204", 5, 2), part(2, "Belt", 0, 1)])).unwrap()
    }

    fn ids(view: &ListView<TransactionRow>) -> Vec<i64> {
        view.rows().iter().map(|r| r.id).collect()
    }

    fn day(s: &str) -> Option<NaiveDate> {
        date::parse_date_input(s)
    }

    #[test]
    fn date_range_is_inclusive_and_combines_with_type() {
        let ctl = TransactionsController::new(history(), Vec::new());

        let range = TransactionFilter {
            kind: None,
            start: day("2024-03-02"),
            end: day("2024-03-03"),
        };
        assert_eq!(ids(&ctl.view(&range)), vec![2, 3]);

        let inbound = TransactionFilter {
            kind: Some(TransactionType::In),
            ..range
        };
        assert_eq!(ids(&ctl.view(&inbound)), vec![3]);
    }

    #[test]
    fn undated_records_only_show_without_a_date_filter() {
        let ctl = TransactionsController::new(history(), Vec::new());
        assert_eq!(ids(&ctl.view(&TransactionFilter::default())), vec![1, 2, 3, 4]);

        let open_ended = TransactionFilter {
            start: day("2024-01-01"),
            ..Default::default()
        };
        assert_eq!(ids(&ctl.view(&open_ended)), vec![1, 2, 3]);
    }

    #[test]
    fn no_match_yields_empty_state() {
        let ctl = TransactionsController::new(history(), Vec::new());
        let filter = TransactionFilter {
            start: day("2025-01-01"),
            ..Default::default()
        };
        assert_eq!(ctl.view(&filter), ListView::Empty(NO_MATCHING_TRANSACTIONS));
    }

    #[test]
    fn csv_export_of_inbound_only() {
        let ctl = TransactionsController::new(history(), Vec::new());
        let filter = TransactionFilter {
            kind: TransactionType::parse("IN"),
            ..Default::default()
        };

        let export = ctl.export_csv(&filter, day("2024-03-04").unwrap());

        assert_eq!(export.file_name, "transactions_2024-03-04.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Date,Part,Type,Quantity,Machine,User,Notes");
        assert!(lines[1..].iter().all(|l| l.contains(r#","IN","#)));
        assert_eq!(
            lines[1],
            r#""2024-03-01 08:00:00","Bearing 6204","IN","10","Press #2","admin","""#
        );
        assert_eq!(lines[3], r#""","Unknown","IN","1","","Unknown","""#);
    }

    #[test]
    fn part_picker_labels_show_availability() {
        let ctl = TransactionsController::new(Vec::new(), parts());
        let options = ctl.part_options();
        assert_eq!(options[0].label, "Bearing 6204 (Available: 5)");
        assert_eq!(options[1].label, "Belt (Available: 0)");
    }

    #[tokio::test]
    async fn overdrawn_stock_out_never_reaches_the_server() {
        let h = Harness::signed_in();
        let ctl = TransactionsController::new(history(), parts());
        let draft = StockMovementDraft {
            part_id: Some(1),
            kind: TransactionType::Out,
            quantity: Some(6),
            machine: String::new(),
            notes: String::new(),
        };

        let err = ctl.record_and_reload(&h.client, &draft, 500).await.unwrap_err();

        assert_eq!(
            err.user_message(),
            "Insufficient stock! Available: 5, Requested: 6"
        );
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn reopening_the_dialog_checks_against_fresh_stock() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Get,
            "/api/parts",
            200,
            json!({"parts": [part(1, "Bearing 6204", 1, 2), part(2, "Belt", 0, 1)]}),
        );
        let stale = TransactionsController::new(history(), parts());
        let draft = StockMovementDraft {
            part_id: Some(1),
            kind: TransactionType::Out,
            quantity: Some(3),
            machine: String::new(),
            notes: String::new(),
        };
        assert!(draft.validate(&parts()).is_ok());

        let fresh = stale.with_parts(&h.client).await.unwrap().unwrap();

        assert_eq!(fresh.transactions().len(), 4);
        assert_eq!(fresh.part_options()[0].label, "Bearing 6204 (Available: 1)");
        let err = fresh.record_and_reload(&h.client, &draft, 500).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Insufficient stock! Available: 1, Requested: 3"
        );
        assert_eq!(h.transport.request_count(), 1);
    }

    #[test]
    fn required_fields_are_checked_first() {
        let draft = StockMovementDraft {
            part_id: None,
            kind: TransactionType::In,
            quantity: Some(3),
            machine: String::new(),
            notes: String::new(),
        };
        assert_eq!(
            draft.validate(&parts()),
            Err(ApiError::Validation(MISSING_FIELDS.into()))
        );
        let zero = StockMovementDraft {
            part_id: Some(1),
            quantity: Some(0),
            ..draft
        };
        assert!(zero.validate(&parts()).is_err());
    }

    #[tokio::test]
    async fn stock_in_posts_then_reloads_history_and_parts() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Post,
            "/api/transactions/in",
            201,
            json!({
                "message": "Stock IN transaction created successfully",
                "transaction": transaction(9, "IN", 3, "2024-03-05T10:00:00"),
                "part": part(2, "Belt", 3, 1)
            }),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/transactions?limit=500",
            200,
            json!({"transactions": [transaction(9, "IN", 3, "2024-03-05T10:00:00")]}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/parts",
            200,
            json!({"parts": [part(2, "Belt", 3, 1)]}),
        );

        let ctl = TransactionsController::new(Vec::new(), parts());
        let draft = StockMovementDraft {
            part_id: Some(2),
            kind: TransactionType::In,
            quantity: Some(3),
            machine: " Lathe ".into(),
            notes: String::new(),
        };
        let reloaded = ctl
            .record_and_reload(&h.client, &draft, 500)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reloaded.transactions().len(), 1);
        assert_eq!(reloaded.part_options()[0].label, "Belt (Available: 3)");
        assert_eq!(
            h.transport.requests()[0].body,
            RequestBody::Json(r#"{"part_id":2,"quantity":3,"machine":"Lathe","notes":""}"#.into())
        );
        assert_eq!(success_message(draft.kind), "Stock IN transaction created successfully!");
    }
}
