use chrono::NaiveDate;
use tracing::debug;

use super::{ListView, TransactionRow};
use crate::date;
use crate::error::ApiResult;
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::{Part, Transaction, TransactionType};
use crate::protocol::{ListParts, ListTransactions, UnreadAlertCount};
use crate::session::KeyValueStore;

pub const NO_TRANSACTIONS: &str = "No transactions yet";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub total_parts: usize,
    pub low_stock_count: usize,
    pub stock_in_today: i64,
    pub stock_out_today: i64,
    pub recent: ListView<TransactionRow>,
    /// 未读告警角标，为 0 时隐藏
    pub unread_badge: Option<u64>,
}

/// 仪表盘
///
/// 依次获取零件、最近交易、未读告警数。定时刷新由前端驱动，
/// 每次刷新都构造新的控制器，后到的响应覆盖先到的。
#[derive(Debug, Clone, Default)]
pub struct DashboardController {
    parts: Vec<Part>,
    recent: Vec<Transaction>,
    recent_limit: usize,
    unread: u64,
}

impl DashboardController {
    pub async fn fetch<T, K, N>(
        client: &ApiClient<T, K, N>,
        recent_limit: u32,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let Some(parts) = client.call(&ListParts).await? else {
            return Ok(None);
        };
        let Some(transactions) = client
            .call(&ListTransactions {
                limit: Some(recent_limit),
            })
            .await?
        else {
            return Ok(None);
        };
        let Some(unread) = client.call(&UnreadAlertCount).await? else {
            return Ok(None);
        };

        debug!(
            parts = parts.parts.len(),
            transactions = transactions.transactions.len(),
            "dashboard loaded"
        );
        Ok(Some(Self {
            parts: parts.parts,
            recent: transactions.transactions,
            recent_limit: recent_limit as usize,
            unread: unread.unread_count,
        }))
    }

    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let today_total = |kind: TransactionType| -> i64 {
            self.recent
                .iter()
                .filter(|t| t.kind == kind)
                .filter(|t| t.timestamp.as_deref().and_then(date::calendar_date) == Some(today))
                .map(|t| t.quantity)
                .sum()
        };

        let rows = self
            .recent
            .iter()
            .take(self.recent_limit)
            .map(TransactionRow::from)
            .collect();

        DashboardView {
            total_parts: self.parts.len(),
            low_stock_count: self.parts.iter().filter(|p| p.is_low_stock).count(),
            stock_in_today: today_total(TransactionType::In),
            stock_out_today: today_total(TransactionType::Out),
            recent: ListView::from_rows(rows, NO_TRANSACTIONS),
            unread_badge: (self.unread > 0).then_some(self.unread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::fixtures::{part, transaction};
    use crate::http::HttpMethod;
    use crate::http::tests::Harness;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        date::parse_date_input(s).unwrap()
    }

    fn seed(h: &Harness, transactions: serde_json::Value, unread: u64) {
        h.transport.respond(
            HttpMethod::Get,
            "/api/parts",
            200,
            json!({"parts": [part(1, "Bearing", 3, 5), part(2, "Belt", 9, 5)]}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/transactions?limit=10",
            200,
            json!({ "transactions": transactions }),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/alerts/unread-count",
            200,
            json!({ "unread_count": unread }),
        );
    }

    #[tokio::test]
    async fn sums_only_todays_movements() {
        let h = Harness::signed_in();
        seed(
            &h,
            json!([
                transaction(1, "IN", 5, "2024-06-01T09:00:00"),
                transaction(2, "OUT", 2, "2024-06-01T10:00:00+00:00"),
                transaction(3, "IN", 7, "2024-05-31T23:59:59"),
                transaction(4, "OUT", 1, "2024-06-01T17:00:00")
            ]),
            0,
        );

        let view = DashboardController::fetch(&h.client, 10)
            .await
            .unwrap()
            .unwrap()
            .view(day("2024-06-01"));

        assert_eq!(view.total_parts, 2);
        assert_eq!(view.low_stock_count, 1);
        assert_eq!(view.stock_in_today, 5);
        assert_eq!(view.stock_out_today, 3);
        assert_eq!(view.recent.rows().len(), 4);
        assert_eq!(view.unread_badge, None);
    }

    #[tokio::test]
    async fn empty_history_has_its_own_message() {
        let h = Harness::signed_in();
        seed(&h, json!([]), 4);

        let view = DashboardController::fetch(&h.client, 10)
            .await
            .unwrap()
            .unwrap()
            .view(day("2024-06-01"));

        assert_eq!(view.recent, ListView::Empty(NO_TRANSACTIONS));
        assert_eq!(view.unread_badge, Some(4));
    }

    #[tokio::test]
    async fn expired_session_stops_loading() {
        let h = Harness::signed_in();
        h.transport
            .respond(HttpMethod::Get, "/api/parts", 401, json!({"msg": "expired"}));

        let result = DashboardController::fetch(&h.client, 10).await.unwrap();

        assert!(result.is_none());
        assert_eq!(h.transport.request_count(), 1);
    }
}
