use tracing::{debug, info};

use super::ListView;
use crate::date;
use crate::error::ApiResult;
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::Alert;
use crate::protocol::{ListAlerts, MarkAlertRead, MarkAllAlertsRead};
use crate::session::KeyValueStore;

pub const HEALTHY: &str = "Inventory is healthy!";
pub const HEALTHY_DETAIL: &str = "No low stock alerts at the moment.";
pub const UNKNOWN_PART: &str = "Unknown Part";

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub id: i64,
    pub part: String,
    pub message: String,
    pub date: String,
    pub time: String,
    /// 未读告警标记为 "New"，并提供 Dismiss 操作
    pub is_new: bool,
}

impl From<&Alert> for AlertRow {
    fn from(a: &Alert) -> Self {
        Self {
            id: a.id,
            part: a
                .part_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_PART.to_string()),
            message: a.message.clone(),
            date: date::display_date(a.created_at.as_deref()),
            time: date::display_time(a.created_at.as_deref()),
            is_new: !a.seen,
        }
    }
}

/// 告警页
#[derive(Debug, Clone, Default)]
pub struct AlertsController {
    alerts: Vec<Alert>,
}

impl AlertsController {
    pub fn new(alerts: Vec<Alert>) -> Self {
        Self { alerts }
    }

    pub async fn fetch<T, K, N>(client: &ApiClient<T, K, N>) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let envelope = client.call(&ListAlerts).await?;
        Ok(envelope.map(|e| {
            debug!(count = e.alerts.len(), unread = ?e.unread_count, "alerts loaded");
            Self::new(e.alerts)
        }))
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.seen).count()
    }

    pub fn view(&self) -> ListView<AlertRow> {
        let rows = self.alerts.iter().map(AlertRow::from).collect();
        ListView::from_rows(rows, HEALTHY)
    }

    pub async fn mark_read_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: i64,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        if client.call(&MarkAlertRead { id }).await?.is_none() {
            return Ok(None);
        }
        Self::fetch(client).await
    }

    pub async fn mark_all_read_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let Some(receipt) = client.call(&MarkAllAlertsRead).await? else {
            return Ok(None);
        };
        info!(count = receipt.count, "alerts marked as read");
        Self::fetch(client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::Harness;
    use crate::http::{HttpMethod, RequestBody};
    use serde_json::{Value, json};

    fn alert(id: i64, part_name: Option<&str>, seen: bool) -> Value {
        json!({
            "id": id,
            "part_id": id * 10,
            "part_name": part_name,
            "message": format!("Low stock alert #{}", id),
            "seen": seen,
            "created_at": "2024-04-02T13:45:00"
        })
    }

    #[test]
    fn unseen_alerts_are_flagged_new() {
        let alerts: Vec<Alert> =
            serde_json::from_value(json!([alert(1, Some("Belt"), false), alert(2, None, true)]))
                .unwrap();
        let ctl = AlertsController::new(alerts);
        let view = ctl.view();

        assert!(view.rows()[0].is_new);
        assert_eq!(view.rows()[0].date, "Apr 2, 2024");
        assert_eq!(view.rows()[0].time, "13:45");
        assert!(!view.rows()[1].is_new);
        assert_eq!(view.rows()[1].part, UNKNOWN_PART);
        assert_eq!(ctl.unread_count(), 1);
    }

    #[tokio::test]
    async fn mark_one_read_sends_empty_object_and_reloads() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Put,
            "/api/alerts/1/mark-read",
            200,
            json!({"message": "Alert marked as read"}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/alerts",
            200,
            json!({"alerts": [alert(1, Some("Belt"), true)], "total": 1, "unread_count": 0}),
        );

        let ctl = AlertsController::mark_read_and_reload(&h.client, 1)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ctl.unread_count(), 0);
        assert_eq!(h.transport.requests()[0].body, RequestBody::Json("{}".into()));
    }

    #[tokio::test]
    async fn mark_all_read_then_reload_shows_no_new_alerts() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Get,
            "/api/alerts",
            200,
            json!({"alerts": [alert(1, Some("Belt"), false), alert(2, Some("Fuse"), false)],
                   "total": 2, "unread_count": 2}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/alerts",
            200,
            json!({"alerts": [alert(1, Some("Belt"), true), alert(2, Some("Fuse"), true)],
                   "total": 2, "unread_count": 0}),
        );
        h.transport.respond(
            HttpMethod::Put,
            "/api/alerts/mark-all-read",
            200,
            json!({"message": "2 alerts marked as read", "count": 2}),
        );

        let before = AlertsController::fetch(&h.client).await.unwrap().unwrap();
        assert_eq!(before.unread_count(), 2);

        let after = AlertsController::mark_all_read_and_reload(&h.client)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.unread_count(), 0);
        assert!(after.view().rows().iter().all(|r| !r.is_new));
        let methods: Vec<HttpMethod> = h.transport.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Get]);
    }

    #[test]
    fn no_alerts_means_healthy_inventory() {
        assert_eq!(AlertsController::default().view(), ListView::Empty(HEALTHY));
    }
}
