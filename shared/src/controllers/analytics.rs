//! 统计分析页
//!
//! 四个数据源并发加载，各自独立失败：某一部分失败时其余部分照常展示。
//! 图表绘制不在此处，这里只计算数据序列。

use futures::join;
use tracing::{debug, warn};

use super::{ListView, PLACEHOLDER};
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::{LowStockPart, LowStockReport, Overview, StockDistribution, TopParts};
use crate::protocol::{AnalyticsOverview, LowStockAnalysis, StockDistributionReport, TopPartsReport};
use crate::session::KeyValueStore;

pub const NO_LOW_STOCK: &str = "No low stock items";
pub const DEFAULT_CATEGORY: &str = "General";

/// 低库存严重程度，按库存百分比划分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    VeryLow,
    Low,
}

impl Severity {
    pub fn from_percentage(pct: f64) -> Self {
        if pct <= 25.0 {
            Severity::Critical
        } else if pct <= 50.0 {
            Severity::VeryLow
        } else {
            Severity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::VeryLow => "Very Low",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// 一组图表数据
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    fn new(name: &'static str, points: impl Iterator<Item = (String, f64)>) -> Self {
        Self {
            name,
            points: points
                .map(|(label, value)| SeriesPoint { label, value })
                .collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// 某一点占总量的百分比；总量为 0 时为 0
    pub fn share(&self, index: usize) -> f64 {
        let total = self.total();
        match self.points.get(index) {
            Some(point) if total > 0.0 => point.value / total * 100.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewCards {
    pub total_parts: u64,
    pub low_stock_count: u64,
    pub total_quantity: i64,
    pub active_alerts: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowStockRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub location: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub deficit: i64,
    pub severity: Severity,
}

impl From<&LowStockPart> for LowStockRow {
    fn from(p: &LowStockPart) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            category: p
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            location: p
                .location
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            quantity: p.quantity,
            min_quantity: p.min_quantity,
            deficit: p.deficit,
            severity: Severity::from_percentage(p.stock_percentage),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalBar {
    pub name: String,
    pub stock_percentage: f64,
    pub severity: Severity,
}

/// 各部分在加载失败时为 `None`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsView {
    pub overview: Option<OverviewCards>,
    pub by_category: Option<Series>,
    pub by_location: Option<Series>,
    pub low_stock: Option<ListView<LowStockRow>>,
    pub top_by_quantity: Option<Series>,
    pub most_critical: Option<Vec<CriticalBar>>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsController {
    overview: Option<Overview>,
    distribution: Option<StockDistribution>,
    low_stock: Option<LowStockReport>,
    top_parts: Option<TopParts>,
    failures: Vec<ApiError>,
}

/// 单个部分的结果：`Err` 记入失败列表，`Ok(None)` 表示会话过期
fn settle<R>(
    section: &str,
    result: ApiResult<Option<R>>,
    failures: &mut Vec<ApiError>,
    expired: &mut bool,
) -> Option<R> {
    match result {
        Ok(Some(data)) => Some(data),
        Ok(None) => {
            *expired = true;
            None
        }
        Err(e) => {
            warn!(section, error = %e, "analytics section failed to load");
            failures.push(e);
            None
        }
    }
}

impl AnalyticsController {
    /// 并发加载四个部分
    ///
    /// 任一部分遇到 401 返回 `Ok(None)`；全部失败时返回第一个错误；
    /// 否则返回已加载的部分，失败原因可通过 `failures` 查看。
    pub async fn fetch<T, K, N>(client: &ApiClient<T, K, N>) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let (overview, distribution, low_stock, top_parts) = join!(
            client.call(&AnalyticsOverview),
            client.call(&StockDistributionReport),
            client.call(&LowStockAnalysis),
            client.call(&TopPartsReport),
        );

        let mut failures = Vec::new();
        let mut expired = false;
        let ctl = Self {
            overview: settle("overview", overview, &mut failures, &mut expired),
            distribution: settle("stock-distribution", distribution, &mut failures, &mut expired),
            low_stock: settle("low-stock", low_stock, &mut failures, &mut expired),
            top_parts: settle("top-parts", top_parts, &mut failures, &mut expired),
            failures: Vec::new(),
        };

        if expired {
            return Ok(None);
        }
        if failures.len() == 4 {
            return Err(failures.remove(0));
        }
        debug!(failed = failures.len(), "analytics loaded");
        Ok(Some(Self { failures, ..ctl }))
    }

    pub fn failures(&self) -> &[ApiError] {
        &self.failures
    }

    pub fn view(&self) -> AnalyticsView {
        AnalyticsView {
            overview: self.overview.as_ref().map(|o| OverviewCards {
                total_parts: o.total_parts,
                low_stock_count: o.low_stock_count,
                total_quantity: o.total_quantity,
                active_alerts: o.unread_alerts,
            }),
            by_category: self.distribution.as_ref().map(|d| {
                Series::new(
                    "Stock by Category",
                    d.by_category
                        .iter()
                        .map(|c| (c.category.clone(), c.total_quantity as f64)),
                )
            }),
            by_location: self.distribution.as_ref().map(|d| {
                Series::new(
                    "Total Quantity",
                    d.by_location
                        .iter()
                        .map(|l| (l.location.clone(), l.total_quantity as f64)),
                )
            }),
            low_stock: self.low_stock.as_ref().map(|r| {
                let rows = r.low_stock_parts.iter().map(LowStockRow::from).collect();
                ListView::from_rows(rows, NO_LOW_STOCK)
            }),
            top_by_quantity: self.top_parts.as_ref().map(|t| {
                Series::new(
                    "Quantity",
                    t.top_by_quantity
                        .iter()
                        .map(|p| (p.name.clone(), p.quantity as f64)),
                )
            }),
            most_critical: self.top_parts.as_ref().map(|t| {
                t.most_critical
                    .iter()
                    .map(|p| CriticalBar {
                        name: p.name.clone(),
                        stock_percentage: p.stock_percentage,
                        severity: Severity::from_percentage(p.stock_percentage),
                    })
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::http::tests::Harness;
    use serde_json::json;

    /// 预设四个分析端点的成功响应，`skip` 指定的路径除外
    fn seed_all(h: &Harness, skip: &str) {
        let respond = |path: &str, body: serde_json::Value| {
            if path != skip {
                h.transport.respond(HttpMethod::Get, path, 200, body);
            }
        };
        respond(
            "/api/analytics/overview",
            json!({"total_parts": 12, "low_stock_count": 3, "out_of_stock_count": 1,
                   "total_quantity": 340, "categories": [], "total_alerts": 5, "unread_alerts": 2}),
        );
        respond(
            "/api/analytics/stock-distribution",
            json!({
                "by_category": [
                    {"category": "Bearings", "total_quantity": 30, "part_count": 2},
                    {"category": "Belts", "total_quantity": 10, "part_count": 1}
                ],
                "by_location": [{"location": "A1", "total_quantity": 40, "part_count": 3}]
            }),
        );
        respond(
            "/api/analytics/low-stock",
            json!({
                "low_stock_parts": [
                    {"id": 1, "name": "Fuse", "category": null, "location": null, "quantity": 1,
                     "min_quantity": 10, "stock_percentage": 10.0, "deficit": 9},
                    {"id": 2, "name": "Seal", "category": "Seals", "location": "C3", "quantity": 5,
                     "min_quantity": 10, "stock_percentage": 50.0, "deficit": 5},
                    {"id": 3, "name": "Belt", "category": "Belts", "location": "B2", "quantity": 8,
                     "min_quantity": 10, "stock_percentage": 80.0, "deficit": 2}
                ],
                "total_low_stock": 3, "total_critical": 1, "total_warning": 2
            }),
        );
        respond(
            "/api/analytics/top-parts",
            json!({
                "top_by_quantity": [{"id": 4, "name": "Bolt", "category": null, "quantity": 200}],
                "most_critical": [{"id": 1, "name": "Fuse", "category": null, "quantity": 1,
                                   "min_quantity": 10, "stock_percentage": 10.0}]
            }),
        );
    }

    #[test]
    fn severity_thresholds_are_inclusive() {
        assert_eq!(Severity::from_percentage(0.0), Severity::Critical);
        assert_eq!(Severity::from_percentage(25.0), Severity::Critical);
        assert_eq!(Severity::from_percentage(25.1), Severity::VeryLow);
        assert_eq!(Severity::from_percentage(50.0), Severity::VeryLow);
        assert_eq!(Severity::from_percentage(50.5).label(), "Low");
    }

    #[tokio::test]
    async fn all_sections_derive_view_models() {
        let h = Harness::signed_in();
        seed_all(&h, "");

        let ctl = AnalyticsController::fetch(&h.client).await.unwrap().unwrap();
        let view = ctl.view();

        assert!(ctl.failures().is_empty());
        assert_eq!(view.overview.unwrap().active_alerts, 2);
        let by_category = view.by_category.unwrap();
        assert_eq!(by_category.points[0].label, "Bearings");
        assert_eq!(by_category.share(0), 75.0);

        let low = view.low_stock.unwrap();
        let rows = low.rows();
        assert_eq!(rows[0].category, DEFAULT_CATEGORY);
        assert_eq!(rows[0].location, "-");
        let severities: Vec<&str> = rows.iter().map(|r| r.severity.label()).collect();
        assert_eq!(severities, vec!["Critical", "Very Low", "Low"]);

        assert_eq!(view.most_critical.unwrap()[0].severity, Severity::Critical);
        assert_eq!(h.transport.request_count(), 4);
    }

    #[tokio::test]
    async fn one_failing_section_does_not_hide_the_others() {
        let h = Harness::signed_in();
        seed_all(&h, "/api/analytics/top-parts");
        h.transport.respond(
            HttpMethod::Get,
            "/api/analytics/top-parts",
            500,
            json!({"error": "division by zero"}),
        );

        let ctl = AnalyticsController::fetch(&h.client).await.unwrap().unwrap();
        let view = ctl.view();

        assert!(view.overview.is_some());
        assert!(view.top_by_quantity.is_none());
        assert_eq!(ctl.failures()[0].user_message(), "division by zero");
    }

    #[tokio::test]
    async fn everything_failing_is_an_error() {
        let h = Harness::signed_in();
        h.transport.go_offline();
        let err = AnalyticsController::fetch(&h.client).await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn empty_low_stock_report_has_its_own_message() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Get,
            "/api/analytics/low-stock",
            200,
            json!({"low_stock_parts": [], "total_low_stock": 0}),
        );

        let ctl = AnalyticsController::fetch(&h.client).await.unwrap().unwrap();

        assert_eq!(ctl.view().low_stock, Some(ListView::Empty(NO_LOW_STOCK)));
        assert_eq!(ctl.failures().len(), 3);
    }

    #[test]
    fn share_of_empty_series_is_zero() {
        let series = Series::new("x", std::iter::once(("a".to_string(), 0.0)));
        assert_eq!(series.share(0), 0.0);
        assert_eq!(series.share(5), 0.0);
    }
}
