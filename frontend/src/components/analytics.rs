//! 分析页
//!
//! 各区块独立加载：某个接口失败时只有对应区块显示不可用。
//! 序列数据以表格加比例条的形式展示。

use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::controllers::ListView;
use stocksphere_shared::controllers::analytics::{
    AnalyticsController, AnalyticsView, CriticalBar, Series, Severity,
};

use crate::auth::use_api;
use crate::components::feedback::{EmptyRow, LoadError};

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "badge badge-error",
        Severity::VeryLow => "badge badge-warning",
        Severity::Low => "badge badge-info",
    }
}

fn unavailable() -> AnyView {
    view! { <p class="text-sm text-base-content/50">"Data unavailable"</p> }.into_any()
}

#[component]
fn SeriesCard(title: &'static str, series: Option<Series>) -> impl IntoView {
    let body = match series {
        None => unavailable(),
        Some(series) if series.points.is_empty() => {
            view! { <p class="text-sm text-base-content/50">"No data"</p> }.into_any()
        }
        Some(series) => {
            let shares: Vec<f64> = (0..series.points.len()).map(|i| series.share(i)).collect();
            let name = series.name;
            series
                .points
                .into_iter()
                .zip(shares)
                .map(|(point, share)| {
                    view! {
                        <div class="grid grid-cols-[8rem_1fr_4rem] items-center gap-2 text-sm">
                            <span class="truncate">{point.label}</span>
                            <progress class="progress progress-primary" value=share max="100"></progress>
                            <span class="text-right" title=name>{point.value}</span>
                        </div>
                    }
                })
                .collect_view()
                .into_any()
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-2">
                <h3 class="card-title">{title}</h3>
                {body}
            </div>
        </div>
    }
}

#[component]
fn CriticalCard(bars: Option<Vec<CriticalBar>>) -> impl IntoView {
    let body = match bars {
        None => unavailable(),
        Some(bars) => bars
            .into_iter()
            .map(|bar| {
                view! {
                    <div class="grid grid-cols-[8rem_1fr_6rem] items-center gap-2 text-sm">
                        <span class="truncate">{bar.name}</span>
                        <progress class="progress progress-error" value=bar.stock_percentage max="100"></progress>
                        <span class=severity_class(bar.severity)>
                            {format!("{:.0}%", bar.stock_percentage)}
                        </span>
                    </div>
                }
            })
            .collect_view()
            .into_any(),
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-2">
                <h3 class="card-title">"Most Critical"</h3>
                {body}
            </div>
        </div>
    }
}

fn render(view_model: AnalyticsView) -> AnyView {
    let stat = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let overview = view_model.overview;

    let low_stock = match view_model.low_stock {
        None => view! { <EmptyRow colspan=6 message="Data unavailable" /> }.into_any(),
        Some(ListView::Empty(message)) => view! { <EmptyRow colspan=6 message=message /> }.into_any(),
        Some(ListView::Rows(rows)) => rows
            .into_iter()
            .map(|row| {
                view! {
                    <tr>
                        <td class="font-semibold">{row.name}</td>
                        <td>{row.category}</td>
                        <td>{row.location}</td>
                        <td>{row.quantity} " / " {row.min_quantity}</td>
                        <td>{row.deficit}</td>
                        <td><span class=severity_class(row.severity)>{row.severity.label()}</span></td>
                    </tr>
                }
            })
            .collect_view()
            .into_any(),
    };

    view! {
        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total Parts"</div>
                <div class="stat-value text-primary">{stat(overview.map(|o| o.total_parts.to_string()))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Low Stock"</div>
                <div class="stat-value text-warning">{stat(overview.map(|o| o.low_stock_count.to_string()))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Total Quantity"</div>
                <div class="stat-value">{stat(overview.map(|o| o.total_quantity.to_string()))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Active Alerts"</div>
                <div class="stat-value text-error">{stat(overview.map(|o| o.active_alerts.to_string()))}</div>
            </div>
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
            <SeriesCard title="Stock by Category" series=view_model.by_category />
            <SeriesCard title="Stock by Location" series=view_model.by_location />
            <SeriesCard title="Top Parts by Quantity" series=view_model.top_by_quantity />
            <CriticalCard bars=view_model.most_critical />
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <h3 class="card-title p-6 pb-2">"Low Stock Analysis"</h3>
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Part"</th>
                                <th>"Category"</th>
                                <th>"Location"</th>
                                <th>"Stock"</th>
                                <th>"Deficit"</th>
                                <th>"Severity"</th>
                            </tr>
                        </thead>
                        <tbody>{low_stock}</tbody>
                    </table>
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[component]
pub fn AnalyticsPage() -> impl IntoView {
    let api = use_api();

    let analytics = RwSignal::new(Option::<AnalyticsView>::None);
    let load_error = RwSignal::new(Option::<String>::None);

    spawn_local(async move {
        match AnalyticsController::fetch(&api).await {
            Ok(Some(c)) => {
                if let Some(first) = c.failures().first() {
                    load_error.set(Some(format!(
                        "Some sections could not be loaded: {}",
                        first.user_message()
                    )));
                }
                analytics.set(Some(c.view()));
            }
            Ok(None) => {}
            Err(e) => load_error.set(Some(e.user_message())),
        }
    });

    view! {
        <LoadError error=load_error />
        {move || match analytics.get() {
            Some(view_model) => render(view_model),
            None => view! {
                <div class="flex justify-center py-12">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any(),
        }}
    }
}
