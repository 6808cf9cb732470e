use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::ClientConfig;
use stocksphere_shared::controllers::dashboard::{DashboardController, DashboardView};
use stocksphere_shared::date::today_utc;

use crate::auth::use_api;
use crate::components::feedback::LoadError;
use crate::components::transactions::TransactionRows;
use crate::web::Interval;
use crate::web::router::Link;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let config = use_context::<ClientConfig>().unwrap_or_default();

    let dashboard = RwSignal::new(Option::<DashboardView>::None);
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(Option::<String>::None);

    let recent_limit = config.dashboard_recent_limit;
    let load = move || {
        let api = api.clone();
        loading.set(true);
        spawn_local(async move {
            match DashboardController::fetch(&api, recent_limit).await {
                Ok(Some(controller)) => {
                    load_error.set(None);
                    dashboard.set(Some(controller.view(today_utc())));
                }
                // 会话已过期，客户端已跳转
                Ok(None) => {}
                Err(e) => load_error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };

    // 初始加载 + 定时刷新；页面卸载时定时器随 StoredValue 一起释放
    load();
    let refresh = load.clone();
    let _interval = StoredValue::new_local(Interval::new(config.dashboard_refresh, move || {
        refresh()
    }));

    let stat = move |pick: fn(&DashboardView) -> String| {
        move || dashboard.with(|d| d.as_ref().map(pick).unwrap_or_else(|| "-".to_string()))
    };
    let recent = Signal::derive(move || dashboard.with(|d| d.as_ref().map(|d| d.recent.clone())));
    let badge = move || dashboard.with(|d| d.as_ref().and_then(|d| d.unread_badge));

    view! {
        <LoadError error=load_error />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total Parts"</div>
                <div class="stat-value text-primary">{stat(|d| d.total_parts.to_string())}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Low Stock Items"</div>
                <div class="stat-value text-warning">{stat(|d| d.low_stock_count.to_string())}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Stock In Today"</div>
                <div class="stat-value text-success">{stat(|d| d.stock_in_today.to_string())}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Stock Out Today"</div>
                <div class="stat-value text-error">{stat(|d| d.stock_out_today.to_string())}</div>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <h3 class="card-title">"Recent Transactions"</h3>
                    <div class="flex gap-2 items-center">
                        <Link to="/alerts" class="btn btn-ghost btn-sm">
                            "Alerts"
                            {move || badge().map(|n| view! { <span class="badge badge-error">{n}</span> })}
                        </Link>
                        <button
                            on:click={
                                let load = load.clone();
                                move |_| load()
                            }
                            disabled=move || loading.get()
                            class="btn btn-ghost btn-sm"
                        >
                            {move || if loading.get() { "Refreshing..." } else { "Refresh" }}
                        </button>
                    </div>
                </div>
                <TransactionRows rows=recent show_notes=false />
            </div>
        </div>
    }
}
