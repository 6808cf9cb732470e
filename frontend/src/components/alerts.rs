use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::controllers::ListView;
use stocksphere_shared::controllers::alerts::{AlertsController, HEALTHY_DETAIL};

use crate::auth::use_api;
use crate::components::feedback::{LoadError, Notice, Toast, report_failure};

#[component]
pub fn AlertsPage() -> impl IntoView {
    let api = use_api();

    let controller = RwSignal::new(Option::<AlertsController>::None);
    let load_error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Notice::None);

    {
        let api = api.clone();
        spawn_local(async move {
            match AlertsController::fetch(&api).await {
                Ok(Some(c)) => controller.set(Some(c)),
                Ok(None) => {}
                Err(e) => load_error.set(Some(e.user_message())),
            }
        });
    }

    let rows = move || controller.with(|c| c.as_ref().map(|c| c.view()));
    let unread = move || controller.with(|c| c.as_ref().map(|c| c.unread_count()).unwrap_or(0));

    let mark_read = {
        let api = api.clone();
        StoredValue::new(move |id: i64| {
            let api = api.clone();
            spawn_local(async move {
                match AlertsController::mark_read_and_reload(&api, id).await {
                    Ok(Some(c)) => controller.set(Some(c)),
                    Ok(None) => {}
                    Err(e) => report_failure("Failed to mark alert as read", &e),
                }
            });
        })
    };

    let on_mark_all = move |_| {
        let api = api.clone();
        spawn_local(async move {
            match AlertsController::mark_all_read_and_reload(&api).await {
                Ok(Some(c)) => {
                    controller.set(Some(c));
                    notice.set(Some(("All alerts marked as read".to_string(), false)));
                }
                Ok(None) => {}
                Err(e) => report_failure("Failed to mark alerts as read", &e),
            }
        });
    };

    view! {
        <Toast notice=notice />
        <LoadError error=load_error />

        <div class="flex items-center justify-between">
            <h2 class="text-lg font-semibold">
                "Low Stock Alerts "
                <span class="badge badge-error">{unread}</span>
            </h2>
            <button class="btn btn-outline btn-sm" on:click=on_mark_all disabled=move || unread() == 0>
                "Mark all as read"
            </button>
        </div>

        {move || match rows() {
            None => view! {
                <div class="flex justify-center py-12">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any(),
            Some(ListView::Empty(message)) => view! {
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body items-center text-center">
                        <h3 class="card-title text-success">{message}</h3>
                        <p class="text-base-content/70">{HEALTHY_DETAIL}</p>
                    </div>
                </div>
            }
            .into_any(),
            Some(ListView::Rows(rows)) => rows
                .into_iter()
                .map(|row| {
                    let id = row.id;
                    let card_class = if row.is_new {
                        "card bg-base-100 shadow border-l-4 border-warning"
                    } else {
                        "card bg-base-100 shadow opacity-70"
                    };
                    view! {
                        <div class=card_class>
                            <div class="card-body py-4 flex-row items-center gap-4">
                                <div class="flex-1">
                                    <div class="flex items-center gap-2">
                                        <span class="font-bold">{row.part}</span>
                                        {row.is_new.then(|| view! { <span class="badge badge-warning">"New"</span> })}
                                    </div>
                                    <p class="text-sm">{row.message}</p>
                                    <p class="text-xs opacity-50">{row.date} " " {row.time}</p>
                                </div>
                                {row.is_new.then(|| view! {
                                    <button
                                        class="btn btn-ghost btn-sm"
                                        on:click=move |_| mark_read.with_value(|f| f(id))
                                    >
                                        "Dismiss"
                                    </button>
                                })}
                            </div>
                        </div>
                    }
                })
                .collect_view()
                .into_any(),
        }}
    }
}
