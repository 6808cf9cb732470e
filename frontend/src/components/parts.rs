//! 零件库存页

use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::controllers::ListView;
use stocksphere_shared::controllers::parts::{
    PartFilter, PartsController, StockLevel, StockStatus, delete_confirmation,
};
use stocksphere_shared::controllers::suppliers::SuppliersController;
use stocksphere_shared::protocol::{PartForm, QrCode};
use stocksphere_shared::{ApiError, ClientConfig, Part};
use tracing::warn;

use crate::auth::use_api;
use crate::components::feedback::{EmptyRow, LoadError, LoadingRow, Notice, Toast, report_failure};
use crate::components::part_dialog::PartDialog;
use crate::web::dialog;

const COLUMNS: u32 = 7;

/// 上传图片的相对路径补全为 API 地址
fn asset_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        path.to_string()
    }
}

#[component]
pub fn PartsPage() -> impl IntoView {
    let api = use_api();
    let base_url = use_context::<ClientConfig>().unwrap_or_default().api_base_url;

    let controller = RwSignal::new(Option::<PartsController>::None);
    let suppliers = RwSignal::new(Vec::new());
    let load_error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Notice::None);

    // 筛选条件
    let search = RwSignal::new(String::new());
    let category = RwSignal::new(String::new());
    let location = RwSignal::new(String::new());
    let stock = RwSignal::new(StockLevel::All);
    let filter = Memo::new(move |_| PartFilter {
        search: search.get(),
        category: category.get(),
        location: location.get(),
        stock: stock.get(),
    });

    {
        let api = api.clone();
        spawn_local(async move {
            match PartsController::fetch(&api).await {
                Ok(Some(c)) => controller.set(Some(c)),
                Ok(None) => return,
                Err(e) => load_error.set(Some(e.user_message())),
            }
            // 供应商只用于表单下拉框，失败不影响列表
            match SuppliersController::fetch(&api).await {
                Ok(Some(c)) => suppliers.set(c.suppliers().to_vec()),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "supplier list unavailable"),
            }
        });
    }

    let rows = move || controller.with(|c| c.as_ref().map(|c| filter.with(|f| c.view(f))));
    let options = Memo::new(move |_| {
        controller.with(|c| c.as_ref().map(|c| c.filter_options()).unwrap_or_default())
    });

    // 新建/编辑
    let dialog_open = RwSignal::new(false);
    let editing = RwSignal::new(Option::<Part>::None);
    let (saving, set_saving) = signal(false);

    let open_editor = move |part: Option<Part>| {
        editing.set(part);
        dialog_open.set(true);
    };

    let on_save = {
        let api = api.clone();
        move |(id, form): (Option<i64>, PartForm)| {
            let api = api.clone();
            set_saving.set(true);
            spawn_local(async move {
                match PartsController::save_and_reload(&api, id, form).await {
                    Ok(Some(c)) => {
                        controller.set(Some(c));
                        dialog_open.set(false);
                        let message = if id.is_some() { "Part updated" } else { "Part created" };
                        notice.set(Some((message.to_string(), false)));
                    }
                    Ok(None) => dialog_open.set(false),
                    Err(e) => report_failure("Failed to save part", &e),
                }
                set_saving.set(false);
            });
        }
    };

    let on_delete = {
        let api = api.clone();
        move |id: i64, name: String| {
            if !dialog::confirm(&delete_confirmation(&name)) {
                return;
            }
            let api = api.clone();
            spawn_local(async move {
                match PartsController::delete_and_reload(&api, id).await {
                    Ok(Some(c)) => {
                        controller.set(Some(c));
                        notice.set(Some(("Part deleted".to_string(), false)));
                    }
                    Ok(None) => {}
                    Err(e) => report_failure("Failed to delete part", &e),
                }
            });
        }
    };

    // 二维码
    let qr_code = RwSignal::new(Option::<QrCode>::None);
    let on_qr = {
        let api = api.clone();
        move |id: i64| {
            let api = api.clone();
            spawn_local(async move {
                match PartsController::fetch_qr_code(&api, id).await {
                    Ok(Some(code)) => qr_code.set(Some(code)),
                    Ok(None) => {}
                    Err(e) => report_failure("Failed to load QR code", &e),
                }
            });
        }
    };

    let on_delete = StoredValue::new(on_delete);
    let on_qr = StoredValue::new(on_qr);

    view! {
        <Toast notice=notice />
        <LoadError error=load_error />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-wrap items-end gap-4">
                    <label class="form-control grow">
                        <span class="label-text">"Search"</span>
                        <input
                            type="search"
                            placeholder="Name or description"
                            class="input input-bordered"
                            prop:value=search
                            on:input=move |ev| search.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Category"</span>
                        <select
                            class="select select-bordered"
                            prop:value=category
                            on:change=move |ev| category.set(event_target_value(&ev))
                        >
                            <option value="">"All categories"</option>
                            {move || {
                                options
                                    .get()
                                    .categories
                                    .into_iter()
                                    .map(|c| {
                                        let value = c.clone();
                                        view! { <option value=value>{c}</option> }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Location"</span>
                        <select
                            class="select select-bordered"
                            prop:value=location
                            on:change=move |ev| location.set(event_target_value(&ev))
                        >
                            <option value="">"All locations"</option>
                            {move || {
                                options
                                    .get()
                                    .locations
                                    .into_iter()
                                    .map(|l| {
                                        let value = l.clone();
                                        view! { <option value=value>{l}</option> }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Stock"</span>
                        <select
                            class="select select-bordered"
                            prop:value=move || stock.get().as_str()
                            on:change=move |ev| stock.set(StockLevel::parse(&event_target_value(&ev)))
                        >
                            <option value="">"All stock levels"</option>
                            <option value="low">"Low stock"</option>
                        </select>
                    </label>
                    <div class="flex-1"></div>
                    <button class="btn btn-primary" on:click=move |_| open_editor(None)>
                        "Add Part"
                    </button>
                </div>
            </div>

            <div class="overflow-x-auto w-full">
                <table class="table table-zebra w-full">
                    <thead>
                        <tr>
                            <th>"Part"</th>
                            <th>"Category"</th>
                            <th>"Location"</th>
                            <th>"Quantity"</th>
                            <th>"Min"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || match rows() {
                            None => view! { <LoadingRow colspan=COLUMNS /> }.into_any(),
                            Some(ListView::Empty(message)) => {
                                view! { <EmptyRow colspan=COLUMNS message=message /> }.into_any()
                            }
                            Some(ListView::Rows(rows)) => rows
                                .into_iter()
                                .map(|row| {
                                    let id = row.id;
                                    let name = row.name.clone();
                                    let image = row.image_url.as_deref().map(|p| asset_url(&base_url, p));
                                    let status_class = match row.status {
                                        StockStatus::Low => "badge badge-warning",
                                        StockStatus::InStock => "badge badge-success",
                                    };
                                    view! {
                                        <tr>
                                            <td>
                                                <div class="flex items-center gap-3">
                                                    {image.map(|src| view! {
                                                        <div class="avatar">
                                                            <div class="mask mask-squircle w-10 h-10">
                                                                <img src=src alt=row.name.clone() />
                                                            </div>
                                                        </div>
                                                    })}
                                                    <div>
                                                        <div class="font-bold">{row.name.clone()}</div>
                                                        <div class="text-xs opacity-50">
                                                            {row.supplier.clone().unwrap_or_default()}
                                                        </div>
                                                    </div>
                                                </div>
                                            </td>
                                            <td>{row.category}</td>
                                            <td>{row.location}</td>
                                            <td>{row.quantity}</td>
                                            <td>{row.min_quantity}</td>
                                            <td><span class=status_class>{row.status.label()}</span></td>
                                            <td class="flex gap-1">
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |_| {
                                                        let part = controller
                                                            .with_untracked(|c| c.as_ref().and_then(|c| c.find(id).cloned()));
                                                        open_editor(part);
                                                    }
                                                >
                                                    "Edit"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |_| on_qr.with_value(|f| f(id))
                                                >
                                                    "QR"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs text-error"
                                                    on:click=move |_| on_delete.with_value(|f| f(id, name.clone()))
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                })
                                .collect_view()
                                .into_any(),
                        }}
                    </tbody>
                </table>
            </div>
        </div>

        <PartDialog
            open=dialog_open
            editing=editing
            suppliers=suppliers
            saving=saving
            on_save=on_save
            on_invalid=move |e: ApiError| report_failure("Failed to save part", &e)
        />

        <Show when=move || qr_code.get().is_some()>
            <div class="modal modal-open">
                <div class="modal-box text-center">
                    <h3 class="font-bold text-lg">
                        {move || qr_code.get().map(|q| q.part_name).unwrap_or_default()}
                    </h3>
                    <img
                        class="mx-auto my-4"
                        src=move || qr_code.get().map(|q| q.qr_code).unwrap_or_default()
                        alt="Part QR code"
                    />
                    <div class="modal-action justify-center">
                        <button class="btn btn-outline" on:click=move |_| dialog::print()>"Print"</button>
                        <button class="btn" on:click=move |_| qr_code.set(None)>"Close"</button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
