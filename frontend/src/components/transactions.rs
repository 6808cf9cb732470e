//! 交易历史：筛选、CSV 导出、出入库登记

use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::controllers::transactions::{
    StockMovementDraft, TransactionFilter, TransactionsController, success_message,
};
use stocksphere_shared::controllers::{ListView, TransactionRow};
use stocksphere_shared::date::{parse_date_input, today_utc};
use stocksphere_shared::{ClientConfig, TransactionType, csv};
use tracing::warn;

use crate::auth::use_api;
use crate::components::feedback::{EmptyRow, LoadError, LoadingRow, Notice, Toast, report_failure};
use crate::web::{dialog, download};

fn kind_badge(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::In => "badge badge-success",
        TransactionType::Out => "badge badge-error",
    }
}

/// 交易表格；`rows` 为 `None` 表示加载中
#[component]
pub fn TransactionRows(
    #[prop(into)] rows: Signal<Option<ListView<TransactionRow>>>,
    show_notes: bool,
) -> impl IntoView {
    let colspan = if show_notes { 7 } else { 6 };

    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"Date"</th>
                        <th>"Part"</th>
                        <th>"Type"</th>
                        <th>"Quantity"</th>
                        <th>"Machine"</th>
                        <th>"User"</th>
                        {show_notes.then(|| view! { <th>"Notes"</th> })}
                    </tr>
                </thead>
                <tbody>
                    {move || match rows.get() {
                        None => view! { <LoadingRow colspan=colspan /> }.into_any(),
                        Some(ListView::Empty(message)) => {
                            view! { <EmptyRow colspan=colspan message=message /> }.into_any()
                        }
                        Some(ListView::Rows(rows)) => rows
                            .into_iter()
                            .map(|row| {
                                view! {
                                    <tr>
                                        <td>
                                            <div>{row.date}</div>
                                            <div class="text-xs opacity-50">{row.time}</div>
                                        </td>
                                        <td class="font-semibold">{row.part}</td>
                                        <td><span class=kind_badge(row.kind)>{row.kind.as_str()}</span></td>
                                        <td>{row.quantity}</td>
                                        <td>{row.machine}</td>
                                        <td>{row.user}</td>
                                        {show_notes.then(|| view! { <td class="text-sm opacity-70">{row.notes.clone()}</td> })}
                                    </tr>
                                }
                            })
                            .collect_view()
                            .into_any(),
                    }}
                </tbody>
            </table>
        </div>
    }
}

/// 出入库表单状态
#[derive(Clone, Copy)]
struct MovementForm {
    part_id: RwSignal<String>,
    kind: RwSignal<TransactionType>,
    quantity: RwSignal<String>,
    machine: RwSignal<String>,
    notes: RwSignal<String>,
}

impl MovementForm {
    fn new() -> Self {
        Self {
            part_id: RwSignal::new(String::new()),
            kind: RwSignal::new(TransactionType::In),
            quantity: RwSignal::new(String::new()),
            machine: RwSignal::new(String::new()),
            notes: RwSignal::new(String::new()),
        }
    }

    fn open(&self, kind: TransactionType) {
        self.part_id.set(String::new());
        self.kind.set(kind);
        self.quantity.set(String::new());
        self.machine.set(String::new());
        self.notes.set(String::new());
    }

    fn to_draft(&self) -> StockMovementDraft {
        StockMovementDraft {
            part_id: self.part_id.get_untracked().parse().ok(),
            kind: self.kind.get_untracked(),
            quantity: self.quantity.get_untracked().trim().parse().ok(),
            machine: self.machine.get_untracked(),
            notes: self.notes.get_untracked(),
        }
    }
}

#[component]
pub fn TransactionsPage() -> impl IntoView {
    let api = use_api();
    let limit = use_context::<ClientConfig>()
        .unwrap_or_default()
        .transaction_history_limit;

    let controller = RwSignal::new(Option::<TransactionsController>::None);
    let load_error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Notice::None);

    // 筛选条件
    let kind_filter = RwSignal::new(String::new());
    let start_date = RwSignal::new(String::new());
    let end_date = RwSignal::new(String::new());
    let filter = Memo::new(move |_| TransactionFilter {
        kind: TransactionType::parse(&kind_filter.get()),
        start: parse_date_input(&start_date.get()),
        end: parse_date_input(&end_date.get()),
    });

    {
        let api = api.clone();
        spawn_local(async move {
            let loaded = match TransactionsController::fetch(&api, limit).await {
                Ok(Some(c)) => c.with_parts(&api).await,
                other => other,
            };
            match loaded {
                Ok(Some(c)) => controller.set(Some(c)),
                Ok(None) => {}
                Err(e) => load_error.set(Some(e.user_message())),
            }
        });
    }

    let rows = Signal::derive(move || {
        controller.with(|c| c.as_ref().map(|c| filter.with(|f| c.view(f))))
    });
    let part_options = move || {
        controller.with(|c| c.as_ref().map(|c| c.part_options()).unwrap_or_default())
    };

    let on_clear = move |_| {
        kind_filter.set(String::new());
        start_date.set(String::new());
        end_date.set(String::new());
    };

    let on_export = move |_| {
        let Some(export) = controller.with_untracked(|c| {
            c.as_ref()
                .map(|c| filter.with_untracked(|f| c.export_csv(f, today_utc())))
        }) else {
            return;
        };
        if let Err(e) = download::download_text(&export.file_name, &export.content, csv::MIME_TYPE) {
            warn!(error = ?e, "csv download failed");
            dialog::alert("Failed to export transactions");
        }
    };

    // 出入库对话框
    let form = MovementForm::new();
    let (open, set_open) = signal(false);
    let (saving, set_saving) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    // 每次打开对话框都重新拉取零件，出库校验使用最新库存
    let start_movement = {
        let api = api.clone();
        move |kind: TransactionType| {
            form.open(kind);
            set_open.set(true);
            let Some(current) = controller.get_untracked() else {
                return;
            };
            let api = api.clone();
            spawn_local(async move {
                match current.with_parts(&api).await {
                    Ok(Some(refreshed)) => controller.set(Some(refreshed)),
                    Ok(None) => set_open.set(false),
                    Err(e) => warn!(error = %e, "failed to refresh parts"),
                }
            });
        }
    };
    let start_stock_in = start_movement.clone();
    let start_stock_out = start_movement;

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(current) = controller.get_untracked() else {
            return;
        };
        let draft = form.to_draft();
        let api = api.clone();
        set_saving.set(true);
        spawn_local(async move {
            match current.record_and_reload(&api, &draft, limit).await {
                Ok(Some(reloaded)) => {
                    controller.set(Some(reloaded));
                    set_open.set(false);
                    notice.set(Some((success_message(draft.kind), false)));
                }
                Ok(None) => set_open.set(false),
                Err(e) => report_failure("Failed to record transaction", &e),
            }
            set_saving.set(false);
        });
    };

    view! {
        <Toast notice=notice />
        <LoadError error=load_error />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-wrap items-end gap-4">
                    <label class="form-control">
                        <span class="label-text">"Type"</span>
                        <select
                            class="select select-bordered"
                            prop:value=kind_filter
                            on:change=move |ev| kind_filter.set(event_target_value(&ev))
                        >
                            <option value="">"All"</option>
                            <option value="IN">"Stock In"</option>
                            <option value="OUT">"Stock Out"</option>
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"From"</span>
                        <input
                            type="date"
                            class="input input-bordered"
                            prop:value=start_date
                            on:change=move |ev| start_date.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"To"</span>
                        <input
                            type="date"
                            class="input input-bordered"
                            prop:value=end_date
                            on:change=move |ev| end_date.set(event_target_value(&ev))
                        />
                    </label>
                    <button class="btn btn-ghost" on:click=on_clear>"Clear"</button>
                    <div class="flex-1"></div>
                    <button class="btn btn-outline" on:click=on_export>"Export CSV"</button>
                    <button class="btn btn-success" on:click=move |_| start_stock_in(TransactionType::In)>
                        "Stock In"
                    </button>
                    <button class="btn btn-error" on:click=move |_| start_stock_out(TransactionType::Out)>
                        "Stock Out"
                    </button>
                </div>
            </div>
            <TransactionRows rows=rows show_notes=true />
        </div>

        <dialog node_ref=dialog_ref class="modal" on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">
                    {move || format!("Stock {}", form.kind.get())}
                </h3>
                <form class="space-y-3 mt-4" on:submit=on_submit>
                    <label class="form-control">
                        <span class="label-text">"Part *"</span>
                        <select
                            class="select select-bordered"
                            prop:value=form.part_id
                            on:change=move |ev| form.part_id.set(event_target_value(&ev))
                        >
                            <option value="">"Select a part"</option>
                            {move || {
                                part_options()
                                    .into_iter()
                                    .map(|opt| view! { <option value=opt.id.to_string()>{opt.label}</option> })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Quantity *"</span>
                        <input
                            type="number"
                            min="1"
                            class="input input-bordered"
                            prop:value=form.quantity
                            on:input=move |ev| form.quantity.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Machine"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=form.machine
                            on:input=move |ev| form.machine.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Notes"</span>
                        <textarea
                            class="textarea textarea-bordered"
                            prop:value=form.notes
                            on:input=move |ev| form.notes.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| set_open.set(false)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Submit" }}
                        </button>
                    </div>
                </form>
            </div>
        </dialog>
    }
}
