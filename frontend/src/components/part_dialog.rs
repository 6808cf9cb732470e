//! 零件新建/编辑对话框
//!
//! 表单字段整合为 `FormState`，负责预填、重置和到 `PartForm` 的转换。

use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::protocol::PartForm;
use stocksphere_shared::{ApiError, ApiResult, Part, Supplier};

use crate::web::file;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，适合在闭包间传递。
#[derive(Clone, Copy)]
struct FormState {
    name: RwSignal<String>,
    description: RwSignal<String>,
    category: RwSignal<String>,
    location: RwSignal<String>,
    quantity: RwSignal<String>,
    min_quantity: RwSignal<String>,
    supplier_id: RwSignal<String>,
}

fn parse_count(raw: &str) -> ApiResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| ApiError::validation("Quantities must be whole numbers"))
}

impl FormState {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
            location: RwSignal::new(String::new()),
            quantity: RwSignal::new("0".to_string()),
            min_quantity: RwSignal::new("0".to_string()),
            supplier_id: RwSignal::new(String::new()),
        }
    }

    /// 编辑时以现有记录预填，新建时清空
    fn fill(&self, part: Option<&Part>) {
        let form = part.map(PartForm::from_part).unwrap_or_else(|| PartForm {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            location: String::new(),
            quantity: 0,
            min_quantity: 0,
            supplier_id: None,
            image: None,
        });
        self.name.set(form.name);
        self.description.set(form.description);
        self.category.set(form.category);
        self.location.set(form.location);
        self.quantity.set(form.quantity.to_string());
        self.min_quantity.set(form.min_quantity.to_string());
        self.supplier_id
            .set(form.supplier_id.map(|id| id.to_string()).unwrap_or_default());
    }

    fn to_form(&self) -> ApiResult<PartForm> {
        Ok(PartForm {
            name: self.name.get_untracked(),
            description: self.description.get_untracked(),
            category: self.category.get_untracked(),
            location: self.location.get_untracked(),
            quantity: parse_count(&self.quantity.get_untracked())?,
            min_quantity: parse_count(&self.min_quantity.get_untracked())?,
            supplier_id: self.supplier_id.get_untracked().parse().ok(),
            image: None,
        })
    }
}

#[component]
pub fn PartDialog(
    /// 对话框是否打开
    open: RwSignal<bool>,
    /// 正在编辑的零件，`None` 表示新建
    editing: RwSignal<Option<Part>>,
    #[prop(into)] suppliers: Signal<Vec<Supplier>>,
    #[prop(into)] saving: Signal<bool>,
    /// 提交回调：(零件 id, 表单)
    #[prop(into)]
    on_save: Callback<(Option<i64>, PartForm)>,
    /// 表单本地校验失败
    #[prop(into)]
    on_invalid: Callback<ApiError>,
) -> impl IntoView {
    let state = FormState::new();
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let image_ref = NodeRef::<leptos::html::Input>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                editing.with_untracked(|part| state.fill(part.as_ref()));
                if let Some(input) = image_ref.get_untracked() {
                    input.set_value("");
                }
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut form = match state.to_form().and_then(|f| f.validate().map(|_| f)) {
            Ok(form) => form,
            Err(e) => {
                on_invalid.run(e);
                return;
            }
        };
        let id = editing.with_untracked(|p| p.as_ref().map(|p| p.id));
        let selected = image_ref.get_untracked().and_then(|input| file::first_file(&input));

        spawn_local(async move {
            if let Some(selected) = selected {
                match file::read_upload(&selected).await {
                    Ok(upload) => form.image = Some(upload),
                    Err(e) => {
                        on_invalid.run(ApiError::validation(format!("Could not read image: {}", e)));
                        return;
                    }
                }
            }
            on_save.run((id, form));
        });
    };

    let title = move || {
        if editing.with(|p| p.is_some()) {
            "Edit Part"
        } else {
            "Add Part"
        }
    };

    view! {
        <dialog node_ref=dialog_ref class="modal" on:close=move |_| open.set(false)>
            <div class="modal-box max-w-2xl">
                <h3 class="font-bold text-lg">{title}</h3>
                <form class="grid grid-cols-1 md:grid-cols-2 gap-3 mt-4" on:submit=on_submit>
                    <label class="form-control md:col-span-2">
                        <span class="label-text">"Name *"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=state.name
                            on:input=move |ev| state.name.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control md:col-span-2">
                        <span class="label-text">"Description"</span>
                        <textarea
                            class="textarea textarea-bordered"
                            prop:value=state.description
                            on:input=move |ev| state.description.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Category"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=state.category
                            on:input=move |ev| state.category.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Location"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=state.location
                            on:input=move |ev| state.location.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Quantity"</span>
                        <input
                            type="number"
                            min="0"
                            class="input input-bordered"
                            prop:value=state.quantity
                            on:input=move |ev| state.quantity.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Minimum Quantity"</span>
                        <input
                            type="number"
                            min="0"
                            class="input input-bordered"
                            prop:value=state.min_quantity
                            on:input=move |ev| state.min_quantity.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Supplier"</span>
                        <select
                            class="select select-bordered"
                            prop:value=state.supplier_id
                            on:change=move |ev| state.supplier_id.set(event_target_value(&ev))
                        >
                            <option value="">"No supplier"</option>
                            {move || {
                                suppliers
                                    .get()
                                    .into_iter()
                                    .map(|s| view! { <option value=s.id.to_string()>{s.name}</option> })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Image"</span>
                        <input
                            node_ref=image_ref
                            type="file"
                            accept="image/*"
                            class="file-input file-input-bordered"
                        />
                    </label>
                    <div class="modal-action md:col-span-2">
                        <button type="button" class="btn" on:click=move |_| open.set(false)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </form>
            </div>
        </dialog>
    }
}
