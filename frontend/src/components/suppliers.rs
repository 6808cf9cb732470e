use leptos::prelude::*;
use leptos::task::spawn_local;
use stocksphere_shared::controllers::ListView;
use stocksphere_shared::controllers::suppliers::{DELETE_CONFIRMATION, SuppliersController};
use stocksphere_shared::protocol::SupplierForm;

use crate::auth::use_api;
use crate::components::feedback::{EmptyRow, LoadError, LoadingRow, Notice, Toast, report_failure};
use crate::web::dialog;

const COLUMNS: u32 = 6;

/// 表单状态，字段与 `SupplierForm` 一一对应
#[derive(Clone, Copy)]
struct FormState {
    name: RwSignal<String>,
    contact_person: RwSignal<String>,
    email: RwSignal<String>,
    phone: RwSignal<String>,
    address: RwSignal<String>,
}

impl FormState {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            contact_person: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            address: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, form: SupplierForm) {
        self.name.set(form.name);
        self.contact_person.set(form.contact_person);
        self.email.set(form.email);
        self.phone.set(form.phone);
        self.address.set(form.address);
    }

    fn to_form(&self) -> SupplierForm {
        SupplierForm {
            name: self.name.get_untracked(),
            contact_person: self.contact_person.get_untracked(),
            email: self.email.get_untracked(),
            phone: self.phone.get_untracked(),
            address: self.address.get_untracked(),
        }
    }
}

#[component]
fn FormField(label: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <label class="form-control">
            <span class="label-text">{label}</span>
            <input
                type="text"
                class="input input-bordered"
                prop:value=value
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
pub fn SuppliersPage() -> impl IntoView {
    let api = use_api();

    let controller = RwSignal::new(Option::<SuppliersController>::None);
    let load_error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Notice::None);

    {
        let api = api.clone();
        spawn_local(async move {
            match SuppliersController::fetch(&api).await {
                Ok(Some(c)) => controller.set(Some(c)),
                Ok(None) => {}
                Err(e) => load_error.set(Some(e.user_message())),
            }
        });
    }

    let rows = move || controller.with(|c| c.as_ref().map(|c| c.view()));

    // 编辑状态：Some(None) 为新建，Some(Some(id)) 为编辑
    let editing = RwSignal::new(Option::<Option<i64>>::None);
    let form = FormState::new();
    let (saving, set_saving) = signal(false);

    let open_editor = move |id: Option<i64>| {
        let prefill = id
            .and_then(|id| {
                controller.with_untracked(|c| {
                    c.as_ref().and_then(|c| c.find(id)).map(SupplierForm::from_supplier)
                })
            })
            .unwrap_or_default();
        form.fill(prefill);
        editing.set(Some(id));
    };

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(id) = editing.get_untracked() else {
                return;
            };
            let api = api.clone();
            let payload = form.to_form();
            set_saving.set(true);
            spawn_local(async move {
                match SuppliersController::save_and_reload(&api, id, payload).await {
                    Ok(Some(c)) => {
                        controller.set(Some(c));
                        editing.set(None);
                        let message = if id.is_some() { "Supplier updated" } else { "Supplier created" };
                        notice.set(Some((message.to_string(), false)));
                    }
                    Ok(None) => editing.set(None),
                    Err(e) => report_failure("Failed to save supplier", &e),
                }
                set_saving.set(false);
            });
        }
    };

    let on_delete = StoredValue::new(move |id: i64| {
        if !dialog::confirm(DELETE_CONFIRMATION) {
            return;
        }
        let api = api.clone();
        spawn_local(async move {
            match SuppliersController::delete_and_reload(&api, id).await {
                Ok(Some(c)) => {
                    controller.set(Some(c));
                    notice.set(Some(("Supplier deleted".to_string(), false)));
                }
                Ok(None) => {}
                Err(e) => report_failure("Failed to delete supplier", &e),
            }
        });
    });

    view! {
        <Toast notice=notice />
        <LoadError error=load_error />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <h3 class="card-title">"Suppliers"</h3>
                    <button class="btn btn-primary" on:click=move |_| open_editor(None)>
                        "Add Supplier"
                    </button>
                </div>
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Contact"</th>
                                <th>"Email"</th>
                                <th>"Phone"</th>
                                <th>"Address"</th>
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
                                        let email = match row.email {
                                            Some(address) => view! {
                                                <a class="link" href=format!("mailto:{}", address)>{row.email_label}</a>
                                            }
                                            .into_any(),
                                            None => row.email_label.into_any(),
                                        };
                                        view! {
                                            <tr>
                                                <td class="font-semibold">{row.name}</td>
                                                <td>{row.contact_person}</td>
                                                <td>{email}</td>
                                                <td>{row.phone}</td>
                                                <td>{row.address}</td>
                                                <td class="flex gap-1">
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| open_editor(Some(id))>
                                                        "Edit"
                                                    </button>
                                                    <button
                                                        class="btn btn-ghost btn-xs text-error"
                                                        on:click=move |_| on_delete.with_value(|f| f(id))
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
        </div>

        <Show when=move || editing.get().is_some()>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">
                        {move || if editing.get().flatten().is_some() { "Edit Supplier" } else { "Add Supplier" }}
                    </h3>
                    <form class="space-y-3 mt-4" on:submit=on_submit.clone()>
                        <FormField label="Name *" value=form.name />
                        <FormField label="Contact Person" value=form.contact_person />
                        <FormField label="Email" value=form.email />
                        <FormField label="Phone" value=form.phone />
                        <FormField label="Address" value=form.address />
                        <div class="modal-action">
                            <button type="button" class="btn" on:click=move |_| editing.set(None)>
                                "Cancel"
                            </button>
                            <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </Show>
    }
}
