use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_in, use_api, use_auth};
use crate::web::router::Link;

/// 登录 / 注册页
///
/// 成功后由导航器跳转到落地页，失败时在表单内显示服务端消息。
#[component]
pub fn LoginPage(register: bool) -> impl IntoView {
    let auth = use_auth();
    let api = use_api();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let api = api.clone();
        spawn_local(async move {
            let result = sign_in(
                &api,
                &auth,
                &username.get_untracked(),
                &password.get_untracked(),
                register,
            )
            .await;
            if let Err(e) = result {
                set_error_msg.set(Some(e.user_message()));
            }
            set_is_submitting.set(false);
        });
    };

    let (heading, submit_label, busy_label) = if register {
        ("Create an account", "Sign Up", "Creating account...")
    } else {
        ("Sign in to your account", "Login", "Signing in...")
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"StockSphere"</h1>
                    <p class="text-base-content/70">{heading}</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"Username"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                autocomplete="username"
                                on:input=move |ev| set_username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> {busy_label} }.into_any()
                                } else {
                                    submit_label.into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            {if register {
                                view! { "Already have an account? " <Link to="/">"Login"</Link> }.into_any()
                            } else {
                                view! { "No account yet? " <Link to="/register">"Sign up"</Link> }.into_any()
                            }}
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
