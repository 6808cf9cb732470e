//! 操作反馈：成功提示框与失败通知

use leptos::prelude::*;
use stocksphere_shared::ApiError;
use tracing::warn;

use crate::web::dialog;

/// (消息内容, 是否出错)
pub type Notice = Option<(String, bool)>;

/// 变更失败：本地校验消息原样提示，其余加上操作前缀
pub fn report_failure(action: &str, err: &ApiError) {
    warn!(action, error = %err, "operation failed");
    let message = match err {
        ApiError::Validation(message) => message.clone(),
        other => format!("{}: {}", action, other.user_message()),
    };
    dialog::alert(&message);
}

/// 右上角提示框，3 秒后自动清除
#[component]
pub fn Toast(notice: RwSignal<Notice>) -> impl IntoView {
    Effect::new(move |_| {
        if notice.get().is_some() {
            set_timeout(move || notice.set(None), std::time::Duration::from_secs(3));
        }
    });

    view! {
        <Show when=move || notice.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let is_err = notice.get().map(|(_, e)| e).unwrap_or(false);
                    if is_err { "alert alert-error shadow-lg" } else { "alert alert-success shadow-lg" }
                }>
                    <span>{move || notice.get().map(|(m, _)| m).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}

/// 加载失败时的内联提示
#[component]
pub fn LoadError(error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some()>
            <div role="alert" class="alert alert-error text-sm">
                <span>{move || error.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 表格加载中的占位行
#[component]
pub fn LoadingRow(colspan: u32) -> impl IntoView {
    view! {
        <tr>
            <td colspan=colspan class="text-center py-8 text-base-content/50">
                <span class="loading loading-spinner loading-md"></span>
                " Loading..."
            </td>
        </tr>
    }
}

/// 表格空状态行
#[component]
pub fn EmptyRow(colspan: u32, message: &'static str) -> impl IntoView {
    view! {
        <tr>
            <td colspan=colspan class="text-center py-8 text-base-content/50">
                {message}
            </td>
        </tr>
    }
}
