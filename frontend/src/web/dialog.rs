//! 阻塞式对话框：`alert` / `confirm` / `print`

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// 用户取消或对话框不可用时返回 `false`
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn print() {
    if let Some(window) = web_sys::window() {
        let _ = window.print();
    }
}
