//! 构建期配置
//!
//! 变量在编译时通过 `option_env!` 注入（例如 `STOCKSPHERE_API_BASE=... trunk build`）。

use stocksphere_shared::ClientConfig;
use stocksphere_shared::config::{VAR_API_BASE, VAR_LOG, VAR_REFRESH_SECS, VAR_TRANSACTION_LIMIT};

fn build_var(key: &str) -> Option<String> {
    let value = match key {
        VAR_API_BASE => option_env!("STOCKSPHERE_API_BASE"),
        VAR_LOG => option_env!("STOCKSPHERE_LOG"),
        VAR_REFRESH_SECS => option_env!("STOCKSPHERE_REFRESH_SECS"),
        VAR_TRANSACTION_LIMIT => option_env!("STOCKSPHERE_TRANSACTION_LIMIT"),
        _ => None,
    };
    value.map(str::to_string)
}

/// 未配置 API 地址时使用页面来源
pub fn load() -> ClientConfig {
    let config = ClientConfig::from_lookup(build_var);
    match web_sys::window().and_then(|w| w.location().origin().ok()) {
        Some(origin) => config.with_origin_fallback(&origin),
        None => config,
    }
}
