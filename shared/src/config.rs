use std::time::Duration;

// =========================================================
// 配置层 (Configuration)
// =========================================================

/// 这些是默认值，如果构建环境中没有定义对应变量，则使用这些值
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_TRANSACTION_LIMIT: u32 = 500;
const DEFAULT_RECENT_LIMIT: u32 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

pub const VAR_API_BASE: &str = "STOCKSPHERE_API_BASE";
pub const VAR_LOG: &str = "STOCKSPHERE_LOG";
pub const VAR_REFRESH_SECS: &str = "STOCKSPHERE_REFRESH_SECS";
pub const VAR_TRANSACTION_LIMIT: &str = "STOCKSPHERE_TRANSACTION_LIMIT";

/// 客户端配置
///
/// `api_base_url` 为空串表示与页面同源（请求路径直接以 `/api` 开头）。
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub dashboard_refresh: Duration,
    pub transaction_history_limit: u32,
    pub dashboard_recent_limit: u32,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            dashboard_refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
            transaction_history_limit: DEFAULT_TRANSACTION_LIMIT,
            dashboard_recent_limit: DEFAULT_RECENT_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// 从变量查找函数构建配置，读不到或无法解析就用默认值
    ///
    /// 浏览器中 `lookup` 来自编译期 `option_env!`，测试中来自内存表。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_base_url: read(VAR_API_BASE)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),

            dashboard_refresh: read(VAR_REFRESH_SECS)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.dashboard_refresh),

            transaction_history_limit: read(VAR_TRANSACTION_LIMIT)
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.transaction_history_limit),

            dashboard_recent_limit: defaults.dashboard_recent_limit,

            log_level: read(VAR_LOG).unwrap_or(defaults.log_level),
        }
    }

    /// 基础地址为空时使用页面来源
    pub fn with_origin_fallback(mut self, origin: &str) -> Self {
        if self.api_base_url.is_empty() {
            self.api_base_url = origin.trim_end_matches('/').to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.dashboard_refresh, Duration::from_secs(30));
        assert_eq!(cfg.transaction_history_limit, 500);
        assert_eq!(cfg.dashboard_recent_limit, 10);
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (VAR_API_BASE, "https://stock.example.com/"),
            (VAR_LOG, "debug"),
            (VAR_REFRESH_SECS, "5"),
            (VAR_TRANSACTION_LIMIT, "50"),
        ]));
        assert_eq!(cfg.api_base_url, "https://stock.example.com");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.dashboard_refresh, Duration::from_secs(5));
        assert_eq!(cfg.transaction_history_limit, 50);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (VAR_REFRESH_SECS, "soon"),
            (VAR_TRANSACTION_LIMIT, "0"),
            (VAR_LOG, "   "),
        ]));
        assert_eq!(cfg.dashboard_refresh, Duration::from_secs(30));
        assert_eq!(cfg.transaction_history_limit, 500);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn origin_is_only_a_fallback() {
        let same_origin = ClientConfig::default().with_origin_fallback("http://localhost:5000/");
        assert_eq!(same_origin.api_base_url, "http://localhost:5000");

        let explicit = ClientConfig::from_lookup(lookup(&[(VAR_API_BASE, "https://api.test")]))
            .with_origin_fallback("http://localhost:5000");
        assert_eq!(explicit.api_base_url, "https://api.test");
    }
}
