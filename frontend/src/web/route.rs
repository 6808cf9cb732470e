//! 路由定义模块 - 领域模型
//!
//! 纯粹的路由表，不依赖于 DOM 或 web_sys。
//! 入口守卫委托给共享层的 `gate`。

use std::fmt::Display;

use stocksphere_shared::KeyValueStore;
use stocksphere_shared::SessionStore;
use stocksphere_shared::gate::{self, GateOutcome};

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Signup,
    Dashboard,
    Parts,
    Suppliers,
    Transactions,
    Alerts,
    Analytics,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 兼容旧的 `.html` 页面地址。
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        match path {
            "" | "/login" | "/index.html" | "/login.html" => Self::Login,
            "/signup" | "/register" | "/signup.html" => Self::Signup,
            "/dashboard" | "/dashboard.html" => Self::Dashboard,
            "/parts" | "/parts.html" | "/inventory" => Self::Parts,
            "/suppliers" | "/suppliers.html" => Self::Suppliers,
            "/transactions" | "/transactions.html" => Self::Transactions,
            "/alerts" | "/alerts.html" => Self::Alerts,
            "/analytics" | "/analytics.html" => Self::Analytics,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Signup => "/register",
            Self::Dashboard => "/dashboard",
            Self::Parts => "/parts",
            Self::Suppliers => "/suppliers",
            Self::Transactions => "/transactions",
            Self::Alerts => "/alerts",
            Self::Analytics => "/analytics",
            Self::NotFound => "/404",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Sign Up",
            Self::Dashboard => "Dashboard",
            Self::Parts => "Inventory",
            Self::Suppliers => "Suppliers",
            Self::Transactions => "Transactions",
            Self::Alerts => "Alerts",
            Self::Analytics => "Analytics",
            Self::NotFound => "Not Found",
        }
    }

    /// 该路由是否需要认证
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Signup | Self::NotFound)
    }

    /// 已认证用户是否应该离开此路由（登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// 进入该路由前的守卫判定
    pub fn guard<K: KeyValueStore>(&self, session: &SessionStore<K>) -> GateOutcome {
        if self.requires_auth() {
            gate::check_authenticated(session)
        } else if self.should_redirect_when_authenticated() {
            gate::check_guest(session)
        } else {
            GateOutcome::Proceed
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
