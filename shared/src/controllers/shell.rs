//! 侧边栏与页头

use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    /// 用于判断当前页的关键字
    pub key: &'static str,
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAV_ENTRIES: [NavEntry; 6] = [
    NavEntry { key: "dashboard", label: "Dashboard", href: "/dashboard" },
    NavEntry { key: "parts", label: "Inventory", href: "/parts" },
    NavEntry { key: "transactions", label: "Transactions", href: "/transactions" },
    NavEntry { key: "suppliers", label: "Suppliers", href: "/suppliers" },
    NavEntry { key: "alerts", label: "Alerts", href: "/alerts" },
    NavEntry { key: "analytics", label: "Analytics", href: "/analytics" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub entry: NavEntry,
    pub active: bool,
}

/// 导航项，路径中包含关键字的项为当前项
pub fn navigation(path: &str) -> Vec<NavItem> {
    NAV_ENTRIES
        .iter()
        .map(|entry| NavItem {
            entry: *entry,
            active: path.contains(entry.key),
        })
        .collect()
}

/// 登录与注册页不显示侧边栏和页头
pub fn is_auth_page(path: &str) -> bool {
    matches!(path, "" | "/" | "/index.html" | "/register" | "/register.html")
}

/// 页头中的用户信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    pub name: String,
    pub role: String,
    pub initial: char,
}

impl Default for UserBadge {
    fn default() -> Self {
        Self {
            name: "Connected User".into(),
            role: "User".into(),
            initial: 'U',
        }
    }
}

impl UserBadge {
    pub fn for_user(user: Option<&User>) -> Self {
        let Some(user) = user else {
            return Self::default();
        };
        let defaults = Self::default();
        Self {
            initial: user
                .username
                .chars()
                .next()
                .and_then(|c| c.to_uppercase().next())
                .unwrap_or(defaults.initial),
            name: user.username.clone(),
            role: user.role.to_string(),
        }
    }
}
