//! StockSphere 共享层
//!
//! 平台无关的客户端核心：
//! - `models` / `protocol`: 领域模型与后端端点目录
//! - `session`: 会话存储（token + 用户记录）
//! - `http`: 请求契约（Bearer 头、401 强制登出、错误归类）
//! - `gate` / `auth`: 页面入口守卫与登录流程
//! - `controllers`: 各页面的状态与纯视图模型推导
//!
//! 浏览器绑定（fetch / localStorage / history）位于 `stocksphere-frontend`。

pub mod auth;
pub mod config;
pub mod controllers;
pub mod csv;
pub mod date;
pub mod error;
pub mod gate;
pub mod http;
pub mod models;
pub mod protocol;
pub mod session;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::{ApiClient, HttpTransport, Navigator};
pub use models::{Alert, Part, Role, Supplier, Transaction, TransactionType, User};
pub use session::{KeyValueStore, Session, SessionStore};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化存储中保存访问令牌的键
pub const STORAGE_TOKEN_KEY: &str = "access_token";
/// 持久化存储中保存用户记录（JSON）的键
pub const STORAGE_USER_KEY: &str = "user";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 应用根路径（登录页）
pub const LOGIN_PATH: &str = "/";
/// 已认证用户的默认落地页
pub const LANDING_PATH: &str = "/dashboard";
