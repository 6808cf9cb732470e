//! StockSphere 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `web`: 浏览器 API 的薄封装（路由、存储、fetch、定时器）
//! - `auth`: 认证状态与 API 客户端
//! - `components`: UI 组件层，只负责渲染共享层控制器给出的视图模型

mod auth;
mod config;
mod components {
    pub mod alerts;
    pub mod analytics;
    pub mod dashboard;
    mod feedback;
    pub mod login;
    mod part_dialog;
    pub mod parts;
    pub mod shell;
    pub mod suppliers;
    pub mod transactions;
}

use crate::auth::{Api, AppNavigator, AuthContext};
use crate::components::alerts::AlertsPage;
use crate::components::analytics::AnalyticsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::parts::PartsPage;
use crate::components::shell::Shell;
use crate::components::suppliers::SuppliersPage;
use crate::components::transactions::TransactionsPage;

use leptos::prelude::*;
use stocksphere_shared::controllers::shell::is_auth_page;
use stocksphere_shared::{ApiClient, SessionStore};

// 原生 Web API 封装模块
// 直接基于 web_sys，不引入 gloo-* 系列 crate，以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod dialog;
    pub mod download;
    pub mod file;
    mod http;
    pub mod logging;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchTransport;
    pub use storage::LocalStorage;
    pub use timer::Interval;
}

use web::route::AppRoute;
use web::router::{RouterOutlet, provide_router};
use web::{FetchTransport, LocalStorage};

/// 安装日志订阅者，级别来自构建期配置
pub fn init_logging() {
    web::logging::init(&config::load().log_level);
}

/// 路由匹配函数
///
/// 登录/注册页与 404 页独立渲染，其余页面包在侧边栏/页头框架中。
fn route_matcher(route: AppRoute) -> AnyView {
    let page = match route {
        AppRoute::Login => view! { <LoginPage register=false /> }.into_any(),
        AppRoute::Signup => view! { <LoginPage register=true /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Parts => view! { <PartsPage /> }.into_any(),
        AppRoute::Suppliers => view! { <SuppliersPage /> }.into_any(),
        AppRoute::Transactions => view! { <TransactionsPage /> }.into_any(),
        AppRoute::Alerts => view! { <AlertsPage /> }.into_any(),
        AppRoute::Analytics => view! { <AnalyticsPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <a href="/" class="btn btn-link mt-4">"Back to StockSphere"</a>
                </div>
            </div>
        }
        .into_any(),
    };

    if route == AppRoute::NotFound || is_auth_page(route.to_path()) {
        page
    } else {
        view! { <Shell route=route>{page}</Shell> }.into_any()
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = config::load();

    // 1. 认证上下文，从 LocalStorage 恢复会话
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);
    auth_ctx.sync();

    // 2. 路由服务：注入认证信号，状态变化时重新执行守卫
    let router = provide_router(auth_ctx.is_authenticated_signal());

    // 3. API 客户端：401 时经由导航器完成登出跳转
    let api: Api = ApiClient::new(
        &config.api_base_url,
        FetchTransport,
        SessionStore::new(LocalStorage),
        AppNavigator::new(auth_ctx, router),
    );
    provide_context(api);
    provide_context(config);

    Effect::new(move |_| {
        let title = router.current_route().get().title();
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.set_title(&format!("{} - StockSphere", title));
        }
    });

    view! { <RouterOutlet matcher=route_matcher /> }
}
