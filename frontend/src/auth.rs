//! 认证模块
//!
//! 会话本身保存在 LocalStorage（由共享层的 `SessionStore` 管理），
//! 这里只维护它的响应式镜像，供路由守卫和页头使用。

use leptos::prelude::*;
use stocksphere_shared::controllers::shell::UserBadge;
use stocksphere_shared::{ApiClient, ApiResult, Navigator, SessionStore, User};
use tracing::debug;

use crate::web::dialog;
use crate::web::router::RouterService;
use crate::web::{FetchTransport, LocalStorage};

/// 认证状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

impl AuthState {
    fn load() -> Self {
        let session = SessionStore::new(LocalStorage);
        Self {
            is_authenticated: session.is_authenticated(),
            user: session.user(),
        }
    }
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<AuthState>,
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self { state, set_state }
    }

    /// 从 LocalStorage 重新读取会话；只有变化时才写入信号
    pub fn sync(&self) {
        let fresh = AuthState::load();
        if self.state.with_untracked(|current| *current != fresh) {
            debug!(authenticated = fresh.is_authenticated, "auth state synced");
            self.set_state.set(fresh);
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated)
    }

    pub fn badge(&self) -> Signal<UserBadge> {
        let state = self.state;
        Signal::derive(move || state.with(|s| UserBadge::for_user(s.user.as_ref())))
    }
}

/// 浏览器导航器：跳转前同步认证状态，提示使用 `alert`
#[derive(Clone, Copy)]
pub struct AppNavigator {
    auth: AuthContext,
    router: RouterService,
}

impl AppNavigator {
    pub fn new(auth: AuthContext, router: RouterService) -> Self {
        Self { auth, router }
    }
}

impl Navigator for AppNavigator {
    fn redirect(&self, path: &str) {
        self.auth.sync();
        self.router.navigate(path);
    }

    fn notify(&self, message: &str) {
        dialog::alert(message);
    }
}

/// 浏览器中的 API 客户端
pub type Api = ApiClient<FetchTransport, LocalStorage, AppNavigator>;

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

pub fn use_api() -> Api {
    use_context::<Api>().expect("Api client should be provided")
}

/// 登录或注册；成功后同步状态并进入落地页
pub async fn sign_in(
    api: &Api,
    auth: &AuthContext,
    username: &str,
    password: &str,
    register: bool,
) -> ApiResult<()> {
    if register {
        stocksphere_shared::auth::signup(api, username, password).await?;
    } else {
        stocksphere_shared::auth::login(api, username, password).await?;
    }
    auth.sync();
    stocksphere_shared::auth::enter(api);
    Ok(())
}

/// 注销并回到登录页
pub fn sign_out(api: &Api) {
    stocksphere_shared::auth::logout(api);
}
