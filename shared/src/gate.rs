//! 页面入口守卫
//!
//! 判定结果是纯值，由调用方通过 `Navigator` 执行。
//! 这只是界面层面的检查，真正的权限由后端把关。

use crate::http::Navigator;
use crate::session::{KeyValueStore, SessionStore};
use crate::{LANDING_PATH, LOGIN_PATH};

pub const ADMIN_REQUIRED: &str = "Admin access required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    Redirect {
        to: &'static str,
        notice: Option<&'static str>,
    },
}

impl GateOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateOutcome::Proceed)
    }

    /// 执行判定结果；返回 `true` 表示页面可以继续
    pub fn apply<N: Navigator>(&self, navigator: &N) -> bool {
        match self {
            GateOutcome::Proceed => true,
            GateOutcome::Redirect { to, notice } => {
                if let Some(message) = notice {
                    navigator.notify(message);
                }
                navigator.redirect(to);
                false
            }
        }
    }
}

/// 受保护页面：没有 token 就回登录页
pub fn check_authenticated<K: KeyValueStore>(session: &SessionStore<K>) -> GateOutcome {
    if session.is_authenticated() {
        GateOutcome::Proceed
    } else {
        GateOutcome::Redirect {
            to: LOGIN_PATH,
            notice: None,
        }
    }
}

/// 管理员页面：先要求已登录，非管理员提示后回到落地页
pub fn check_admin<K: KeyValueStore>(session: &SessionStore<K>) -> GateOutcome {
    let outcome = check_authenticated(session);
    if !outcome.is_proceed() {
        return outcome;
    }
    match session.user() {
        Some(user) if user.role.is_admin() => GateOutcome::Proceed,
        _ => GateOutcome::Redirect {
            to: LANDING_PATH,
            notice: Some(ADMIN_REQUIRED),
        },
    }
}

/// 登录/注册页：已登录用户直接进入落地页
pub fn check_guest<K: KeyValueStore>(session: &SessionStore<K>) -> GateOutcome {
    if session.is_authenticated() {
        GateOutcome::Redirect {
            to: LANDING_PATH,
            notice: None,
        }
    } else {
        GateOutcome::Proceed
    }
}
