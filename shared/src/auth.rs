//! 登录 / 注册 / 登出流程

use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::User;
use crate::protocol::{AuthResponse, Credentials, Endpoint, Login, Signup};
use crate::session::KeyValueStore;
use crate::{LANDING_PATH, LOGIN_PATH};

pub const CREDENTIALS_REQUIRED: &str = "Username and password are required";
pub const SESSION_NOT_SAVED: &str = "Could not save your session. Check that browser storage is enabled.";

fn credentials(username: &str, password: &str) -> ApiResult<Credentials> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation(CREDENTIALS_REQUIRED));
    }
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

async fn exchange<T, K, N, E>(client: &ApiClient<T, K, N>, endpoint: E) -> ApiResult<User>
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
    E: Endpoint<Response = AuthResponse>,
{
    let auth = client.exchange_credentials(&endpoint).await?;
    if !client.session().save(&auth.access_token, &auth.user) {
        // 写了一半的会话不能留下
        client.session().clear();
        return Err(ApiError::validation(SESSION_NOT_SAVED));
    }
    info!(username = %auth.user.username, "signed in");
    Ok(auth.user)
}

/// 登录；成功后会话已保存，调用方负责跳转到落地页
pub async fn login<T, K, N>(
    client: &ApiClient<T, K, N>,
    username: &str,
    password: &str,
) -> ApiResult<User>
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
{
    let creds = credentials(username, password)?;
    exchange(client, Login(creds)).await
}

/// 注册并直接登录
pub async fn signup<T, K, N>(
    client: &ApiClient<T, K, N>,
    username: &str,
    password: &str,
) -> ApiResult<User>
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
{
    let creds = credentials(username, password)?;
    exchange(client, Signup(creds)).await
}

/// 登录或注册成功后进入落地页
pub fn enter<T, K, N>(client: &ApiClient<T, K, N>)
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
{
    client.navigator().redirect(LANDING_PATH);
}

pub fn logout<T, K, N>(client: &ApiClient<T, K, N>)
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
{
    info!("logging out");
    client.session().clear();
    client.navigator().redirect(LOGIN_PATH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::dashboard::DashboardController;
    use crate::http::tests::{BASE, Harness, MockTransport, RecordingNavigator};
    use crate::http::{ApiClient, HttpMethod};
    use crate::models::Role;
    use crate::session::SessionStore;
    use crate::{STORAGE_TOKEN_KEY, STORAGE_USER_KEY};
    use serde_json::json;

    fn auth_ok() -> serde_json::Value {
        json!({
            "message": "Login successful",
            "access_token": "jwt-123",
            "user": {"id": 1, "username": "admin", "role": "admin"}
        })
    }

    #[tokio::test]
    async fn login_persists_session() {
        let h = Harness::new();
        h.transport
            .respond(HttpMethod::Post, "/api/auth/login", 200, auth_ok());

        let user = login(&h.client, " admin ", "secret").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        let session = h.client.session().read().unwrap();
        assert_eq!(session.token, "jwt-123");
        let req = h.transport.last_request().unwrap();
        assert_eq!(
            req.body,
            crate::http::RequestBody::Json(r#"{"username":"admin","password":"secret"}"#.into())
        );
    }

    /// 只读的存储后端，模拟浏览器禁用 localStorage
    #[derive(Clone, Default)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&self, _key: &str, _value: &str) -> bool {
            false
        }
        fn delete(&self, _key: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn login_fails_when_storage_refuses_the_session() {
        let transport = MockTransport::new();
        let navigator = RecordingNavigator::default();
        let client = ApiClient::new(
            &format!("{}/", BASE),
            transport.clone(),
            SessionStore::new(ReadOnlyStore),
            navigator.clone(),
        );
        transport.respond(HttpMethod::Post, "/api/auth/login", 200, auth_ok());

        let err = login(&client, "admin", "secret").await.unwrap_err();

        assert_eq!(err.user_message(), SESSION_NOT_SAVED);
        assert!(!client.session().is_authenticated());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn invalid_credentials_do_not_redirect() {
        let h = Harness::new();
        h.transport.respond(
            HttpMethod::Post,
            "/api/auth/login",
            401,
            json!({"error": "Invalid username or password"}),
        );

        let err = login(&h.client, "admin", "wrong").await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid username or password");
        assert!(h.navigator.redirects().is_empty());
        assert!(!h.client.session().is_authenticated());
    }

    #[tokio::test]
    async fn missing_credentials_never_reach_the_server() {
        let h = Harness::new();
        let err = signup(&h.client, "  ", "pw").await.unwrap_err();
        assert_eq!(err, ApiError::Validation(CREDENTIALS_REQUIRED.into()));
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn offline_login_reports_connection_error() {
        let h = Harness::new();
        h.transport.go_offline();
        let err = login(&h.client, "admin", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), "Connection error");
    }

    #[tokio::test]
    async fn logout_clears_both_keys_and_returns_to_root() {
        let h = Harness::signed_in();
        logout(&h.client);
        assert!(!h.store.contains(STORAGE_TOKEN_KEY));
        assert!(!h.store.contains(STORAGE_USER_KEY));
        assert_eq!(h.navigator.redirects(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn login_then_dashboard_shows_low_stock_count() {
        let h = Harness::new();
        h.transport
            .respond(HttpMethod::Post, "/api/auth/login", 200, auth_ok());
        h.transport.respond(
            HttpMethod::Get,
            "/api/parts",
            200,
            json!({"parts": [
                {"id": 1, "name": "Bearing", "quantity": 2, "min_quantity": 5, "is_low_stock": true},
                {"id": 2, "name": "Belt", "quantity": 20, "min_quantity": 5, "is_low_stock": false},
                {"id": 3, "name": "Fuse", "quantity": 0, "min_quantity": 1, "is_low_stock": true}
            ], "total": 3}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/transactions?limit=10",
            200,
            json!({"transactions": [], "total": 0}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/alerts/unread-count",
            200,
            json!({"unread_count": 2}),
        );

        login(&h.client, "admin", "secret").await.unwrap();
        enter(&h.client);
        let dashboard = DashboardController::fetch(&h.client, 10)
            .await
            .unwrap()
            .unwrap();
        let view = dashboard.view(crate::date::today_utc());

        assert_eq!(h.navigator.redirects(), vec!["/dashboard".to_string()]);
        assert_eq!(view.total_parts, 3);
        assert_eq!(view.low_stock_count, 2);
        assert_eq!(view.unread_badge, Some(2));
        for req in h.transport.requests().iter().skip(1) {
            assert_eq!(req.header("Authorization"), Some("Bearer jwt-123"));
        }
    }
}
