use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::protocol::Endpoint;
use crate::session::{KeyValueStore, SessionStore};
use crate::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, LOGIN_PATH};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 方法枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上传的文件内容
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, upload: FileUpload },
}

/// multipart 表单，字段保持追加顺序
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    fields: Vec<FormField>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: &str, upload: FileUpload) -> Self {
        self.fields.push(FormField::File {
            name: name.to_string(),
            upload,
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// 按名称查找文本字段
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

/// 请求体
///
/// JSON 体会附带 `Content-Type: application/json`；
/// multipart 体原样交给传输层，由传输层设置 boundary。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        serde_json::to_string(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Encode(e.to_string()))
    }
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输层错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// 网络不可达、CORS 拒绝等，请求未到达服务端
    #[error("network error: {0}")]
    Network(String),
    /// 请求对象构建失败
    #[error("request build failed: {0}")]
    Build(String),
}

/// HTTP 传输特性 (Trait)
///
/// (?Send) 是因为浏览器环境下的 Future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// 页面导航与阻塞式提示
pub trait Navigator {
    /// 跳转到应用内路径
    fn redirect(&self, path: &str);
    /// 阻塞式提示（浏览器中为 `alert`）
    fn notify(&self, message: &str);
}

// =========================================================
// API 客户端
// =========================================================

/// 带会话的 API 客户端
///
/// - token 存在时总是附带 `Authorization: Bearer <token>`，不存在时照常发送
/// - 401: 清除会话、跳回登录页，返回 `Ok(None)`
/// - 其他非 2xx: `ApiError::Rejected`，消息取自响应体 `error` 字段
/// - 传输失败: `ApiError::Connection`
/// - 不做重试
#[derive(Clone)]
pub struct ApiClient<T, K, N> {
    base_url: String,
    transport: T,
    session: SessionStore<K>,
    navigator: N,
}

impl<T, K, N> ApiClient<T, K, N>
where
    T: HttpTransport,
    K: KeyValueStore,
    N: Navigator,
{
    pub fn new(base_url: &str, transport: T, session: SessionStore<K>, navigator: N) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &SessionStore<K> {
        &self.session
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 调用目录中的端点
    pub async fn call<E: Endpoint>(&self, endpoint: &E) -> ApiResult<Option<E::Response>> {
        let body = endpoint.body()?;
        self.request(E::METHOD, &endpoint.path(), body).await
    }

    /// 请求契约本体
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<Option<R>> {
        let response = self.dispatch(method, path, body).await?;

        if response.status == 401 {
            warn!(%method, path, "session rejected by server, signing out");
            self.session.clear();
            self.navigator.redirect(LOGIN_PATH);
            return Ok(None);
        }

        decode(method, path, response).map(Some)
    }

    /// 凭据交换（登录/注册）
    ///
    /// 与 `request` 共用传输与错误归类，但 401 在这里表示凭据错误，
    /// 作为 `Rejected` 返回，不触发会话清除与重定向。
    pub async fn exchange_credentials<E: Endpoint>(&self, endpoint: &E) -> ApiResult<E::Response> {
        let body = endpoint.body()?;
        let path = endpoint.path();
        let response = self.dispatch(E::METHOD, &path, body).await?;
        decode(E::METHOD, &path, response)
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<HttpResponse> {
        let mut req = HttpRequest::new(&self.url(path), method);

        if let Some(token) = self.session.token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        if matches!(body, RequestBody::Json(_)) {
            req = req.with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);
        }
        let req = req.with_body(body);

        debug!(%method, path, "dispatching request");
        self.transport.send(req).await.map_err(|e| {
            warn!(%method, path, error = %e, "request did not reach the server");
            ApiError::from(e)
        })
    }

    // --- 便捷方法：同一契约的不同参数形式 ---

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Get, path, RequestBody::Empty).await
    }

    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Post, path, RequestBody::json(body)?)
            .await
    }

    pub async fn put_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Put, path, RequestBody::json(body)?)
            .await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Delete, path, RequestBody::Empty)
            .await
    }

    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Post, path, RequestBody::Multipart(form))
            .await
    }

    pub async fn put_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> ApiResult<Option<R>> {
        self.request(HttpMethod::Put, path, RequestBody::Multipart(form))
            .await
    }
}

fn decode<R: DeserializeOwned>(
    method: HttpMethod,
    path: &str,
    response: HttpResponse,
) -> ApiResult<R> {
    if !response.is_success() {
        let err = ApiError::rejected(response.status, &response.body);
        warn!(%method, path, status = response.status, error = %err, "request rejected");
        return Err(err);
    }
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(%method, path, error = %e, "response body did not match expected shape");
        ApiError::Decode(e.to_string())
    })
}

// =========================================================
// 测试工具: MockTransport / RecordingNavigator
// =========================================================
