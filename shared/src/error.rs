use serde::Deserialize;
use thiserror::Error;

use crate::http::TransportError;

// =========================================================
// 错误归类
// =========================================================

/// 客户端错误
///
/// 401 不在此列：会话过期由 `ApiClient` 直接处理为强制登出 + 重定向，
/// 调用方只会拿到空结果。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 服务端拒绝（4xx/5xx），携带服务端的 `error` 消息
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// 请求未能到达服务端
    #[error("Connection error: {0}")]
    Connection(String),

    /// 响应体无法解析为预期结构
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// 请求体无法序列化或请求无法构建
    #[error("Could not build request: {0}")]
    Encode(String),

    /// 发请求之前的本地校验失败
    #[error("{0}")]
    Validation(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 后端错误响应体 `{ "error": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub const GENERIC_FAILURE: &str = "Request failed";
pub const CONNECTION_FAILURE: &str = "Connection error";

impl ApiError {
    /// 从非成功响应构造：优先使用服务端消息，否则使用通用消息
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        ApiError::Rejected { status, message }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }

    /// 展示给用户的文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } | ApiError::Validation(message) => message.clone(),
            ApiError::Connection(_) => CONNECTION_FAILURE.to_string(),
            ApiError::Decode(_) | ApiError::Encode(_) => self.to_string(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Network(msg) => ApiError::Connection(msg),
            TransportError::Build(msg) => ApiError::Encode(msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
