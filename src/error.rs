use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::r#struct::respond::Respond;

/// 调用表格后端时出现的错误，任何情况下都不会被当作空的成功结果
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("后端地址无效: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("请求后端失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("后端返回错误状态码: {0}")]
    Status(reqwest::StatusCode),

    #[error("后端返回的数据格式错误: {0}")]
    Malformed(String),
}

/// 作文评分失败，调用方统一转换为可重试的固定提示
#[derive(Error, Debug)]
pub enum GradingError {
    #[error("未配置AI接口密钥")]
    MissingCredential,

    #[error("请求AI接口失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI接口返回错误状态码: {0}")]
    Status(reqwest::StatusCode),

    #[error("AI接口返回的数据格式错误: {0}")]
    Malformed(String),
}

/// 返回给浏览器的错误，消息内容直接展示给用户
#[derive(Error, Debug, PartialEq)]
pub enum PortalError {
    // 本地校验失败，不会访问网络
    #[error("{0}")]
    Validation(String),

    // 网络或后端错误，用户可以手动重试
    #[error("{0}")]
    Retryable(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("انتهت الجلسة، يرجى تحديث الصفحة.")]
    SessionNotFound,

    #[error("هذه الخطوة غير متاحة حالياً.")]
    InvalidStep,

    // 成绩保存失败，只能刷新页面
    #[error("{0}")]
    Fatal(String),

    #[error("الخدمة غير متاحة حالياً، يرجى المحاولة لاحقاً.")]
    Unavailable,
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Retryable(_) => StatusCode::BAD_GATEWAY,
            PortalError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortalError::SessionNotFound => StatusCode::NOT_FOUND,
            PortalError::InvalidStep => StatusCode::CONFLICT,
            PortalError::Fatal(_) => StatusCode::CONFLICT,
            PortalError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(Respond {
            code: status.as_u16(),
            msg: self.to_string(),
        })
    }
}
