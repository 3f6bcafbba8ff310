use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("请求无效: {0}")]
    BadRequest(String),

    /// 同一操作已在进行中，拒绝重复提交
    #[error("操作进行中: {0}")]
    Busy(String),

    /// 后端返回了非成功的HTTP状态
    #[error("后端返回错误状态 {status}: {url}")]
    Backend { status: u16, url: String },

    #[error("HTTP请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("模板错误: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("渲染错误: {0}")]
    Render(#[from] handlebars::RenderError),
}

// 从Error转换为axum::http::StatusCode，用于HTTP响应
impl From<&Error> for StatusCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Busy(_) => StatusCode::CONFLICT,
            Error::Backend { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let json = Json(json!({
            "error": status.as_u16(),
            "message": self.to_string(),
        }));

        (status, json).into_response()
    }
}
