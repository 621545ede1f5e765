//! 请求校验中间件
//!
//! - 配置了 `access_token` 时，要求请求携带 `?token=xxx`
//! - 修改状态的请求必须来自面板自身的 Origin

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;

use super::handlers::AppState;
use crate::error::AppError;

/// Token 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

type HmacSha256 = Hmac<Sha256>;

const TOKEN_CONTEXT: &[u8] = b"kite-panel access token";

/// 以常量时间比较两个 Token
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected_tag = match HmacSha256::new_from_slice(expected.as_bytes()) {
        Ok(mut mac) => {
            mac.update(TOKEN_CONTEXT);
            mac.finalize().into_bytes()
        }
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(provided.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };

    mac.update(TOKEN_CONTEXT);
    mac.verify_slice(&expected_tag).is_ok()
}

/// 校验请求中的 Token
pub fn is_authorized(expected: Option<&str>, provided: Option<&str>) -> bool {
    match expected {
        None | Some("") => true,
        Some(expected) => provided.is_some_and(|p| tokens_match(expected, p)),
    }
}

/// 跨站请求检查：有 `Origin` 时其 authority 必须与 `Host` 一致
///
/// 没有 `Origin` 的请求（非浏览器客户端）放行
pub fn is_same_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return true;
    };

    let origin_authority = origin
        .to_str()
        .ok()
        .and_then(|o| o.parse::<Uri>().ok())
        .and_then(|uri| uri.authority().map(|a| a.as_str().to_ascii_lowercase()));
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_ascii_lowercase);

    matches!((origin_authority, host), (Some(o), Some(h)) if o == h)
}

/// 拒绝跨站发起的修改请求
pub async fn same_origin_middleware(request: Request, next: Next) -> Response {
    if !request.method().is_safe() && !is_same_origin(request.headers()) {
        tracing::warn!(
            path = %request.uri().path(),
            origin = ?request.headers().get(header::ORIGIN),
            "Rejected cross-origin request"
        );
        return AppError::Forbidden.into_response();
    }

    next.run(request).await
}

/// 认证中间件函数
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    request: Request,
    next: Next,
) -> Response {
    if !is_authorized(state.config.access_token.as_deref(), query.token.as_deref()) {
        tracing::warn!(path = %request.uri().path(), "Rejected request without valid token");
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}
