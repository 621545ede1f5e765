//! HTTP 路由处理器
//!
//! HTML 页面：/apps/pagekite、/apps/pagekite/configure
//! JSON 接口：/api/pagekite/status、/api/health

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::TokenQuery;
use super::views;
use crate::actions::SharedActionRunner;
use crate::config::PanelConfig;
use crate::error::AppError;
use crate::pagekite::{self, ConfigureForm, FormErrors, KiteStatus, Message};

/// 共享状态
pub struct AppState {
    pub runner: SharedActionRunner,
    pub config: PanelConfig,
}

/// 出错时渲染通用错误页
fn error_response(err: AppError) -> Response {
    tracing::error!(error = %err, "PageKite request failed");
    (err.status_code(), Html(views::error_page(&err.to_string()))).into_response()
}

/// GET /
pub async fn index(Query(query): Query<TokenQuery>) -> Redirect {
    Redirect::to(&format!(
        "/apps/pagekite{}",
        views::token_query(query.token.as_deref())
    ))
}

/// GET /apps/pagekite
///
/// 介绍页
pub async fn introduction(Query(query): Query<TokenQuery>) -> Html<String> {
    Html(views::introduction_page(query.token.as_deref()))
}

/// GET /apps/pagekite/configure
///
/// 以当前状态填充配置表单
pub async fn configure_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let token = query.token.as_deref();

    match pagekite::get_status(state.runner.as_ref()).await {
        Ok(Some(status)) => Html(views::configure_page(
            &ConfigureForm::from_status(&status),
            &FormErrors::default(),
            &[],
            token,
        ))
        .into_response(),
        Ok(None) => Html(views::not_installed_page(token)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /apps/pagekite/configure
///
/// 校验表单，应用变更后重新读取状态并回显
pub async fn configure_submit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    Form(form): Form<ConfigureForm>,
) -> Response {
    let token = query.token.as_deref();
    let runner = state.runner.as_ref();

    let old_status = match pagekite::get_status(runner).await {
        Ok(Some(status)) => status,
        Ok(None) => return Html(views::not_installed_page(token)).into_response(),
        Err(e) => return error_response(e),
    };

    let new_status = match form.clean() {
        Ok(status) => status,
        Err(errors) => {
            return Html(views::configure_page(&form, &errors, &[], token)).into_response()
        }
    };

    let messages = match pagekite::apply_changes(runner, &old_status, &new_status).await {
        Ok(messages) => messages,
        Err(e) => {
            // 回显提交的表单，附带错误消息
            tracing::error!(error = %e, "Applying PageKite changes failed");
            return (
                e.status_code(),
                Html(views::configure_page(
                    &form,
                    &FormErrors::default(),
                    &[Message::error(e.to_string())],
                    token,
                )),
            )
                .into_response();
        }
    };

    match pagekite::get_status(runner).await {
        Ok(Some(status)) => Html(views::configure_page(
            &ConfigureForm::from_status(&status),
            &FormErrors::default(),
            &messages,
            token,
        ))
        .into_response(),
        Ok(None) => Html(views::not_installed_page(token)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 应用变更的响应
#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub messages: Vec<Message>,
    pub status: Option<KiteStatus>,
}

/// GET /api/pagekite/status
///
/// 未安装时返回 `null`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<KiteStatus>>, AppError> {
    let status = pagekite::get_status(state.runner.as_ref()).await?;
    Ok(Json(status))
}

/// PUT /api/pagekite/status
///
/// 与表单提交相同的校验与应用流程
pub async fn put_status(
    State(state): State<Arc<AppState>>,
    Json(new_status): Json<KiteStatus>,
) -> Result<Json<ApplyResponse>, AppError> {
    let new_status = ConfigureForm::from_status(&new_status)
        .clean()
        .map_err(|errors| {
            AppError::Validation(
                serde_json::to_string(&errors).unwrap_or_else(|_| "invalid status".to_string()),
            )
        })?;

    let runner = state.runner.as_ref();
    let old_status = pagekite::get_status(runner)
        .await?
        .ok_or_else(|| AppError::Validation("PageKite is not installed".to_string()))?;

    let messages = pagekite::apply_changes(runner, &old_status, &new_status).await?;
    let status = pagekite::get_status(runner).await?;

    Ok(Json(ApplyResponse { messages, status }))
}

/// GET /api/health
///
/// 健康检查端点
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "kite-panel"
        })),
    )
}
