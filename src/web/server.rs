//! HTTP Server 实现
//!
//! 使用 axum 创建面板 HTTP Server，支持启动与优雅关闭。

use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, same_origin_middleware};
use super::handlers::{self, AppState};
use crate::actions::{CommandRunner, SharedActionRunner};
use crate::config::PanelConfig;
use crate::error::AppError;

/// Server 控制句柄
///
/// 用于控制 Server 的生命周期
pub struct ServerHandle {
    /// 关闭信号发送器
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// 后台任务
    task: Option<JoinHandle<()>>,
    /// 当前运行的端口
    port: u16,
}

impl ServerHandle {
    /// 获取当前端口
    pub fn port(&self) -> u16 {
        self.port
    }

    /// 关闭 Server 并等待后台任务结束
    pub async fn shutdown_and_wait(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/apps/pagekite", get(handlers::introduction))
        .route(
            "/apps/pagekite/configure",
            get(handlers::configure_form).post(handlers::configure_submit),
        )
        .route(
            "/api/pagekite/status",
            get(handlers::get_status).put(handlers::put_status),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn(same_origin_middleware))
        .route("/api/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 面板 HTTP Server
pub struct PanelServer {
    config: PanelConfig,
    runner: SharedActionRunner,
}

impl PanelServer {
    /// 使用配置中的外部工具创建 Server
    pub fn new(config: PanelConfig) -> Self {
        let runner = Arc::new(CommandRunner::from_config(&config));
        Self { config, runner }
    }

    /// 使用指定的 ActionRunner 创建 Server
    pub fn with_runner(config: PanelConfig, runner: SharedActionRunner) -> Self {
        Self { config, runner }
    }

    /// 启动 Server
    ///
    /// # Arguments
    /// * `port` - 可选端口号，如果不提供则使用配置中的端口
    ///
    /// # Returns
    /// ServerHandle 用于控制 Server 生命周期
    pub async fn start(&self, port: Option<u16>) -> Result<ServerHandle, AppError> {
        let port = port.unwrap_or(self.config.port);

        PanelConfig::validate_port(port)?;

        let state = Arc::new(AppState {
            runner: self.runner.clone(),
            config: self.config.clone(),
        });

        let app = router(state);

        // 绑定地址 (仅本地)
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind to port {}: {}", port, e)))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = graceful.await {
                tracing::error!(error = %e, "Server error");
            }
        });

        tracing::info!(%addr, "PageKite panel listening");

        Ok(ServerHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            port,
        })
    }

    /// 检查端口是否可用
    pub async fn check_port_available(port: u16) -> bool {
        tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .is_ok()
    }
}
