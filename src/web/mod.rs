//! 面板 HTTP Server 模块
//!
//! 提供 PageKite 配置页面与 JSON 接口。
//! 监听 127.0.0.1:{port}，仅接受本地请求。

mod auth;
mod handlers;
mod server;
mod views;

pub use handlers::AppState;
pub use server::{router, PanelServer, ServerHandle};
