//! # HTTP 服务器
//!
//! Axum HTTP服务器，承载认证 API

use axum::Router;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::app::AppContext;
use crate::error::{GatewayError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::linfo;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 创建路由器
pub fn create_router(context: Arc<AppContext>) -> Router {
    super::routes::create_routes(AppState::new(context))
}

/// 启动服务器，直到 `shutdown` 完成后优雅退出
pub async fn serve<F>(context: Arc<AppContext>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = context.config.server.bind_address();
    let listener = TcpListener::bind(&bind_address).await.map_err(|e| {
        GatewayError::server_start_with_source(format!("无法绑定地址 {bind_address}"), e)
    })?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::ServerSetup,
        "server_listening",
        &format!("HTTP 服务监听于 {bind_address}")
    );

    axum::serve(listener, create_router(context))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GatewayError::server_start_with_source("HTTP 服务异常退出", e))?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "server_stopped",
        "HTTP 服务已停止"
    );
    Ok(())
}
