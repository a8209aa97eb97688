//! # 路由配置
//!
//! 定义所有API路由和路由组织

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::server::AppState;
use crate::auth::middleware::authenticate;

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查路由
        .route("/health", get(handlers::health::health_check))
        // 认证路由
        .nest("/api/auth", auth_routes())
        .layer(middleware::from_fn_with_state(state.gate.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 认证路由
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/callback", post(handlers::auth::login_callback))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
}
