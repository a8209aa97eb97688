//! # 健康检查处理器

use axum::Json;
use serde_json::{Value, json};

/// 存活检查，不访问任何依赖
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
