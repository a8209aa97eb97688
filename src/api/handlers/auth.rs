//! # 认证处理器

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use crate::api::extract::AuthenticatedUser;
use crate::api::response::MessageBody;
use crate::api::server::AppState;
use crate::auth::{LoginEvent, LoginOutput, TokenPair};
use crate::directory::UserRecord;
use crate::error::{AuthError, GatewayError, Result};
use crate::{linfo, logging::{LogComponent, LogStage}};

/// 刷新请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// 外部登录成功回调
pub async fn login_callback(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginEvent>, JsonRejection>,
) -> Result<Json<LoginOutput>> {
    let Json(event) = payload.map_err(|rejection| GatewayError::Serialization {
        message: "登录事件格式无效".to_string(),
        source: rejection.into(),
    })?;

    let output = state.exchange.exchange(&event).await?;
    Ok(Json(output))
}

/// 轮换令牌对
///
/// 请求体缺失或无法解析时与无效令牌同样返回 401。
pub async fn refresh(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>> {
    let refresh_token = payload
        .ok()
        .and_then(|Json(request)| request.refresh_token)
        .ok_or(AuthError::MissingToken)?;

    let pair = state.lifecycle.refresh(&refresh_token).await?;
    Ok(Json(pair))
}

/// 注销当前会话
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MessageBody>> {
    state.lifecycle.revoke(&user.identity).await?;

    linfo!(
        &user.identity,
        LogStage::Request,
        LogComponent::Handler,
        "logout",
        "注销成功"
    );
    Ok(Json(MessageBody::new("Logged out")))
}

/// 当前用户信息
pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Json<UserRecord>> {
    let record = state
        .users
        .find_by_identity(&user.identity)
        .await?
        .ok_or_else(|| GatewayError::not_found("User", &user.identity))?;
    Ok(Json(record))
}
