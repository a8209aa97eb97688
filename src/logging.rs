//! # 日志配置模块
//!
//! 统一的日志初始化与结构化日志宏。所有业务日志通过 `linfo!` 等宏输出，
//! 携带请求标识、阶段、组件与操作名，便于按字段过滤。

use std::env;
use std::fmt;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 日志阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    /// 启动
    Startup,
    /// 关闭
    Shutdown,
    /// 令牌校验与认证
    Authentication,
    /// 会话存储读写
    Session,
    /// 外部登录换取内部会话
    Exchange,
    /// 数据库操作
    Db,
    /// HTTP 请求处理
    Request,
}

impl LogStage {
    /// 字段值
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Authentication => "authentication",
            Self::Session => "session",
            Self::Exchange => "exchange",
            Self::Db => "db",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    /// 主程序
    Main,
    /// 配置
    Config,
    /// 数据库
    Database,
    /// 令牌编解码
    TokenCodec,
    /// 会话存储
    SessionStore,
    /// 请求认证闸门
    AuthGate,
    /// 令牌生命周期
    Lifecycle,
    /// 身份交换
    Exchange,
    /// 用户目录
    Directory,
    /// HTTP 服务装配
    ServerSetup,
    /// HTTP 处理器
    Handler,
}

impl LogComponent {
    /// 字段值
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::TokenCodec => "token_codec",
            Self::SessionStore => "session_store",
            Self::AuthGate => "auth_gate",
            Self::Lifecycle => "lifecycle",
            Self::Exchange => "exchange",
            Self::Directory => "directory",
            Self::ServerSetup => "server_setup",
            Self::Handler => "handler",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 输出 info 级结构化日志
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::info!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 输出 debug 级结构化日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::debug!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 输出 warn 级结构化日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::warn!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 输出 error 级结构化日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::error!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 令牌脱敏，只保留前缀用于日志
#[must_use]
pub fn token_preview(token: &str) -> String {
    const VISIBLE: usize = 10;
    match token.get(..VISIBLE) {
        Some(prefix) if token.len() > VISIBLE => format!("{prefix}..."),
        _ => "***".to_string(),
    }
}

/// 默认过滤规则：屏蔽 sqlx 的逐条查询日志
fn default_filter(level: &str) -> String {
    format!("{level},auth_gateway=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 优先于传入的级别。重复初始化时静默忽略。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
