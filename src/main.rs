//! # Auth Gateway 主程序

use auth_gateway::{
    Result,
    api, app::AppContext,
    config::{load_config, load_config_from},
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "auth-gateway", version, about)]
struct Cli {
    /// 配置文件路径，默认按 RUST_ENV 选择 config/config.<env>.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，RUST_LOG 优先
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日志系统
    logging::init_logging(Some(&cli.log_level));

    if let Err(e) = run(cli).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        &format!(
            "服务启动: bind={}, session_store={:?}",
            config.server.bind_address(),
            config.session_store.backend
        )
    );

    let context = Arc::new(AppContext::build(config).await?);
    api::serve(context, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "signal_error",
            &format!("监听关闭信号失败: {e}")
        );
        std::future::pending::<()>().await;
    }
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "shutdown_requested",
        "收到关闭信号"
    );
}
