//! # 数据库模块
//!
//! 数据库连接和迁移管理

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!(
        "正在连接数据库: {}",
        config.url.get(..50).unwrap_or(&config.url)
    );

    // 对于SQLite文件数据库，确保数据库文件的目录和文件存在
    if config.is_sqlite() && !config.is_memory_database() {
        ensure_sqlite_file(&config.url)?;
    }

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);
    if config.is_memory_database() {
        // 每个内存连接都是独立的数据库
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    info!("数据库连接成功");
    Ok(db)
}

fn ensure_sqlite_file(database_url: &str) -> Result<(), DbErr> {
    let without_scheme = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let db_path = without_scheme.split('?').next().unwrap_or(without_scheme);
    let db_file_path = Path::new(db_path);

    if let Some(parent_dir) = db_file_path.parent()
        && !parent_dir.as_os_str().is_empty()
        && !parent_dir.exists()
    {
        debug!("创建数据库目录: {}", parent_dir.display());
        std::fs::create_dir_all(parent_dir).map_err(|e| {
            DbErr::Custom(format!("无法创建数据库目录 {}: {e}", parent_dir.display()))
        })?;
    }

    if !db_file_path.exists() {
        debug!("创建数据库文件: {}", db_file_path.display());
        std::fs::File::create(db_file_path).map_err(|e| {
            DbErr::Custom(format!("无法创建数据库文件 {}: {e}", db_file_path.display()))
        })?;
    }
    Ok(())
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("开始运行数据库迁移...");

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            info!("数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            error!("数据库迁移失败: {}", e);
            Err(e)
        }
    }
}

/// 检查数据库状态
pub async fn check_database_status(db: &DatabaseConnection) -> Result<(), DbErr> {
    let status = ::migration::Migrator::get_pending_migrations(db).await?;

    if status.is_empty() {
        info!("所有迁移都已应用");
    } else {
        warn!("有 {} 个待应用的迁移", status.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_created_and_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            ..DatabaseConfig::default()
        };

        let db = init_database(&config).await.unwrap();
        run_migrations(&db).await.unwrap();
        check_database_status(&db).await.unwrap();
        assert!(path.exists());
    }
}
