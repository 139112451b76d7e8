//! SQLite 数据库工具：统一创建连接池并执行 sqlx 迁移
//!
//! 约定：本 crate 根目录下存在 `migrations/` 目录，存放所有迁移 SQL 文件。
//! 通过 `sqlx::migrate!()` 自动管理 schema 升级。

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// 创建 SQLite 连接池并执行所有未执行的迁移
///
/// 内存库（`sqlite::memory:`）每个连接都是独立的数据库，
/// 因此固定为单连接且不回收，保证整个池看到同一份数据。
pub async fn create_sqlite_pool_with_migration(
    db_url: &str,
    max_connections: u32,
) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("无效的 SQLite URL: {}", db_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(db_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
    }
    .with_context(|| format!("连接SQLite数据库失败: {}", db_url))?;

    // 从 `migrations/` 目录读取迁移并执行
    sqlx::migrate!().run(&pool).await.context("执行数据库迁移失败")?;

    info!("[DB] SQLite 连接池就绪: {}", db_url);
    Ok(pool)
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}
