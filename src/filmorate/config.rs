//! 存储配置

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储，重启后数据丢失
    Memory,
    /// SQLite 持久化存储
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" | "in-memory" => Ok(Self::Memory),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(format!("未知的存储后端: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// 后端类型
    pub backend: StorageBackend,
    /// SQLite 数据库 URL，例如 `sqlite://filmorate.db`，仅 Sqlite 后端使用
    pub db_url: String,
    /// 连接池最大连接数
    pub max_connections: u32,
}

impl StorageConfig {
    /// 默认配置：本地文件 SQLite
    pub fn new() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_url: "sqlite://filmorate.db".to_string(),
            max_connections: 5,
        }
    }

    /// 进程内存储
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            ..Self::new()
        }
    }

    /// 指定 URL 的 SQLite 存储
    pub fn sqlite(db_url: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_url: db_url.into(),
            ..Self::new()
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new()
    }
}
