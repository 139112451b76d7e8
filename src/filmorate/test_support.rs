//! 测试辅助：内存 SQLite 连接池与两种后端的组装

use crate::filmorate::app::Filmorate;
use crate::filmorate::config::StorageConfig;
use crate::filmorate::db::create_sqlite_pool_with_migration;
use crate::filmorate::film::Film;
use crate::filmorate::reference::Mpa;
use crate::filmorate::user::User;
use chrono::{Duration, NaiveDate};
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;

pub(crate) async fn memory_pool() -> Pool<Sqlite> {
    create_sqlite_pool_with_migration("sqlite::memory:", 1)
        .await
        .expect("内存 SQLite 初始化失败")
}

/// 同一组断言需要在两种后端上各跑一遍
pub(crate) async fn both_backends() -> Vec<(&'static str, Filmorate)> {
    vec![
        (
            "memory",
            Filmorate::open(StorageConfig::memory()).await.unwrap(),
        ),
        (
            "sqlite",
            Filmorate::open(StorageConfig::sqlite("sqlite::memory:"))
                .await
                .unwrap(),
        ),
    ]
}

/// 基于临时文件的 SQLite，使用默认的多连接池；返回的目录需在测试期间保持存活
pub(crate) async fn file_backed() -> (TempDir, Filmorate) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("filmorate.db").display());
    let config = StorageConfig::sqlite(url);
    assert!(config.max_connections > 1);
    let app = Filmorate::open(config).await.unwrap();
    (dir, app)
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn user(login: &str) -> User {
    User {
        id: None,
        email: format!("{}@example.com", login),
        login: login.to_string(),
        name: String::new(),
        birthday: date(1990, 1, 1),
    }
}

pub(crate) fn matrix() -> Film {
    Film {
        id: None,
        name: "Matrix".to_string(),
        description: "A hacker learns the world is simulated".to_string(),
        release_date: date(1999, 12, 28),
        duration: Duration::minutes(120),
        mpa: Some(Mpa::new(4, "R")),
        genres: Vec::new(),
    }
}

pub(crate) fn film(name: &str) -> Film {
    Film {
        name: name.to_string(),
        ..matrix()
    }
}
