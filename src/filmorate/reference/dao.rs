//! 参考数据访问层（DAO）
//!
//! 类型与分级均为只读数据：SQLite 由迁移脚本写入种子，进程内实现使用同一份种子。

use crate::filmorate::error::FilmorateResult;
use crate::filmorate::reference::models::{Genre, Mpa, GENRE_SEED, MPA_SEED};
use crate::filmorate::repository::EntityId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;
use tracing::debug;

/// 只读参考数据查询
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn all_genres(&self) -> FilmorateResult<Vec<Genre>>;

    async fn genre(&self, id: EntityId) -> FilmorateResult<Option<Genre>>;

    async fn all_mpa(&self) -> FilmorateResult<Vec<Mpa>>;

    async fn mpa(&self, id: EntityId) -> FilmorateResult<Option<Mpa>>;
}

/// 进程内参考数据
pub struct InMemoryReferenceStore {
    genres: BTreeMap<EntityId, Genre>,
    ratings: BTreeMap<EntityId, Mpa>,
}

impl InMemoryReferenceStore {
    /// 使用内置种子数据
    pub fn seeded() -> Self {
        Self {
            genres: GENRE_SEED
                .iter()
                .map(|&(id, name)| (id, Genre::new(id, name)))
                .collect(),
            ratings: MPA_SEED
                .iter()
                .map(|&(id, name)| (id, Mpa::new(id, name)))
                .collect(),
        }
    }
}

#[async_trait]
impl ReferenceStore for InMemoryReferenceStore {
    async fn all_genres(&self) -> FilmorateResult<Vec<Genre>> {
        Ok(self.genres.values().cloned().collect())
    }

    async fn genre(&self, id: EntityId) -> FilmorateResult<Option<Genre>> {
        Ok(self.genres.get(&id).cloned())
    }

    async fn all_mpa(&self) -> FilmorateResult<Vec<Mpa>> {
        Ok(self.ratings.values().cloned().collect())
    }

    async fn mpa(&self, id: EntityId) -> FilmorateResult<Option<Mpa>> {
        Ok(self.ratings.get(&id).cloned())
    }
}

/// 参考数据 DAO（基于 sqlx）
pub struct SqliteReferenceDao {
    db: Pool<Sqlite>,
}

impl SqliteReferenceDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_genre(row: &SqliteRow) -> Result<Genre, sqlx::Error> {
        Ok(Genre {
            id: row.try_get("genre_id")?,
            name: row.try_get("name")?,
        })
    }

    fn row_to_mpa(row: &SqliteRow) -> Result<Mpa, sqlx::Error> {
        Ok(Mpa {
            id: row.try_get("rating_id")?,
            name: row.try_get("name")?,
        })
    }
}

#[async_trait]
impl ReferenceStore for SqliteReferenceDao {
    async fn all_genres(&self) -> FilmorateResult<Vec<Genre>> {
        let rows = sqlx::query("SELECT genre_id, name FROM genres ORDER BY genre_id")
            .fetch_all(&self.db)
            .await
            .context("查询类型列表失败")?;

        let genres = rows
            .iter()
            .map(Self::row_to_genre)
            .collect::<Result<Vec<_>, _>>()
            .context("解析类型记录失败")?;
        debug!("[ReferenceDAO] 获取类型列表，共 {} 个", genres.len());
        Ok(genres)
    }

    async fn genre(&self, id: EntityId) -> FilmorateResult<Option<Genre>> {
        let row = sqlx::query("SELECT genre_id, name FROM genres WHERE genre_id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("查询类型失败")?;

        let genre = row
            .as_ref()
            .map(Self::row_to_genre)
            .transpose()
            .context("解析类型记录失败")?;
        Ok(genre)
    }

    async fn all_mpa(&self) -> FilmorateResult<Vec<Mpa>> {
        let rows = sqlx::query("SELECT rating_id, name FROM mpa_ratings ORDER BY rating_id")
            .fetch_all(&self.db)
            .await
            .context("查询分级列表失败")?;

        let ratings = rows
            .iter()
            .map(Self::row_to_mpa)
            .collect::<Result<Vec<_>, _>>()
            .context("解析分级记录失败")?;
        debug!("[ReferenceDAO] 获取分级列表，共 {} 个", ratings.len());
        Ok(ratings)
    }

    async fn mpa(&self, id: EntityId) -> FilmorateResult<Option<Mpa>> {
        let row = sqlx::query("SELECT rating_id, name FROM mpa_ratings WHERE rating_id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("查询分级失败")?;

        let mpa = row
            .as_ref()
            .map(Self::row_to_mpa)
            .transpose()
            .context("解析分级记录失败")?;
        Ok(mpa)
    }
}
