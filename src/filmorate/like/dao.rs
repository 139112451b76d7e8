//! 点赞数据访问层（DAO）

use crate::filmorate::error::FilmorateResult;
use crate::filmorate::repository::EntityId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// 点赞事实存储：(film_id, user_id) 唯一
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// 幂等插入，返回是否新增
    async fn add_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool>;

    /// 存在则删除，返回是否删除
    async fn remove_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool>;

    /// 单部电影的点赞人数
    async fn like_count(&self, film_id: EntityId) -> FilmorateResult<u64>;

    /// 按点赞人数降序的电影 id，同票按 id 升序，最多 `count` 个
    async fn popular(&self, count: usize) -> FilmorateResult<Vec<EntityId>>;
}

/// 进程内点赞表：film_id → 点赞用户集合
#[derive(Default)]
pub struct InMemoryLikeStore {
    likes: RwLock<HashMap<EntityId, HashSet<EntityId>>>,
}

impl InMemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn add_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool> {
        Ok(self
            .likes
            .write()
            .await
            .entry(film_id)
            .or_default()
            .insert(user_id))
    }

    async fn remove_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool> {
        let mut likes = self.likes.write().await;
        let removed = match likes.get_mut(&film_id) {
            Some(users) => users.remove(&user_id),
            None => false,
        };
        if likes.get(&film_id).is_some_and(HashSet::is_empty) {
            likes.remove(&film_id);
        }
        Ok(removed)
    }

    async fn like_count(&self, film_id: EntityId) -> FilmorateResult<u64> {
        Ok(self
            .likes
            .read()
            .await
            .get(&film_id)
            .map_or(0, |users| users.len() as u64))
    }

    async fn popular(&self, count: usize) -> FilmorateResult<Vec<EntityId>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(EntityId, usize)> = self
            .likes
            .read()
            .await
            .iter()
            .filter(|(_, users)| !users.is_empty())
            .map(|(film_id, users)| (*film_id, users.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked.into_iter().take(count).map(|(id, _)| id).collect())
    }
}

/// 点赞 DAO（基于 sqlx）
pub struct SqliteLikeDao {
    db: Pool<Sqlite>,
}

impl SqliteLikeDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for SqliteLikeDao {
    async fn add_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO likes (film_id, user_id) VALUES (?, ?)
            ON CONFLICT(film_id, user_id) DO NOTHING
            "#,
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("插入点赞失败")?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<bool> {
        let res = sqlx::query("DELETE FROM likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("删除点赞失败")?;
        Ok(res.rows_affected() > 0)
    }

    async fn like_count(&self, film_id: EntityId) -> FilmorateResult<u64> {
        let count: i64 =
            sqlx::query("SELECT COUNT(DISTINCT user_id) AS likes FROM likes WHERE film_id = ?")
                .bind(film_id)
                .fetch_one(&self.db)
                .await
                .context("统计点赞失败")?
                .try_get("likes")
                .context("解析点赞数失败")?;
        Ok(count.max(0) as u64)
    }

    async fn popular(&self, count: usize) -> FilmorateResult<Vec<EntityId>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT film_id, COUNT(DISTINCT user_id) AS likes
            FROM likes
            GROUP BY film_id
            ORDER BY likes DESC, film_id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("查询热门电影失败")?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<EntityId, _>("film_id"))
            .collect::<Result<Vec<_>, _>>()
            .context("解析热门电影失败")?;
        debug!("[LikeDAO] 热门电影 top{}: {:?}", count, ids);
        Ok(ids)
    }
}
