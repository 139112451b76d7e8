//! 好友数据访问层（DAO）
//!
//! 负责所有好友边的读写。每个写操作在一把锁（进程内）或一个事务（SQLite）
//! 内完成，并发的重复申请只会留下一条边。

use crate::filmorate::error::FilmorateResult;
use crate::filmorate::friend::models::{FriendRequestOutcome, Friendship};
use crate::filmorate::repository::EntityId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

/// 好友边存储
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// 发起申请：边已存在时无操作；反向边存在时双方确认
    async fn request(
        &self,
        user_id: EntityId,
        friend_id: EntityId,
    ) -> FilmorateResult<FriendRequestOutcome>;

    /// 两人之间任一方向有边时，把双向都置为已确认（缺失方向补齐）；无边返回 false
    async fn confirm(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool>;

    /// 删除 user_id → friend_id；反向边退回待确认。返回是否删除
    async fn remove(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool>;

    /// user_id 发出的全部边，按 friend_id 升序
    async fn friendships(&self, user_id: EntityId) -> FilmorateResult<Vec<Friendship>>;

    /// user_id 的好友 id，按升序
    async fn friend_ids(&self, user_id: EntityId) -> FilmorateResult<Vec<EntityId>> {
        Ok(self
            .friendships(user_id)
            .await?
            .into_iter()
            .map(|f| f.friend_id)
            .collect())
    }
}

/// 进程内好友表：user_id → (friend_id → confirmed)
#[derive(Default)]
pub struct InMemoryFriendshipStore {
    edges: RwLock<HashMap<EntityId, BTreeMap<EntityId, bool>>>,
}

impl InMemoryFriendshipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FriendshipStore for InMemoryFriendshipStore {
    async fn request(
        &self,
        user_id: EntityId,
        friend_id: EntityId,
    ) -> FilmorateResult<FriendRequestOutcome> {
        let mut edges = self.edges.write().await;

        if edges
            .get(&user_id)
            .is_some_and(|out| out.contains_key(&friend_id))
        {
            return Ok(FriendRequestOutcome::AlreadyExists);
        }

        let reciprocal = match edges.get_mut(&friend_id).and_then(|out| out.get_mut(&user_id)) {
            Some(confirmed) => {
                *confirmed = true;
                true
            }
            None => false,
        };
        edges.entry(user_id).or_default().insert(friend_id, reciprocal);

        Ok(if reciprocal {
            FriendRequestOutcome::Reciprocated
        } else {
            FriendRequestOutcome::Requested
        })
    }

    async fn confirm(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool> {
        let mut edges = self.edges.write().await;

        let has_edge = |from: EntityId, to: EntityId| {
            edges.get(&from).is_some_and(|out| out.contains_key(&to))
        };
        if !has_edge(user_id, friend_id) && !has_edge(friend_id, user_id) {
            return Ok(false);
        }

        edges.entry(user_id).or_default().insert(friend_id, true);
        edges.entry(friend_id).or_default().insert(user_id, true);
        Ok(true)
    }

    async fn remove(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool> {
        let mut edges = self.edges.write().await;

        let Some(out) = edges.get_mut(&user_id) else {
            return Ok(false);
        };
        let removed = out.remove(&friend_id).is_some();
        if out.is_empty() {
            edges.remove(&user_id);
        }
        if removed {
            if let Some(confirmed) = edges.get_mut(&friend_id).and_then(|out| out.get_mut(&user_id)) {
                *confirmed = false;
            }
        }
        Ok(removed)
    }

    async fn friendships(&self, user_id: EntityId) -> FilmorateResult<Vec<Friendship>> {
        Ok(self
            .edges
            .read()
            .await
            .get(&user_id)
            .map(|out| {
                out.iter()
                    .map(|(&friend_id, &confirmed)| Friendship {
                        user_id,
                        friend_id,
                        confirmed,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// 好友 DAO（基于 sqlx）
pub struct SqliteFriendshipDao {
    db: Pool<Sqlite>,
}

impl SqliteFriendshipDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FriendshipStore for SqliteFriendshipDao {
    async fn request(
        &self,
        user_id: EntityId,
        friend_id: EntityId,
    ) -> FilmorateResult<FriendRequestOutcome> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id, confirmed)
            VALUES (?, ?, 0)
            ON CONFLICT(user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await
        .context("插入好友申请失败")?
        .rows_affected();

        if inserted == 0 {
            tx.commit().await.context("提交事务失败")?;
            return Ok(FriendRequestOutcome::AlreadyExists);
        }

        let reciprocal = sqlx::query(
            "UPDATE friendships SET confirmed = 1 WHERE user_id = ? AND friend_id = ?",
        )
        .bind(friend_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("确认反向好友申请失败")?
        .rows_affected()
            > 0;

        if reciprocal {
            sqlx::query(
                "UPDATE friendships SET confirmed = 1 WHERE user_id = ? AND friend_id = ?",
            )
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await
            .context("确认好友申请失败")?;
        }

        tx.commit().await.context("提交事务失败")?;
        debug!(
            "[FriendDAO] 新增好友边 {} -> {}，reciprocal={}",
            user_id, friend_id, reciprocal
        );

        Ok(if reciprocal {
            FriendRequestOutcome::Reciprocated
        } else {
            FriendRequestOutcome::Requested
        })
    }

    async fn confirm(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        // 首条语句即写操作：先读后写时多连接下的锁升级会直接返回 SQLITE_BUSY
        let existing = sqlx::query(
            r#"
            UPDATE friendships SET confirmed = 1
            WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("确认好友申请失败")?
        .rows_affected();

        if existing == 0 {
            tx.rollback().await.context("回滚事务失败")?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id, confirmed)
            VALUES (?, ?, 1), (?, ?, 1)
            ON CONFLICT(user_id, friend_id) DO UPDATE SET confirmed = 1
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("确认好友关系失败")?;

        tx.commit().await.context("提交事务失败")?;
        debug!("[FriendDAO] 确认好友 {} <-> {}", user_id, friend_id);
        Ok(true)
    }

    async fn remove(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<bool> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        let removed = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE user_id = ? AND friend_id = ?
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await
        .context("删除好友失败")?
        .rows_affected()
            > 0;

        if removed {
            sqlx::query(
                "UPDATE friendships SET confirmed = 0 WHERE user_id = ? AND friend_id = ?",
            )
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("回退反向好友状态失败")?;
        }

        tx.commit().await.context("提交事务失败")?;
        Ok(removed)
    }

    async fn friendships(&self, user_id: EntityId) -> FilmorateResult<Vec<Friendship>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, friend_id, confirmed
            FROM friendships
            WHERE user_id = ?
            ORDER BY friend_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("查询好友列表失败")?;

        let friendships = rows
            .iter()
            .map(|row| -> Result<Friendship, sqlx::Error> {
                let confirmed: i64 = row.try_get("confirmed")?;
                Ok(Friendship {
                    user_id: row.try_get("user_id")?,
                    friend_id: row.try_get("friend_id")?,
                    confirmed: confirmed != 0,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .context("解析好友记录失败")?;

        debug!(
            "[FriendDAO] 获取用户 {} 的好友边，共 {} 条",
            user_id,
            friendships.len()
        );
        Ok(friendships)
    }
}
