//! 通用实体仓储
//!
//! [`EntityRepository`] 定义 create/update/list/get_by_id 契约，
//! 由进程内的 [`InMemoryRepository`] 和各模块的 SQLite DAO 实现，
//! 在组装阶段选择具体实现。两种实现对调用方的可观察行为一致。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 实体 ID（与 SQLite INTEGER 对齐）
pub type EntityId = i64;

/// 可持久化的实体
pub trait Entity: Clone + Send + Sync + 'static {
    /// 用于日志和 NotFound 错误的实体名
    const KIND: &'static str;

    fn id(&self) -> Option<EntityId>;

    fn set_id(&mut self, id: EntityId);
}

/// 实体仓储契约
#[async_trait]
pub trait EntityRepository<T: Entity>: Send + Sync {
    /// 持久化新实体并返回带 id 的记录；已带 id 的实体视为违规
    async fn create(&self, entity: T) -> FilmorateResult<T>;

    /// 整体替换已有实体的可变字段
    async fn update(&self, entity: T) -> FilmorateResult<T>;

    /// 返回全部记录（按 id 升序）
    async fn list(&self) -> FilmorateResult<Vec<T>>;

    /// 点查；不存在返回 `Ok(None)`
    async fn get_by_id(&self, id: EntityId) -> FilmorateResult<Option<T>>;
}

/// create 前置检查：id 必须由仓储分配
pub(crate) fn ensure_unassigned<T: Entity>(entity: &T) -> FilmorateResult<()> {
    match entity.id() {
        Some(id) => Err(FilmorateError::validation(format!(
            "新建{}时不能指定 id（收到 {}）",
            T::KIND,
            id
        ))),
        None => Ok(()),
    }
}

/// update 前置检查：必须携带 id
pub(crate) fn require_assigned<T: Entity>(entity: &T) -> FilmorateResult<EntityId> {
    entity
        .id()
        .ok_or_else(|| FilmorateError::validation(format!("更新{}时必须指定 id", T::KIND)))
}

struct Arena<T> {
    rows: BTreeMap<EntityId, T>,
    last_id: EntityId,
}

/// 进程内仓储：id → 实体的有序映射加单调计数器，统一由一把读写锁保护
pub struct InMemoryRepository<T> {
    arena: RwLock<Arena<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            arena: RwLock::new(Arena {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for InMemoryRepository<T> {
    async fn create(&self, mut entity: T) -> FilmorateResult<T> {
        ensure_unassigned(&entity)?;

        // 分配 id 与插入在同一把写锁内完成
        let mut arena = self.arena.write().await;
        arena.last_id += 1;
        let id = arena.last_id;
        entity.set_id(id);
        arena.rows.insert(id, entity.clone());

        debug!("[MemoryRepo] 新建{}，id={}", T::KIND, id);
        Ok(entity)
    }

    async fn update(&self, entity: T) -> FilmorateResult<T> {
        let id = require_assigned(&entity)?;

        let mut arena = self.arena.write().await;
        match arena.rows.get_mut(&id) {
            Some(slot) => {
                *slot = entity.clone();
                debug!("[MemoryRepo] 更新{}，id={}", T::KIND, id);
                Ok(entity)
            }
            None => Err(FilmorateError::not_found(T::KIND, id)),
        }
    }

    async fn list(&self) -> FilmorateResult<Vec<T>> {
        Ok(self.arena.read().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: EntityId) -> FilmorateResult<Option<T>> {
        Ok(self.arena.read().await.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: Option<EntityId>,
        text: String,
    }

    impl Entity for Note {
        const KIND: &'static str = "笔记";

        fn id(&self) -> Option<EntityId> {
            self.id
        }

        fn set_id(&mut self, id: EntityId) {
            self.id = Some(id);
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: None,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = InMemoryRepository::new();
        let a = repo.create(note("a")).await.unwrap();
        let b = repo.create(note("b")).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(repo.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn create_rejects_preassigned_id() {
        let repo = InMemoryRepository::new();
        let mut n = note("x");
        n.id = Some(7);
        let err = repo.create(n).await.unwrap_err();
        assert!(err.is_validation());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_requires_existing_id() {
        let repo = InMemoryRepository::new();
        let mut missing = note("x");
        missing.id = Some(42);
        assert!(repo.update(missing).await.unwrap_err().is_not_found());
        assert!(repo.update(note("x")).await.unwrap_err().is_validation());

        let mut stored = repo.create(note("old")).await.unwrap();
        stored.text = "new".to_string();
        repo.update(stored.clone()).await.unwrap();
        assert_eq!(repo.get_by_id(1).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn get_by_id_absent_is_none() {
        let repo: InMemoryRepository<Note> = InMemoryRepository::new();
        assert_eq!(repo.get_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_creates_never_share_an_id() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(note(&i.to_string())).await.unwrap().id.unwrap()
            }));
        }
        let mut ids = HashSet::new();
        for h in handles {
            assert!(ids.insert(h.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
    }
}
