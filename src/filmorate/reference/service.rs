//! 参考数据服务层

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::reference::dao::ReferenceStore;
use crate::filmorate::reference::models::{Genre, Mpa};
use crate::filmorate::repository::EntityId;
use std::sync::Arc;

/// 类型 / 分级查询
#[derive(Clone)]
pub struct ReferenceLookups {
    store: Arc<dyn ReferenceStore>,
}

impl ReferenceLookups {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self { store }
    }

    pub async fn genres(&self) -> FilmorateResult<Vec<Genre>> {
        self.store.all_genres().await
    }

    /// 按 id 解析类型，不存在时返回 NotFound
    pub async fn genre(&self, id: EntityId) -> FilmorateResult<Genre> {
        self.store
            .genre(id)
            .await?
            .ok_or_else(|| FilmorateError::not_found("类型", id))
    }

    pub async fn mpas(&self) -> FilmorateResult<Vec<Mpa>> {
        self.store.all_mpa().await
    }

    /// 按 id 解析分级，不存在时返回 NotFound
    pub async fn mpa(&self, id: EntityId) -> FilmorateResult<Mpa> {
        self.store
            .mpa(id)
            .await?
            .ok_or_else(|| FilmorateError::not_found("分级", id))
    }
}
