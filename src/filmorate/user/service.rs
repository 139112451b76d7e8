//! 用户目录服务层
//!
//! 也是整个系统判断“用户是否存在”的依据，好友、点赞模块均经由这里校验 id。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::repository::{require_assigned, Entity, EntityId, EntityRepository};
use crate::filmorate::user::models::User;
use crate::filmorate::validation::validate_user;
use std::sync::Arc;
use tracing::info;

/// 用户目录
#[derive(Clone)]
pub struct UserDirectory {
    repo: Arc<dyn EntityRepository<User>>,
}

impl UserDirectory {
    pub fn new(repo: Arc<dyn EntityRepository<User>>) -> Self {
        Self { repo }
    }

    /// 校验后新建用户，显示名为空时取 login
    pub async fn create(&self, mut user: User) -> FilmorateResult<User> {
        validate_user(&user)?;
        user.fill_blank_name();
        let user = self.repo.create(user).await?;
        info!(
            "[UserDirectory] 新建用户 {:?}，login={}",
            user.id, user.login
        );
        Ok(user)
    }

    /// 校验后整体更新用户
    pub async fn update(&self, mut user: User) -> FilmorateResult<User> {
        let id = require_assigned(&user)?;
        self.require(id).await?;

        validate_user(&user)?;
        user.fill_blank_name();
        let user = self.repo.update(user).await?;
        info!("[UserDirectory] 更新用户 {}", id);
        Ok(user)
    }

    pub async fn list(&self) -> FilmorateResult<Vec<User>> {
        self.repo.list().await
    }

    /// 存在性查询：不存在时返回 `None`
    pub async fn find(&self, id: EntityId) -> FilmorateResult<Option<User>> {
        self.repo.get_by_id(id).await
    }

    /// 调用方明确要求解析的 id，不存在即 NotFound
    pub async fn get(&self, id: EntityId) -> FilmorateResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| FilmorateError::not_found(User::KIND, id))
    }

    /// 只校验存在性
    pub async fn require(&self, id: EntityId) -> FilmorateResult<()> {
        self.get(id).await.map(|_| ())
    }
}
