//! 好友关系服务层
//!
//! 采用“申请 / 确认”的非对称模型：
//! - `add_friend(a, b)` 只建立 a → b 的待确认边，此时 a 的好友含 b，b 的好友不含 a；
//! - b 回加 a 或任一方调用 `confirm_friend` 后双方互为好友；
//! - 一个用户的好友即其发出的全部边的目标。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::friend::dao::FriendshipStore;
use crate::filmorate::friend::models::{FriendRequestOutcome, Friendship};
use crate::filmorate::repository::EntityId;
use crate::filmorate::user::{User, UserDirectory};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 好友关系图
#[derive(Clone)]
pub struct FriendshipGraph {
    store: Arc<dyn FriendshipStore>,
    users: UserDirectory,
}

impl FriendshipGraph {
    pub fn new(store: Arc<dyn FriendshipStore>, users: UserDirectory) -> Self {
        Self { store, users }
    }

    async fn require_pair(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<()> {
        self.users.require(user_id).await?;
        self.users.require(friend_id).await
    }

    /// 发起好友申请（重复调用无操作）
    pub async fn add_friend(&self, user_id: EntityId, friend_id: EntityId) -> FilmorateResult<()> {
        self.require_pair(user_id, friend_id).await?;
        if user_id == friend_id {
            return Err(FilmorateError::validation("不能添加自己为好友"));
        }

        match self.store.request(user_id, friend_id).await? {
            FriendRequestOutcome::Requested => {
                info!("[FriendGraph] 用户 {} 向 {} 发起好友申请", user_id, friend_id)
            }
            FriendRequestOutcome::Reciprocated => {
                info!("[FriendGraph] 用户 {} 与 {} 互相申请，已成为好友", user_id, friend_id)
            }
            FriendRequestOutcome::AlreadyExists => {
                debug!("[FriendGraph] 好友边 {} -> {} 已存在", user_id, friend_id)
            }
        }
        Ok(())
    }

    /// 确认两人之间的好友关系（需已有任一方向的申请）
    pub async fn confirm_friend(
        &self,
        user_id: EntityId,
        friend_id: EntityId,
    ) -> FilmorateResult<()> {
        self.require_pair(user_id, friend_id).await?;
        if user_id == friend_id {
            return Err(FilmorateError::validation("不能添加自己为好友"));
        }

        if !self.store.confirm(user_id, friend_id).await? {
            return Err(FilmorateError::not_found("好友申请", friend_id));
        }
        info!("[FriendGraph] 用户 {} 与 {} 已确认为好友", user_id, friend_id);
        Ok(())
    }

    /// 删除 user_id → friend_id（不存在时无操作）
    pub async fn delete_friend(
        &self,
        user_id: EntityId,
        friend_id: EntityId,
    ) -> FilmorateResult<()> {
        self.require_pair(user_id, friend_id).await?;

        if self.store.remove(user_id, friend_id).await? {
            info!("[FriendGraph] 用户 {} 删除好友 {}", user_id, friend_id);
        }
        Ok(())
    }

    /// 用户发出的原始好友边
    pub async fn get_friendships(&self, user_id: EntityId) -> FilmorateResult<Vec<Friendship>> {
        self.users.require(user_id).await?;
        self.store.friendships(user_id).await
    }

    /// 用户的好友；已不存在的用户被过滤掉
    pub async fn get_friends(&self, user_id: EntityId) -> FilmorateResult<Vec<User>> {
        self.users.require(user_id).await?;
        let ids = self.store.friend_ids(user_id).await?;
        self.resolve(ids).await
    }

    /// 两个用户的共同好友（集合交集，不修改任何一方的数据）
    pub async fn get_common_friends(
        &self,
        user_id: EntityId,
        other_id: EntityId,
    ) -> FilmorateResult<Vec<User>> {
        self.require_pair(user_id, other_id).await?;

        let mine: BTreeSet<EntityId> = self.store.friend_ids(user_id).await?.into_iter().collect();
        let theirs: BTreeSet<EntityId> =
            self.store.friend_ids(other_id).await?.into_iter().collect();
        let common: Vec<EntityId> = mine.intersection(&theirs).copied().collect();

        debug!(
            "[FriendGraph] 用户 {} 与 {} 的共同好友: {:?}",
            user_id, other_id, common
        );
        self.resolve(common).await
    }

    async fn resolve(&self, ids: Vec<EntityId>) -> FilmorateResult<Vec<User>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.users.find(id).await? {
                Some(user) => users.push(user),
                None => warn!("[FriendGraph] 好友 {} 已不存在，跳过", id),
            }
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filmorate::app::Filmorate;
    use crate::filmorate::test_support::{both_backends, file_backed, user};

    async fn users(app: &Filmorate, logins: &[&str]) -> Vec<EntityId> {
        let mut ids = Vec::new();
        for login in logins {
            ids.push(app.users().create(user(login)).await.unwrap().id.unwrap());
        }
        ids
    }

    fn ids(users: &[User]) -> Vec<EntityId> {
        users.iter().filter_map(|u| u.id).collect()
    }

    #[tokio::test]
    async fn request_is_one_directional_until_confirmed() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let (a, b) = (u[0], u[1]);
            let graph = app.friends();

            graph.add_friend(a, b).await.unwrap();
            assert_eq!(ids(&graph.get_friends(a).await.unwrap()), vec![b], "{backend}");
            assert!(graph.get_friends(b).await.unwrap().is_empty(), "{backend}");
            assert_eq!(
                graph.get_friendships(a).await.unwrap(),
                vec![Friendship { user_id: a, friend_id: b, confirmed: false }]
            );

            graph.confirm_friend(b, a).await.unwrap();
            assert_eq!(ids(&graph.get_friends(b).await.unwrap()), vec![a], "{backend}");
            assert!(graph.get_friendships(a).await.unwrap()[0].confirmed);
        }
    }

    #[tokio::test]
    async fn reciprocal_request_confirms_both_edges() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let (a, b) = (u[0], u[1]);
            let graph = app.friends();

            graph.add_friend(a, b).await.unwrap();
            graph.add_friend(b, a).await.unwrap();

            assert_eq!(ids(&graph.get_friends(b).await.unwrap()), vec![a], "{backend}");
            assert!(graph.get_friendships(a).await.unwrap()[0].confirmed, "{backend}");
            assert!(graph.get_friendships(b).await.unwrap()[0].confirmed, "{backend}");
        }
    }

    #[tokio::test]
    async fn add_friend_is_idempotent() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let graph = app.friends();

            graph.add_friend(u[0], u[1]).await.unwrap();
            let once = graph.get_friendships(u[0]).await.unwrap();
            graph.add_friend(u[0], u[1]).await.unwrap();
            assert_eq!(graph.get_friendships(u[0]).await.unwrap(), once, "{backend}");
            assert_eq!(once.len(), 1);
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_and_leaves_no_edge() {
        for (backend, app) in both_backends().await {
            let a = users(&app, &["a"]).await[0];
            let graph = app.friends();

            assert!(graph.add_friend(a, 9999).await.unwrap_err().is_not_found(), "{backend}");
            assert!(graph.add_friend(9999, a).await.unwrap_err().is_not_found());
            assert!(graph.get_friendships(a).await.unwrap().is_empty(), "{backend}");
            assert!(graph.get_friends(9999).await.unwrap_err().is_not_found());
            assert!(graph.delete_friend(a, 9999).await.unwrap_err().is_not_found());
            assert!(graph.get_common_friends(a, 9999).await.unwrap_err().is_not_found());
        }
    }

    #[tokio::test]
    async fn self_friendship_is_rejected() {
        for (backend, app) in both_backends().await {
            let a = users(&app, &["a"]).await[0];
            assert!(app.friends().add_friend(a, a).await.unwrap_err().is_validation(), "{backend}");
        }
    }

    #[tokio::test]
    async fn confirm_without_any_request_is_not_found() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let err = app.friends().confirm_friend(u[0], u[1]).await.unwrap_err();
            assert!(err.is_not_found(), "{backend}");
            assert!(app.friends().get_friends(u[0]).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn delete_removes_one_direction_and_reverts_the_other_to_pending() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let (a, b) = (u[0], u[1]);
            let graph = app.friends();

            graph.add_friend(a, b).await.unwrap();
            graph.confirm_friend(a, b).await.unwrap();
            graph.delete_friend(a, b).await.unwrap();

            assert!(graph.get_friends(a).await.unwrap().is_empty(), "{backend}");
            assert_eq!(
                graph.get_friendships(b).await.unwrap(),
                vec![Friendship { user_id: b, friend_id: a, confirmed: false }],
                "{backend}"
            );
            // 删除不存在的边是无操作
            graph.delete_friend(a, b).await.unwrap();
        }
    }

    #[tokio::test]
    async fn common_friends_is_a_pure_intersection() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b", "c", "d", "e"]).await;
            let (a, b, c, d, e) = (u[0], u[1], u[2], u[3], u[4]);
            let graph = app.friends();

            graph.add_friend(a, c).await.unwrap();
            graph.add_friend(a, d).await.unwrap();
            graph.add_friend(b, d).await.unwrap();
            graph.add_friend(b, e).await.unwrap();

            let before_a = graph.get_friendships(a).await.unwrap();
            let before_b = graph.get_friendships(b).await.unwrap();

            assert_eq!(ids(&graph.get_common_friends(a, b).await.unwrap()), vec![d], "{backend}");
            assert_eq!(ids(&graph.get_common_friends(b, a).await.unwrap()), vec![d]);

            assert_eq!(graph.get_friendships(a).await.unwrap(), before_a, "{backend}");
            assert_eq!(graph.get_friendships(b).await.unwrap(), before_b, "{backend}");
        }
    }

    #[tokio::test]
    async fn concurrent_duplicate_requests_leave_one_edge() {
        for (backend, app) in both_backends().await {
            let u = users(&app, &["a", "b"]).await;
            let (a, b) = (u[0], u[1]);

            let mut handles = Vec::new();
            for _ in 0..8 {
                let graph = app.friends();
                handles.push(tokio::spawn(async move { graph.add_friend(a, b).await }));
            }
            for h in handles {
                h.await.unwrap().unwrap();
            }
            assert_eq!(app.friends().get_friendships(a).await.unwrap().len(), 1, "{backend}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_confirms_on_a_shared_database_file() {
        let (_dir, app) = file_backed().await;
        let logins: Vec<String> = (0..10).map(|i| format!("u{}", i)).collect();
        let logins: Vec<&str> = logins.iter().map(String::as_str).collect();
        let u = users(&app, &logins).await;
        let (a, others) = (u[0], u[1..].to_vec());

        for round in 0..5 {
            for &b in &others {
                app.friends().delete_friend(a, b).await.unwrap();
                app.friends().delete_friend(b, a).await.unwrap();
                app.friends().add_friend(b, a).await.unwrap();
            }

            let mut handles = Vec::new();
            for &b in others.iter().chain(others.iter()) {
                let graph = app.friends();
                handles.push(tokio::spawn(async move { graph.confirm_friend(a, b).await }));
            }
            for h in handles {
                h.await.unwrap().unwrap_or_else(|e| panic!("round {round}: {e}"));
            }

            let edges = app.friends().get_friendships(a).await.unwrap();
            assert_eq!(edges.len(), others.len(), "round {round}");
            assert!(edges.iter().all(|f| f.confirmed), "round {round}");
            for &b in &others {
                assert!(app.friends().get_friendships(b).await.unwrap()[0].confirmed);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_requests_on_a_shared_database_file() {
        let (_dir, app) = file_backed().await;
        let u = users(&app, &["a", "b"]).await;
        let (a, b) = (u[0], u[1]);

        let mut handles = Vec::new();
        for i in 0..16 {
            let graph = app.friends();
            // 一半正向一半反向，最终两条边都应被确认
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            handles.push(tokio::spawn(async move { graph.add_friend(from, to).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(
            app.friends().get_friendships(a).await.unwrap(),
            vec![Friendship { user_id: a, friend_id: b, confirmed: true }]
        );
        assert_eq!(
            app.friends().get_friendships(b).await.unwrap(),
            vec![Friendship { user_id: b, friend_id: a, confirmed: true }]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn add_racing_delete_on_a_shared_database_file() {
        let (_dir, app) = file_backed().await;
        let u = users(&app, &["a", "b"]).await;
        let (a, b) = (u[0], u[1]);

        let mut handles = Vec::new();
        for i in 0..20 {
            let graph = app.friends();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    graph.add_friend(a, b).await
                } else {
                    graph.delete_friend(a, b).await
                }
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let edges = app.friends().get_friendships(a).await.unwrap();
        assert!(edges.len() <= 1);
        assert!(edges.iter().all(|f| f.friend_id == b && !f.confirmed));
        assert!(app.friends().get_friendships(b).await.unwrap().is_empty());
    }
}
