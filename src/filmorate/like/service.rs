//! 点赞排行服务层

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::film::Film;
use crate::filmorate::like::dao::LikeStore;
use crate::filmorate::repository::{Entity, EntityId, EntityRepository};
use crate::filmorate::user::UserDirectory;
use std::sync::Arc;
use tracing::{debug, info};

/// 记录点赞并按点赞人数排行
#[derive(Clone)]
pub struct LikeRanking {
    likes: Arc<dyn LikeStore>,
    films: Arc<dyn EntityRepository<Film>>,
    users: UserDirectory,
}

impl LikeRanking {
    pub fn new(
        likes: Arc<dyn LikeStore>,
        films: Arc<dyn EntityRepository<Film>>,
        users: UserDirectory,
    ) -> Self {
        Self {
            likes,
            films,
            users,
        }
    }

    async fn require_film(&self, film_id: EntityId) -> FilmorateResult<()> {
        match self.films.get_by_id(film_id).await? {
            Some(_) => Ok(()),
            None => Err(FilmorateError::not_found(Film::KIND, film_id)),
        }
    }

    /// 点赞（重复点赞无额外效果）
    pub async fn add_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<()> {
        self.require_film(film_id).await?;
        self.users.require(user_id).await?;

        if self.likes.add_like(film_id, user_id).await? {
            info!("[LikeRanking] 用户 {} 点赞电影 {}", user_id, film_id);
        } else {
            debug!("[LikeRanking] 用户 {} 已点赞过电影 {}", user_id, film_id);
        }
        Ok(())
    }

    /// 取消点赞（未点赞时无操作）
    pub async fn delete_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<()> {
        self.require_film(film_id).await?;
        self.users.require(user_id).await?;

        if self.likes.remove_like(film_id, user_id).await? {
            info!("[LikeRanking] 用户 {} 取消点赞电影 {}", user_id, film_id);
        }
        Ok(())
    }

    pub async fn like_count(&self, film_id: EntityId) -> FilmorateResult<u64> {
        self.require_film(film_id).await?;
        self.likes.like_count(film_id).await
    }

    /// 点赞人数最多的电影 id
    pub async fn popular_film_ids(&self, count: usize) -> FilmorateResult<Vec<EntityId>> {
        self.likes.popular(count).await
    }
}

#[cfg(test)]
mod tests {
    use crate::filmorate::test_support::{both_backends, film, user};

    #[tokio::test]
    async fn add_then_delete_restores_count() {
        for (backend, app) in both_backends().await {
            let f = app.films().create(film("Heat")).await.unwrap().id.unwrap();
            let u = app.users().create(user("al")).await.unwrap().id.unwrap();
            let likes = app.likes();

            let before = likes.like_count(f).await.unwrap();
            likes.add_like(f, u).await.unwrap();
            likes.add_like(f, u).await.unwrap();
            assert_eq!(likes.like_count(f).await.unwrap(), before + 1, "{backend}");

            likes.delete_like(f, u).await.unwrap();
            assert_eq!(likes.like_count(f).await.unwrap(), before, "{backend}");
            // 再删一次是无操作
            likes.delete_like(f, u).await.unwrap();
        }
    }

    #[tokio::test]
    async fn stale_references_are_not_found() {
        for (backend, app) in both_backends().await {
            let f = app.films().create(film("Heat")).await.unwrap().id.unwrap();
            let u = app.users().create(user("al")).await.unwrap().id.unwrap();
            let likes = app.likes();

            assert!(likes.add_like(f, 9999).await.unwrap_err().is_not_found(), "{backend}");
            assert!(likes.add_like(9999, u).await.unwrap_err().is_not_found());
            assert!(likes.delete_like(9999, u).await.unwrap_err().is_not_found());
            assert_eq!(likes.like_count(f).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn ranking_orders_by_distinct_likers_then_id() {
        for (backend, app) in both_backends().await {
            let mut films = Vec::new();
            for name in ["A", "B", "C"] {
                films.push(app.films().create(film(name)).await.unwrap().id.unwrap());
            }
            let mut users = Vec::new();
            for login in ["u1", "u2", "u3"] {
                users.push(app.users().create(user(login)).await.unwrap().id.unwrap());
            }
            let likes = app.likes();

            // C: 3 人，A: 1 人，B: 1 人
            for u in &users {
                likes.add_like(films[2], *u).await.unwrap();
            }
            likes.add_like(films[1], users[0]).await.unwrap();
            likes.add_like(films[0], users[1]).await.unwrap();
            likes.add_like(films[0], users[1]).await.unwrap();

            assert_eq!(
                likes.popular_film_ids(10).await.unwrap(),
                vec![films[2], films[0], films[1]],
                "{backend}"
            );
            assert_eq!(likes.popular_film_ids(1).await.unwrap(), vec![films[2]]);
            assert!(likes.popular_film_ids(0).await.unwrap().is_empty());
        }
    }
}
