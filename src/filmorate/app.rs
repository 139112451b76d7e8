//! 组装入口
//!
//! 按 [`StorageConfig`] 选择存储后端，并用同一组存储构造所有服务。

use crate::filmorate::config::{StorageBackend, StorageConfig};
use crate::filmorate::db::create_sqlite_pool_with_migration;
use crate::filmorate::error::FilmorateResult;
use crate::filmorate::film::{
    Film, FilmCatalog, FilmGenreStore, InMemoryFilmGenreStore, SqliteFilmDao, SqliteFilmGenreDao,
};
use crate::filmorate::friend::{
    FriendshipGraph, FriendshipStore, InMemoryFriendshipStore, SqliteFriendshipDao,
};
use crate::filmorate::like::{InMemoryLikeStore, LikeRanking, LikeStore, SqliteLikeDao};
use crate::filmorate::reference::{
    InMemoryReferenceStore, ReferenceLookups, ReferenceStore, SqliteReferenceDao,
};
use crate::filmorate::repository::{EntityRepository, InMemoryRepository};
use crate::filmorate::user::{SqliteUserDao, User, UserDirectory};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// 一种后端下的全部存储
struct Stores {
    users: Arc<dyn EntityRepository<User>>,
    films: Arc<dyn EntityRepository<Film>>,
    film_genres: Arc<dyn FilmGenreStore>,
    references: Arc<dyn ReferenceStore>,
    friendships: Arc<dyn FriendshipStore>,
    likes: Arc<dyn LikeStore>,
}

impl Stores {
    fn in_memory() -> Self {
        let references: Arc<dyn ReferenceStore> = Arc::new(InMemoryReferenceStore::seeded());
        Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            films: Arc::new(InMemoryRepository::<Film>::new()),
            film_genres: Arc::new(InMemoryFilmGenreStore::new(references.clone())),
            references,
            friendships: Arc::new(InMemoryFriendshipStore::new()),
            likes: Arc::new(InMemoryLikeStore::new()),
        }
    }

    async fn sqlite(config: &StorageConfig) -> FilmorateResult<Self> {
        let db = create_sqlite_pool_with_migration(&config.db_url, config.max_connections)
            .await
            .context("初始化 SQLite 存储失败")?;
        Ok(Self {
            users: Arc::new(SqliteUserDao::new(db.clone())),
            films: Arc::new(SqliteFilmDao::new(db.clone())),
            film_genres: Arc::new(SqliteFilmGenreDao::new(db.clone())),
            references: Arc::new(SqliteReferenceDao::new(db.clone())),
            friendships: Arc::new(SqliteFriendshipDao::new(db.clone())),
            likes: Arc::new(SqliteLikeDao::new(db)),
        })
    }
}

/// 电影目录系统
#[derive(Clone)]
pub struct Filmorate {
    backend: StorageBackend,
    films_repo: Arc<dyn EntityRepository<Film>>,
    users: UserDirectory,
    films: FilmCatalog,
    friends: FriendshipGraph,
    likes: LikeRanking,
    references: ReferenceLookups,
}

impl Filmorate {
    /// 按配置打开存储并组装服务
    pub async fn open(config: StorageConfig) -> FilmorateResult<Self> {
        let stores = match config.backend {
            StorageBackend::Memory => Stores::in_memory(),
            StorageBackend::Sqlite => Stores::sqlite(&config).await?,
        };
        info!("[Filmorate] 存储后端: {}", config.backend);
        Ok(Self::assemble(config.backend, stores))
    }

    fn assemble(backend: StorageBackend, stores: Stores) -> Self {
        let users = UserDirectory::new(stores.users);
        let references = ReferenceLookups::new(stores.references);
        let likes = LikeRanking::new(stores.likes, stores.films.clone(), users.clone());
        let films = FilmCatalog::new(
            stores.films.clone(),
            stores.film_genres,
            references.clone(),
            likes.clone(),
        );
        let friends = FriendshipGraph::new(stores.friendships, users.clone());

        Self {
            backend,
            films_repo: stores.films,
            users,
            films,
            friends,
            likes,
            references,
        }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn users(&self) -> UserDirectory {
        self.users.clone()
    }

    pub fn films(&self) -> FilmCatalog {
        self.films.clone()
    }

    pub fn friends(&self) -> FriendshipGraph {
        self.friends.clone()
    }

    pub fn likes(&self) -> LikeRanking {
        self.likes.clone()
    }

    pub fn references(&self) -> ReferenceLookups {
        self.references.clone()
    }

    /// 不经校验的电影仓储（仅用于数据导入和测试）
    pub fn film_repository(&self) -> Arc<dyn EntityRepository<Film>> {
        self.films_repo.clone()
    }
}
