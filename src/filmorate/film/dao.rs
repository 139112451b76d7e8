//! 电影数据访问层（DAO）
//!
//! `films` 表只保存标量字段与分级 id；类型关联单独存放在 `film_genres`，
//! 由 [`FilmGenreStore`] 负责，一次写入整批关联行。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::film::models::Film;
use crate::filmorate::reference::dao::ReferenceStore;
use crate::filmorate::reference::models::{Genre, Mpa};
use crate::filmorate::repository::{
    ensure_unassigned, require_assigned, Entity, EntityId, EntityRepository,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Duration;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 电影 DAO（基于 sqlx）
pub struct SqliteFilmDao {
    db: Pool<Sqlite>,
}

impl SqliteFilmDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_film(row: &SqliteRow) -> Result<Film, sqlx::Error> {
        let secs: i64 = row.try_get("duration")?;
        let duration = Duration::try_seconds(secs)
            .ok_or_else(|| sqlx::Error::Decode(format!("时长超出范围: {}", secs).into()))?;
        let rating_id: Option<EntityId> = row.try_get("rating_id")?;

        Ok(Film {
            id: Some(row.try_get("film_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            release_date: row.try_get("release_date")?,
            duration,
            mpa: rating_id.map(|id| Mpa::new(id, "")),
            genres: Vec::new(),
        })
    }
}

#[async_trait]
impl EntityRepository<Film> for SqliteFilmDao {
    async fn create(&self, mut film: Film) -> FilmorateResult<Film> {
        ensure_unassigned(&film)?;

        let id = sqlx::query(
            r#"
            INSERT INTO films (name, description, release_date, duration, rating_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration.num_seconds())
        .bind(film.mpa.as_ref().map(|m| m.id))
        .execute(&self.db)
        .await
        .context("插入电影失败")?
        .last_insert_rowid();

        film.set_id(id);
        info!("[FilmDAO] 新建电影，id={}, name={}", id, film.name);
        Ok(film)
    }

    async fn update(&self, film: Film) -> FilmorateResult<Film> {
        let id = require_assigned(&film)?;

        let res = sqlx::query(
            r#"
            UPDATE films SET
                name = ?, description = ?, release_date = ?, duration = ?, rating_id = ?
            WHERE film_id = ?
            "#,
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration.num_seconds())
        .bind(film.mpa.as_ref().map(|m| m.id))
        .bind(id)
        .execute(&self.db)
        .await
        .context("更新电影失败")?;

        if res.rows_affected() == 0 {
            return Err(FilmorateError::not_found(Film::KIND, id));
        }
        debug!("[FilmDAO] 更新电影，id={}", id);
        Ok(film)
    }

    async fn list(&self) -> FilmorateResult<Vec<Film>> {
        let rows = sqlx::query(
            r#"
            SELECT film_id, name, description, release_date, duration, rating_id
            FROM films
            ORDER BY film_id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询电影列表失败")?;

        let films = rows
            .iter()
            .map(Self::row_to_film)
            .collect::<Result<Vec<_>, _>>()
            .context("解析电影记录失败")?;
        debug!("[FilmDAO] 获取电影列表，共 {} 部", films.len());
        Ok(films)
    }

    async fn get_by_id(&self, id: EntityId) -> FilmorateResult<Option<Film>> {
        let row = sqlx::query(
            r#"
            SELECT film_id, name, description, release_date, duration, rating_id
            FROM films
            WHERE film_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("查询电影失败")?;

        let film = row
            .as_ref()
            .map(Self::row_to_film)
            .transpose()
            .context("解析电影记录失败")?;
        Ok(film)
    }
}

/// 电影-类型关联
#[async_trait]
pub trait FilmGenreStore: Send + Sync {
    /// 追加关联（已存在的关联保持不变）
    async fn add_genres(&self, film_id: EntityId, genre_ids: &[EntityId]) -> FilmorateResult<()>;

    /// 用给定集合整体替换电影的类型
    async fn replace_genres(&self, film_id: EntityId, genre_ids: &[EntityId])
        -> FilmorateResult<()>;

    /// 电影的类型，按类型 id 升序
    async fn genres_of(&self, film_id: EntityId) -> FilmorateResult<Vec<Genre>>;
}

/// 进程内关联表，类型名通过参考数据解析
pub struct InMemoryFilmGenreStore {
    links: RwLock<HashMap<EntityId, BTreeSet<EntityId>>>,
    references: Arc<dyn ReferenceStore>,
}

impl InMemoryFilmGenreStore {
    pub fn new(references: Arc<dyn ReferenceStore>) -> Self {
        Self {
            links: RwLock::new(HashMap::new()),
            references,
        }
    }
}

#[async_trait]
impl FilmGenreStore for InMemoryFilmGenreStore {
    async fn add_genres(&self, film_id: EntityId, genre_ids: &[EntityId]) -> FilmorateResult<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        self.links
            .write()
            .await
            .entry(film_id)
            .or_default()
            .extend(genre_ids.iter().copied());
        Ok(())
    }

    async fn replace_genres(
        &self,
        film_id: EntityId,
        genre_ids: &[EntityId],
    ) -> FilmorateResult<()> {
        self.links
            .write()
            .await
            .insert(film_id, genre_ids.iter().copied().collect());
        Ok(())
    }

    async fn genres_of(&self, film_id: EntityId) -> FilmorateResult<Vec<Genre>> {
        let ids: Vec<EntityId> = match self.links.read().await.get(&film_id) {
            Some(set) => set.iter().copied().collect(),
            None => return Ok(Vec::new()),
        };

        let mut genres = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(genre) = self.references.genre(id).await? {
                genres.push(genre);
            }
        }
        Ok(genres)
    }
}

/// 关联表 DAO（基于 sqlx）
pub struct SqliteFilmGenreDao {
    db: Pool<Sqlite>,
}

impl SqliteFilmGenreDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 单条多行 INSERT，重复关联忽略
    fn batch_insert(film_id: EntityId, genre_ids: &[EntityId]) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("INSERT OR IGNORE INTO film_genres (film_id, genre_id) ");
        qb.push_values(genre_ids.iter().copied(), |mut b, genre_id| {
            b.push_bind(film_id).push_bind(genre_id);
        });
        qb
    }
}

#[async_trait]
impl FilmGenreStore for SqliteFilmGenreDao {
    async fn add_genres(&self, film_id: EntityId, genre_ids: &[EntityId]) -> FilmorateResult<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        Self::batch_insert(film_id, genre_ids)
            .build()
            .execute(&self.db)
            .await
            .context("写入电影类型关联失败")?;
        debug!(
            "[FilmGenreDAO] 电影 {} 追加 {} 个类型",
            film_id,
            genre_ids.len()
        );
        Ok(())
    }

    async fn replace_genres(
        &self,
        film_id: EntityId,
        genre_ids: &[EntityId],
    ) -> FilmorateResult<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        sqlx::query("DELETE FROM film_genres WHERE film_id = ?")
            .bind(film_id)
            .execute(&mut *tx)
            .await
            .context("清理电影类型关联失败")?;

        if !genre_ids.is_empty() {
            Self::batch_insert(film_id, genre_ids)
                .build()
                .execute(&mut *tx)
                .await
                .context("写入电影类型关联失败")?;
        }

        tx.commit().await.context("提交电影类型关联失败")?;
        debug!(
            "[FilmGenreDAO] 电影 {} 类型同步为 {:?}",
            film_id, genre_ids
        );
        Ok(())
    }

    async fn genres_of(&self, film_id: EntityId) -> FilmorateResult<Vec<Genre>> {
        let rows = sqlx::query(
            r#"
            SELECT g.genre_id, g.name
            FROM film_genres fg
            JOIN genres g ON g.genre_id = fg.genre_id
            WHERE fg.film_id = ?
            ORDER BY g.genre_id
            "#,
        )
        .bind(film_id)
        .fetch_all(&self.db)
        .await
        .context("查询电影类型失败")?;

        let genres = rows
            .iter()
            .map(|row| -> Result<Genre, sqlx::Error> {
                Ok(Genre {
                    id: row.try_get("genre_id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .context("解析电影类型失败")?;
        Ok(genres)
    }
}
