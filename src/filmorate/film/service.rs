//! 电影目录服务层
//!
//! 负责电影的校验、持久化以及完整视图（分级、类型）的组装。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::film::dao::FilmGenreStore;
use crate::filmorate::film::models::Film;
use crate::filmorate::like::LikeRanking;
use crate::filmorate::reference::ReferenceLookups;
use crate::filmorate::repository::{require_assigned, Entity, EntityId, EntityRepository};
use crate::filmorate::validation::validate_film;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 电影目录
#[derive(Clone)]
pub struct FilmCatalog {
    films: Arc<dyn EntityRepository<Film>>,
    genres: Arc<dyn FilmGenreStore>,
    references: ReferenceLookups,
    ranking: LikeRanking,
}

impl FilmCatalog {
    pub fn new(
        films: Arc<dyn EntityRepository<Film>>,
        genres: Arc<dyn FilmGenreStore>,
        references: ReferenceLookups,
        ranking: LikeRanking,
    ) -> Self {
        Self {
            films,
            genres,
            references,
            ranking,
        }
    }

    /// 引用的分级与类型必须存在
    async fn check_references(&self, film: &Film) -> FilmorateResult<()> {
        if let Some(mpa) = &film.mpa {
            self.references.mpa(mpa.id).await?;
        }
        for genre_id in film.genre_ids() {
            self.references.genre(genre_id).await?;
        }
        Ok(())
    }

    /// 新建电影并写入类型关联，返回完整视图
    ///
    /// 电影行先落库；类型关联写入失败时电影行保留，错误照常返回。
    pub async fn create(&self, film: Film) -> FilmorateResult<Film> {
        validate_film(&film)?;
        self.check_references(&film).await?;

        let genre_ids = film.genre_ids();
        let created = self.films.create(film).await?;
        let id = created
            .id
            .ok_or_else(|| FilmorateError::Persistence(anyhow!("仓储未分配电影 id")))?;

        if let Err(e) = self.genres.add_genres(id, &genre_ids).await {
            warn!(
                "[FilmCatalog] 电影 {} 已保存，但类型关联写入失败: {}",
                id, e
            );
            return Err(e);
        }

        info!("[FilmCatalog] 新建电影 {}，类型 {:?}", id, genre_ids);
        self.get_by_id(id).await
    }

    /// 更新标量字段与分级，类型关联保持不变
    pub async fn update(&self, film: Film) -> FilmorateResult<Film> {
        let id = require_assigned(&film)?;
        self.require(id).await?;

        validate_film(&film)?;
        if let Some(mpa) = &film.mpa {
            self.references.mpa(mpa.id).await?;
        }

        self.films.update(film).await?;
        info!("[FilmCatalog] 更新电影 {}", id);
        self.get_by_id(id).await
    }

    /// 显式同步电影的类型集合（整体替换）
    pub async fn sync_genres(
        &self,
        film_id: EntityId,
        genre_ids: &[EntityId],
    ) -> FilmorateResult<Film> {
        self.require(film_id).await?;

        let mut ids = genre_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        for genre_id in &ids {
            self.references.genre(*genre_id).await?;
        }

        self.genres.replace_genres(film_id, &ids).await?;
        info!("[FilmCatalog] 电影 {} 类型同步为 {:?}", film_id, ids);
        self.get_by_id(film_id).await
    }

    async fn require(&self, id: EntityId) -> FilmorateResult<Film> {
        self.films
            .get_by_id(id)
            .await?
            .ok_or_else(|| FilmorateError::not_found(Film::KIND, id))
    }

    /// 补全分级名称与按 id 排序的类型
    async fn materialize(&self, mut film: Film) -> FilmorateResult<Film> {
        if let Some(mpa) = film.mpa.take() {
            film.mpa = Some(self.references.mpa(mpa.id).await?);
        }
        film.genres = match film.id {
            Some(id) => self.genres.genres_of(id).await?,
            None => Vec::new(),
        };
        Ok(film)
    }

    /// 解析完整电影视图，不存在即 NotFound
    pub async fn get_by_id(&self, id: EntityId) -> FilmorateResult<Film> {
        let film = self.require(id).await?;
        self.materialize(film).await
    }

    pub async fn list(&self) -> FilmorateResult<Vec<Film>> {
        let films = self.films.list().await?;
        let mut out = Vec::with_capacity(films.len());
        for film in films {
            out.push(self.materialize(film).await?);
        }
        debug!("[FilmCatalog] 获取电影列表，共 {} 部", out.len());
        Ok(out)
    }

    pub async fn add_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<()> {
        self.ranking.add_like(film_id, user_id).await
    }

    pub async fn delete_like(&self, film_id: EntityId, user_id: EntityId) -> FilmorateResult<()> {
        self.ranking.delete_like(film_id, user_id).await
    }

    /// 热门电影；排行中已无法解析的电影 id 直接跳过
    pub async fn get_popular(&self, count: usize) -> FilmorateResult<Vec<Film>> {
        let ids = self.ranking.popular_film_ids(count).await?;

        let mut films = Vec::with_capacity(ids.len());
        for id in ids {
            match self.films.get_by_id(id).await? {
                Some(film) => films.push(self.materialize(film).await?),
                None => warn!("[FilmCatalog] 热门排行中的电影 {} 已不存在，跳过", id),
            }
        }
        Ok(films)
    }
}
