//! 电影模型定义

use crate::filmorate::reference::models::{Genre, Mpa};
use crate::filmorate::repository::{Entity, EntityId};
use crate::filmorate::serialization::{deserialize_vec_or_null, duration_seconds};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// 电影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// 时长（JSON 中为整秒）
    #[serde(with = "duration_seconds")]
    pub duration: Duration,
    /// 分级（多对一）
    #[serde(default)]
    pub mpa: Option<Mpa>,
    /// 类型（多对多），读取时按 id 升序且去重
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub genres: Vec<Genre>,
}

impl Film {
    /// 引用的类型 id，升序去重
    pub fn genre_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.genres.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl Entity for Film {
    const KIND: &'static str = "电影";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
