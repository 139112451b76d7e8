//! 参考数据模型（类型、分级）

use crate::filmorate::repository::EntityId;
use serde::{Deserialize, Serialize};

/// 电影类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: EntityId,
    /// 客户端引用类型时可只传 id
    #[serde(default)]
    pub name: String,
}

/// MPA 内容分级
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpa {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Mpa {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// 内置类型表，与 migrations 中的种子数据保持一致
pub(crate) const GENRE_SEED: &[(EntityId, &str)] = &[
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

/// 内置分级表，与 migrations 中的种子数据保持一致
pub(crate) const MPA_SEED: &[(EntityId, &str)] = &[
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];
