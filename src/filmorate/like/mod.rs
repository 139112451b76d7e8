//! 点赞 / 热门排行模块

pub mod dao;
pub mod service;

pub use dao::{InMemoryLikeStore, LikeStore, SqliteLikeDao};
pub use service::LikeRanking;
