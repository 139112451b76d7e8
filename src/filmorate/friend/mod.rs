//! 好友关系模块
//!
//! 有向好友边 + 确认标记，支持申请、确认、删除与共同好友查询

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{FriendshipStore, InMemoryFriendshipStore, SqliteFriendshipDao};
pub use models::{FriendRequestOutcome, Friendship};
pub use service::FriendshipGraph;
