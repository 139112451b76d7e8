pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod film;
pub mod friend;
pub mod like;
pub mod reference;
pub mod repository;
pub mod serialization;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出组装入口与错误类型
pub use app::Filmorate;
pub use config::{StorageBackend, StorageConfig};
pub use error::{FilmorateError, FilmorateResult};
pub use repository::{Entity, EntityId, EntityRepository, InMemoryRepository};
