//! 参考数据模块（类型、MPA 分级）

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{InMemoryReferenceStore, ReferenceStore, SqliteReferenceDao};
pub use models::{Genre, Mpa};
pub use service::ReferenceLookups;
