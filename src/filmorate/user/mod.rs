//! 用户模块

pub mod dao;
pub mod models;
pub mod service;

pub use dao::SqliteUserDao;
pub use models::User;
pub use service::UserDirectory;
