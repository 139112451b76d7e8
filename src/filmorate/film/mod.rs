//! 电影模块

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{FilmGenreStore, InMemoryFilmGenreStore, SqliteFilmDao, SqliteFilmGenreDao};
pub use models::Film;
pub use service::FilmCatalog;
