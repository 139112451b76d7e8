pub mod filmorate;

// 重新导出常用类型，方便外部使用
pub use filmorate::{
    film::{Film, FilmCatalog},
    friend::{Friendship, FriendshipGraph},
    like::LikeRanking,
    reference::{Genre, Mpa, ReferenceLookups},
    user::{User, UserDirectory},
    EntityId, Filmorate, FilmorateError, FilmorateResult, StorageBackend, StorageConfig,
};
