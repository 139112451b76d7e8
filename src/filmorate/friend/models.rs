//! 好友关系模型定义

use crate::filmorate::repository::EntityId;
use serde::{Deserialize, Serialize};

/// 有向好友边：user_id 向 friend_id 发起，confirmed 表示对方已确认
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    #[serde(rename = "userID")]
    pub user_id: EntityId,
    #[serde(rename = "friendID")]
    pub friend_id: EntityId,
    pub confirmed: bool,
}

/// 发起好友申请的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendRequestOutcome {
    /// 新建待确认的边
    Requested,
    /// 对方已发起过申请，双方直接互相确认
    Reciprocated,
    /// 边已存在，无操作
    AlreadyExists,
}
