//! 用户模型定义

use crate::filmorate::repository::{Entity, EntityId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub email: String,
    pub login: String,
    /// 显示名，为空时取 login
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl User {
    /// 显示名为空白时以 login 代替
    pub(crate) fn fill_blank_name(&mut self) {
        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }
    }
}

impl Entity for User {
    const KIND: &'static str = "用户";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
