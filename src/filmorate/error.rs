//! 统一错误类型
//!
//! DAO 层沿用 `anyhow::Context` 为每次 sqlx 调用附加上下文，
//! 通过 `?` 自动提升为 [`FilmorateError::Persistence`]。

use crate::filmorate::repository::EntityId;
use thiserror::Error;

/// 核心层向调用方暴露的错误分类
#[derive(Debug, Error)]
pub enum FilmorateError {
    /// 需要存在的 id 不存在
    #[error("未找到{entity}: id={id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// 字段校验失败（原样返回给调用方，不重试）
    #[error("校验失败: {0}")]
    Validation(String),

    /// 底层存储失败
    #[error("持久化失败: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl FilmorateError {
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type FilmorateResult<T> = Result<T, FilmorateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn persistence_keeps_context_chain() {
        let res: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let err: FilmorateError = res.context("写入失败").unwrap_err().into();
        let text = err.to_string();
        assert!(text.contains("写入失败"));
        assert!(text.contains("disk gone"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = FilmorateError::not_found("用户", 9999);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "未找到用户: id=9999");
    }
}
