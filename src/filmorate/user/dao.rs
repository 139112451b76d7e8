//! 用户数据访问层（DAO）
//!
//! 负责 users 表的读写，id 由 SQLite 自增主键分配。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::repository::{
    ensure_unassigned, require_assigned, Entity, EntityId, EntityRepository,
};
use crate::filmorate::user::models::User;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

/// 用户 DAO（基于 sqlx）
pub struct SqliteUserDao {
    db: Pool<Sqlite>,
}

impl SqliteUserDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: Some(row.try_get("user_id")?),
            email: row.try_get("email")?,
            login: row.try_get("login")?,
            name: row.try_get("name")?,
            birthday: row.try_get("birthday")?,
        })
    }
}

#[async_trait]
impl EntityRepository<User> for SqliteUserDao {
    async fn create(&self, mut user: User) -> FilmorateResult<User> {
        ensure_unassigned(&user)?;

        let id = sqlx::query(
            r#"
            INSERT INTO users (email, login, name, birthday)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .execute(&self.db)
        .await
        .context("插入用户失败")?
        .last_insert_rowid();

        user.set_id(id);
        info!("[UserDAO] 新建用户，id={}, login={}", id, user.login);
        Ok(user)
    }

    async fn update(&self, user: User) -> FilmorateResult<User> {
        let id = require_assigned(&user)?;

        let res = sqlx::query(
            r#"
            UPDATE users SET
                email = ?, login = ?, name = ?, birthday = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(id)
        .execute(&self.db)
        .await
        .context("更新用户失败")?;

        if res.rows_affected() == 0 {
            return Err(FilmorateError::not_found(User::KIND, id));
        }
        debug!("[UserDAO] 更新用户，id={}", id);
        Ok(user)
    }

    async fn list(&self) -> FilmorateResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, email, login, name, birthday
            FROM users
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询用户列表失败")?;

        let users = rows
            .iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>, _>>()
            .context("解析用户记录失败")?;
        debug!("[UserDAO] 获取用户列表，共 {} 个", users.len());
        Ok(users)
    }

    async fn get_by_id(&self, id: EntityId) -> FilmorateResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, email, login, name, birthday
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("查询用户失败")?;

        let user = row
            .as_ref()
            .map(Self::row_to_user)
            .transpose()
            .context("解析用户记录失败")?;
        Ok(user)
    }
}
