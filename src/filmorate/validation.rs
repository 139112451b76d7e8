//! 字段校验
//!
//! 服务层在 create/update 之前调用；仓储本身不做字段校验。

use crate::filmorate::error::{FilmorateError, FilmorateResult};
use crate::filmorate::film::Film;
use crate::filmorate::user::User;
use chrono::{Local, NaiveDate};

/// 描述最大字符数
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// 最早允许的上映日期（1895-12-28，首次公开放映）
pub fn min_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

pub fn validate_film(film: &Film) -> FilmorateResult<()> {
    if film.name.trim().is_empty() {
        return Err(FilmorateError::validation("名称不能为空"));
    }
    if film.description.trim().is_empty() {
        return Err(FilmorateError::validation("描述不能为空"));
    }
    if film.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(FilmorateError::validation(format!(
            "描述最长 {} 个字符",
            MAX_DESCRIPTION_LEN
        )));
    }
    if film.release_date < min_release_date() {
        return Err(FilmorateError::validation(format!(
            "上映日期不能早于 {}",
            min_release_date()
        )));
    }
    if film.duration <= chrono::Duration::zero() {
        return Err(FilmorateError::validation("时长必须为正数"));
    }
    Ok(())
}

/// 以本地当前日期作为“今天”校验用户
pub fn validate_user(user: &User) -> FilmorateResult<()> {
    validate_user_at(user, Local::now().date_naive())
}

pub fn validate_user_at(user: &User, today: NaiveDate) -> FilmorateResult<()> {
    let email = user.email.trim();
    if email.is_empty() {
        return Err(FilmorateError::validation("邮箱不能为空"));
    }
    if !email.contains('@') {
        return Err(FilmorateError::validation("邮箱必须包含 @"));
    }
    if user.login.trim().is_empty() || user.login.chars().any(char::is_whitespace) {
        return Err(FilmorateError::validation("登录名不能为空且不能包含空白字符"));
    }
    if user.birthday > today {
        return Err(FilmorateError::validation("生日不能晚于今天"));
    }
    Ok(())
}
