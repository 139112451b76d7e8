use chrono::Duration;
use serde::{Deserialize, Deserializer, Serializer};

/// 时长以整秒序列化（负数、溢出在反序列化时拒绝，零值交给校验层判断）
pub mod duration_seconds {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        if secs < 0 {
            return Err(serde::de::Error::custom(format!("时长不能为负数: {}", secs)));
        }
        Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("时长超出范围: {}", secs)))
    }
}

/// 反序列化数组字段，处理 null 值
pub fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
