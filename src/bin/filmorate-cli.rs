//! Filmorate CLI
//!
//! 非交互式 CLI：打开指定存储，执行一个子命令，并以 JSON 输出结果

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use filmorate::{Film, Filmorate, Genre, Mpa, StorageBackend, StorageConfig, User};
use serde::Serialize;
use tracing::info;

/// Filmorate CLI
#[derive(Parser, Debug)]
#[command(name = "filmorate-cli")]
#[command(about = "Filmorate CLI - 电影目录、好友关系与热门排行", long_about = None)]
struct Args {
    /// 存储后端：memory 或 sqlite
    #[arg(short, long, default_value = "sqlite")]
    storage: StorageBackend,

    /// SQLite 数据库 URL
    #[arg(long, default_value = "sqlite://filmorate.db")]
    db_url: String,

    /// 日志级别（默认: info,filmorate=debug）
    #[arg(long, default_value = "info,filmorate=debug")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 写入示例数据并展示好友与热门排行
    Demo,
    /// 列出所有用户
    Users,
    /// 列出所有电影
    Films,
    /// 热门电影
    Popular {
        /// 返回数量
        #[arg(default_value_t = 10)]
        count: usize,
    },
    /// 用户的好友
    Friends { user_id: i64 },
    /// 类型列表
    Genres,
    /// MPA 分级列表
    Mpa,
}

/// 初始化日志（输出到 stderr，stdout 留给 JSON 结果）
fn init_logger(log_level: &str) {
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn demo_user(login: &str, name: &str, birthday: NaiveDate) -> User {
    User {
        id: None,
        email: format!("{}@filmorate.dev", login),
        login: login.to_string(),
        name: name.to_string(),
        birthday,
    }
}

fn demo_film(name: &str, released: NaiveDate, minutes: i64, mpa: i64, genres: &[i64]) -> Film {
    Film {
        id: None,
        name: name.to_string(),
        description: format!("{} ({})", name, released.format("%Y")),
        release_date: released,
        duration: Duration::minutes(minutes),
        mpa: Some(Mpa::new(mpa, "")),
        genres: genres.iter().map(|&id| Genre::new(id, "")).collect(),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("无效日期: {}-{}-{}", y, m, d))
}

fn assigned(id: Option<i64>) -> Result<i64> {
    id.context("存储未返回新记录的 id")
}

#[derive(Serialize)]
struct DemoReport {
    friends_of_neo: Vec<User>,
    friends_of_trinity: Vec<User>,
    common_friends: Vec<User>,
    popular: Vec<Film>,
}

async fn run_demo(app: &Filmorate) -> Result<()> {
    let users = app.users();
    let films = app.films();
    let friends = app.friends();

    let neo = users.create(demo_user("neo", "", ymd(1971, 9, 13)?)).await?;
    let trinity = users
        .create(demo_user("trinity", "Trinity", ymd(1975, 3, 1)?))
        .await?;
    let morpheus = users
        .create(demo_user("morpheus", "Morpheus", ymd(1961, 7, 30)?))
        .await?;
    let (neo, trinity, morpheus) = (
        assigned(neo.id)?,
        assigned(trinity.id)?,
        assigned(morpheus.id)?,
    );

    let matrix = films
        .create(demo_film("The Matrix", ymd(1999, 3, 31)?, 136, 4, &[6, 4]))
        .await?;
    let heat = films
        .create(demo_film("Heat", ymd(1995, 12, 15)?, 170, 4, &[6, 2]))
        .await?;
    let (matrix, heat) = (assigned(matrix.id)?, assigned(heat.id)?);

    friends.add_friend(neo, morpheus).await?;
    friends.add_friend(trinity, morpheus).await?;
    friends.add_friend(neo, trinity).await?;
    friends.confirm_friend(trinity, neo).await?;

    for user in [neo, trinity, morpheus] {
        films.add_like(matrix, user).await?;
    }
    films.add_like(heat, morpheus).await?;

    let report = DemoReport {
        friends_of_neo: friends.get_friends(neo).await?,
        friends_of_trinity: friends.get_friends(trinity).await?,
        common_friends: friends.get_common_friends(neo, trinity).await?,
        popular: films.get_popular(10).await?,
    };
    print_json(&report)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level);
    info!("[CLI] 存储后端: {}, 数据库: {}", args.storage, args.db_url);

    let config = StorageConfig {
        backend: args.storage,
        db_url: args.db_url.clone(),
        ..StorageConfig::new()
    };
    let app = Filmorate::open(config).await?;

    match args.command {
        Command::Demo => run_demo(&app).await?,
        Command::Users => print_json(&app.users().list().await?)?,
        Command::Films => print_json(&app.films().list().await?)?,
        Command::Popular { count } => print_json(&app.films().get_popular(count).await?)?,
        Command::Friends { user_id } => print_json(&app.friends().get_friends(user_id).await?)?,
        Command::Genres => print_json(&app.references().genres().await?)?,
        Command::Mpa => print_json(&app.references().mpas().await?)?,
    }

    info!("[CLI] 完成");
    Ok(())
}
