// ==========================================
// 宿舍分配系统 - 命令行入口
// ==========================================
// 用法（省略 <db_path> 时使用系统数据目录下的默认数据库）:
//   dorm-assign <db_path> init
//   dorm-assign <db_path> import-students <file>
//   dorm-assign <db_path> import-rooms <file>
//   dorm-assign <db_path> show <year> <semester> <dorm> <grade>
//   dorm-assign <db_path> allocate <year> <semester> <dorm> <grade> [seed]
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use dorm_assign::api::{DormApi, ImportApi};
use dorm_assign::config::{ConfigManager, DormConfigReader};
use dorm_assign::db::{get_default_db_path, init_schema, open_sqlite_connection};
use dorm_assign::domain::ScopeKey;
use dorm_assign::engine::DormView;
use dorm_assign::repository::{ActionLogRepository, SqliteDormRepository};
use dorm_assign::{logging, APP_NAME, VERSION};
use rusqlite::Connection;

const COMMANDS: [&str; 5] = ["init", "import-students", "import-rooms", "show", "allocate"];

const USAGE: &str = "用法: dorm-assign [db_path] <init|import-students <file>|import-rooms <file>|show <year> <semester> <dorm> <grade>|allocate <year> <semester> <dorm> <grade> [seed]>";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let default_db_path;
    let (db_path, command, rest) = match args.as_slice() {
        [command, rest @ ..] if COMMANDS.contains(&command.as_str()) => {
            default_db_path = get_default_db_path();
            (default_db_path.as_str(), command.as_str(), rest)
        }
        [db_path, command, rest @ ..] => (db_path.as_str(), command.as_str(), rest),
        _ => bail!(USAGE),
    };

    tracing::info!(version = VERSION, db = db_path, "{} 启动", APP_NAME);

    let conn = open_sqlite_connection(db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("初始化数据库 schema 失败")?;
    let conn = Arc::new(Mutex::new(conn));

    match (command, rest) {
        ("init", []) => {
            println!("数据库已初始化: {}", db_path);
        }
        ("import-students", [file]) => {
            let summary = import_api(&conn).import_students(Path::new(file))?;
            println!("名册导入完成: {} 条", summary.imported);
        }
        ("import-rooms", [file]) => {
            let summary = import_api(&conn).import_rooms(Path::new(file))?;
            println!("房间导入完成: {} 条", summary.imported);
        }
        ("show", [year, semester, dorm, grade]) => {
            let mut api = load_api(&conn).await?;
            let view = api.set_scope(parse_scope(year, semester, dorm, grade)?)?;
            print_view(&view);
        }
        ("allocate", [year, semester, dorm, grade, seed @ ..]) => {
            let seed = match seed {
                [] => None,
                [seed] => Some(seed.parse::<u64>().with_context(|| format!("无效的随机种子: {}", seed))?),
                _ => bail!(USAGE),
            };

            let mut api = load_api(&conn).await?;
            api.set_scope(parse_scope(year, semester, dorm, grade)?)?;
            let report = api.allocate(seed)?;
            let saved = api.save().await?;

            print_view(&api.view()?);
            println!(
                "随机分配: 尝试 {} 个床位, 填充 {} 个, 候选池 {} 人; 已保存 {} 间",
                report.attempted, report.filled, report.pool_size, saved
            );
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn import_api(conn: &Arc<Mutex<Connection>>) -> ImportApi {
    ImportApi::new(
        Arc::new(SqliteDormRepository::new(conn.clone())),
        Arc::new(ActionLogRepository::new(conn.clone())),
        "cli",
    )
}

async fn load_api(conn: &Arc<Mutex<Connection>>) -> Result<DormApi> {
    let config_manager = ConfigManager::from_connection(conn.clone()).map_err(|e| anyhow!(e.to_string()))?;
    let config = config_manager
        .load_dorm_config()
        .await
        .map_err(|e| anyhow!("配置加载失败: {}", e))?;

    let repo = Arc::new(SqliteDormRepository::new(conn.clone()).with_slot_limit(config.slots_per_room));
    let mut api = DormApi::new(config, repo.clone(), repo.clone(), repo)
        .with_action_log(Arc::new(ActionLogRepository::new(conn.clone())))
        .with_actor("cli");
    api.load().await?;
    Ok(api)
}

fn parse_scope(year: &str, semester: &str, dorm: &str, grade: &str) -> Result<ScopeKey> {
    Ok(ScopeKey::new(
        year.parse().with_context(|| format!("无效的年度: {}", year))?,
        semester.parse().with_context(|| format!("无效的学期: {}", semester))?,
        dorm,
        grade.parse().with_context(|| format!("无效的年级: {}", grade))?,
    ))
}

fn print_view(view: &DormView) {
    println!("范围: {}", view.scope);
    for row in &view.rows {
        let cells: Vec<&str> = row
            .cells
            .iter()
            .map(|c| if c.is_empty() { "-" } else { c.as_str() })
            .collect();
        println!("  [{}] {}\t{}", row.room_index, row.room_name, cells.join("\t"));
    }

    let remaining: Vec<String> = view
        .remaining
        .iter()
        .map(|c| format!("{}반={}", c.class_no, c.remaining))
        .collect();
    println!("剩余: {}", remaining.join(", "));
}
