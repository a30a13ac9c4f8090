// ==========================================
// 考试排程系统 - 命令行入口
// ==========================================
// 命令: init-db | generate | audit | export | config
// 失败时以非零码退出
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use exam_timetable::app::{get_default_db_path, AppState};
use exam_timetable::logging;

#[derive(Parser)]
#[command(name = "exam-timetable")]
#[command(about = "考试排程：冲突图着色 + 时段/教室/监考分配", version)]
struct Cli {
    /// SQLite 数据库路径（默认: EXAM_TIMETABLE_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 建表（幂等）
    InitDb,

    /// 生成考试排程（整体替换旧排程）
    Generate {
        /// 随机种子（覆盖 exam_shuffle_seed 配置）
        #[arg(long)]
        seed: Option<u64>,

        /// 生成日 YYYY-MM-DD（默认今天）
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// 审计已落库排程的冲突
    Audit,

    /// 导出排程为 CSV
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// 排程配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 列出全部配置
    List,
    /// 设置配置值
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json_log);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("考试排程系统 v{}，数据库: {}", exam_timetable::VERSION, db_path);

    match run(cli.command, db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("❌ {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, db_path: String) -> Result<(), String> {
    let state = AppState::new(db_path)?;

    match command {
        Command::InitDb => {
            let version = state.init_database()?;
            println!("✅ 数据库已就绪 (schema v{}): {}", version, state.get_db_path());
        }
        Command::Generate { seed, today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let outcome = state.timetable_api.generate_for(today, seed);
            if !outcome.success {
                return Err(outcome.message);
            }
            println!("✅ {}", outcome.message);
            if let Some(report) = &outcome.report {
                for warning in &report.warnings {
                    println!("⚠️  {}", warning);
                }
            }
        }
        Command::Audit => {
            let summary = state.report_api.audit().map_err(|e| e.to_string())?;
            let exams = state.report_api.count_exams().map_err(|e| e.to_string())?;
            println!("考试总数: {}", exams);
            println!("学生同日多场: {}", summary.student_day_conflicts);
            println!("监考超负荷(人·日): {}", summary.staff_overloaded_days);
            println!("教室超员: {}", summary.room_capacity_overflows);
            if !summary.is_clean() {
                return Err("排程存在冲突".to_string());
            }
        }
        Command::Export { output } => {
            let rows = state
                .report_api
                .export_csv(&output)
                .map_err(|e| e.to_string())?;
            println!("✅ 已导出 {} 条考试到 {}", rows, output.display());
        }
        Command::Config { action } => match action {
            ConfigAction::List => {
                for item in state.config_api.list_configs().map_err(|e| e.to_string())? {
                    println!("{} = {}", item.key, item.value.as_deref().unwrap_or("(默认)"));
                }
            }
            ConfigAction::Set { key, value } => {
                state
                    .config_api
                    .update_config(&key, &value)
                    .map_err(|e| e.to_string())?;
                println!("✅ {} = {}", key, value.trim());
            }
        },
    }

    Ok(())
}
