// ==========================================
// 销售订单生成系统 - 命令行入口
// ==========================================
// 子命令:
// - process <input> [-o output] [--json] [--offline]
// - load-reference [--cabinets F] [--colours F] [--code-map F] [--replace]
// - config list | config set <key> <value>
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use so_generation::api::{ConfigApi, OrderApi, ReferenceApi, ReferenceFiles};
use so_generation::config::OdooSettings;
use so_generation::crm::{CustomerDirectory, OdooClient, StaticDirectory};
use so_generation::db::get_default_db_path;
use so_generation::logging;
use std::path::PathBuf;
use std::sync::Arc;

/// 柜体订单表 → 销售订单行
#[derive(Debug, Parser)]
#[command(name = "so-generation", version, about = "Generate sales-order lines from furniture order sheets")]
struct Cli {
    /// SQLite 数据库路径（默认 SO_GEN_DB_PATH 或用户数据目录）
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 处理一个订单表文件
    Process {
        /// 订单表（.xlsx/.xls/.csv）
        input: PathBuf,

        /// 结果文件路径（默认与输入同目录）
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// 以 JSON 打印处理摘要
        #[arg(long)]
        json: bool,

        /// 不连接 CRM，使用缺省客户信息
        #[arg(long)]
        offline: bool,
    },

    /// 从 CSV 加载参考数据
    LoadReference {
        #[arg(long, value_name = "CSV")]
        cabinets: Option<PathBuf>,

        #[arg(long, value_name = "CSV")]
        colours: Option<PathBuf>,

        #[arg(long = "code-map", value_name = "CSV")]
        code_map: Option<PathBuf>,

        /// 先清空三张参考表
        #[arg(long)]
        replace: bool,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// 列出配置
    List,
    /// 设置配置
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = cli
        .db
        .map(|p| p.display().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::info!(version = so_generation::VERSION, db = %db_path, "{}", so_generation::APP_NAME);

    match cli.command {
        Command::Process {
            input,
            output,
            json,
            offline,
        } => {
            let directory: Arc<dyn CustomerDirectory> = if offline {
                Arc::new(StaticDirectory::empty())
            } else {
                let settings = OdooSettings::from_env().context("读取 Odoo 连接配置失败")?;
                Arc::new(OdooClient::new(settings).context("创建 CRM 客户端失败")?)
            };

            let api = OrderApi::new(&db_path, directory).context("初始化订单处理失败")?;
            let summary = api
                .process_file(&input, output.as_deref())
                .await
                .with_context(|| format!("处理订单表失败: {}", input.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "订单 {} ({}): {} 行 → 成功 {} 行，失败 {} 行",
                    summary.order_id,
                    summary.customer,
                    summary.total_rows,
                    summary.success_lines,
                    summary.failed_rows
                );
                println!("结果文件: {}", summary.output_path);
            }
        }

        Command::LoadReference {
            cabinets,
            colours,
            code_map,
            replace,
        } => {
            if cabinets.is_none() && colours.is_none() && code_map.is_none() {
                anyhow::bail!("至少需要指定 --cabinets / --colours / --code-map 之一");
            }

            let api = ReferenceApi::new(&db_path).context("打开参考数据库失败")?;
            let counts = api
                .load(
                    ReferenceFiles {
                        cabinets: cabinets.as_deref(),
                        colours: colours.as_deref(),
                        code_map: code_map.as_deref(),
                    },
                    replace,
                )
                .context("加载参考数据失败")?;

            println!(
                "cabinets={} colorcode={} code_raw={}",
                counts.cabinets, counts.colours, counts.code_mappings
            );
        }

        Command::Config { action } => {
            let api = ConfigApi::new(&db_path).context("打开配置数据库失败")?;
            match action {
                ConfigAction::List => {
                    for item in api.list_configs()? {
                        println!("{} = {}", item.key, item.value.as_deref().unwrap_or("(default)"));
                    }
                }
                ConfigAction::Set { key, value } => {
                    api.update_config(&key, &value)
                        .with_context(|| format!("设置配置失败: {}", key))?;
                    println!("{} = {}", key, value);
                }
            }
        }
    }

    Ok(())
}
