use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tmetrics_core::constants::config::CONFIG_FILE_NAME;

/// 配置相关命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 生成默认配置文件
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 显示当前生效的配置
    Show,
}

/// T-Metrics CLI - t_metrics 表结构与 SQL 约束工具
#[derive(Parser, Debug)]
#[command(name = "tmetrics")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 获取表结构（优先实时，失败时回退到内置）
    Schema {
        /// 表名，默认使用配置中的表
        #[arg(long)]
        table: Option<String>,
    },
    /// 显示内置的静态表结构，不访问数据库
    StaticSchema {
        #[arg(long)]
        table: Option<String>,
    },
    /// 显示表的查询约束、常用查询模式和函数
    Guide {
        #[arg(long)]
        table: Option<String>,
    },
    /// 检查 SQL 是否只查询单表
    CheckSql {
        /// 待检查的 SQL
        sql: String,
        #[arg(long)]
        table: Option<String>,
    },
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_schema_command() {
        let cli = Cli::try_parse_from(["tmetrics", "-v", "schema", "--table", "t_metrics"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("tmetrics.toml"));
        assert!(matches!(
            cli.command,
            Commands::Schema { table: Some(ref t) } if t == "t_metrics"
        ));
    }

    #[test]
    fn test_parse_check_sql() {
        let cli = Cli::try_parse_from([
            "tmetrics",
            "--config",
            "/etc/tmetrics.toml",
            "check-sql",
            "SELECT 1 FROM t_metrics",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/tmetrics.toml"));
        assert!(matches!(cli.command, Commands::CheckSql { table: None, .. }));
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["tmetrics", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Init { force: true })
        ));
    }
}
