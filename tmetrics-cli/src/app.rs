use std::path::{Path, PathBuf};
use tmetrics_core::{config::AppConfig, error::Result, schema::SchemaResolver};

use crate::cli::{Commands, ConfigCommand};
use crate::commands;

#[derive(Debug, Clone)]
pub struct CliApp {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub resolver: SchemaResolver,
}

impl CliApp {
    /// 加载配置并初始化 CLI 应用
    pub fn new(config_path: &Path) -> Result<Self> {
        let config = AppConfig::find_and_load(config_path)?;
        config.model.validate()?;

        let resolver = SchemaResolver::from_config(config.timeplus.clone());

        Ok(Self {
            config,
            config_path: config_path.to_path_buf(),
            resolver,
        })
    }

    /// 表名参数缺省时使用配置中的表
    pub fn table_or_default(&self, table: Option<String>) -> String {
        table.unwrap_or_else(|| self.config.timeplus.table.clone())
    }

    /// 运行应用命令
    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Schema { table } => commands::run_schema(self, table.as_deref()).await?,
            Commands::StaticSchema { table } => {
                commands::run_static_schema(&self.table_or_default(table))?
            }
            Commands::Guide { table } => commands::run_guide(&self.table_or_default(table))?,
            Commands::CheckSql { sql, table } => {
                commands::run_check_sql(&sql, &self.table_or_default(table))?
            }
            Commands::Config(ConfigCommand::Show) => commands::run_config_show(self)?,
            Commands::Config(ConfigCommand::Init { .. }) => unreachable!(), // 已经在 main.rs 中处理
        }
        Ok(())
    }
}
