use super::catalog;
use super::driver::{RawColumn, SchemaDriver};
use super::types::{ColumnDescriptor, FallbackReason, SchemaResolution, SchemaResult};
use crate::config::TimeplusConfig;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 表结构解析器
///
/// 优先从运行中的 Timeplus/Proton 读取实时表结构，任何失败都回退到内置 schema。
/// 连接参数在构造时确定，之后只读；每次 `resolve` 独立打开并释放一个连接。
#[derive(Clone)]
pub struct SchemaResolver {
    config: TimeplusConfig,
    driver: Option<Arc<dyn SchemaDriver>>,
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .field("driver", &self.driver.as_ref().map(|d| d.name().to_string()))
            .finish()
    }
}

impl SchemaResolver {
    /// 使用指定驱动创建解析器；`driver` 为 None 时始终回退
    pub fn new(config: TimeplusConfig, driver: Option<Arc<dyn SchemaDriver>>) -> Self {
        Self { config, driver }
    }

    /// 使用编译时可用的默认驱动创建解析器
    pub fn from_config(config: TimeplusConfig) -> Self {
        Self::new(config, default_driver())
    }

    pub fn config(&self) -> &TimeplusConfig {
        &self.config
    }

    /// 配置中的目标表
    pub async fn resolve_default(&self) -> SchemaResolution {
        self.resolve(&self.config.table).await
    }

    /// 解析表结构，永不失败：失败原因体现在返回的变体中
    pub async fn resolve(&self, table_name: &str) -> SchemaResolution {
        match self.fetch_live(table_name).await {
            Ok(schema) => {
                info!(
                    "从 {}:{} 获取到表 {} 的实时结构，共 {} 列",
                    self.config.host,
                    self.config.port,
                    table_name,
                    schema.columns.len()
                );
                SchemaResolution::Live(schema)
            }
            Err(reason) => {
                warn!("表 {} 使用静态schema: {}", table_name, reason);
                SchemaResolution::Fallback(Self::fallback(table_name), reason)
            }
        }
    }

    /// 内置 schema；不认识的表返回空列清单
    pub fn fallback(table_name: &str) -> SchemaResult {
        let columns = catalog::static_columns(table_name).unwrap_or_default();
        SchemaResult::fallback(table_name, columns)
    }

    async fn fetch_live(&self, table_name: &str) -> Result<SchemaResult, FallbackReason> {
        let driver = self
            .driver
            .as_ref()
            .ok_or_else(|| FallbackReason::driver_unavailable("未启用数据库驱动"))?;

        if !self.config.is_complete() {
            return Err(FallbackReason::driver_unavailable("连接参数未配置"));
        }

        let database = self.config.database.as_str();

        // 连接在本函数返回时释放
        let mut conn = driver.connect(&self.config).await?;
        conn.ping().await?;
        debug!("{}:{} 连接正常", self.config.host, self.config.port);

        let rows = match conn.query_columns(database, table_name).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                debug!("system.columns 未返回 {}.{} 的列，尝试 DESCRIBE", database, table_name);
                conn.describe_table(database, table_name).await?
            }
            Err(e) => {
                warn!("查询 system.columns 失败: {}，尝试 DESCRIBE", e);
                conn.describe_table(database, table_name).await?
            }
        };

        if rows.is_empty() {
            return Err(FallbackReason::EmptyResult(table_name.to_string()));
        }

        let columns = rows
            .into_iter()
            .map(enrich)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(FallbackReason::malformed(format!("列名重复: {}", dup.name)));
        }

        Ok(SchemaResult::live(
            table_name,
            columns,
            self.config.connection_info(),
        ))
    }
}

fn enrich(row: RawColumn) -> Result<ColumnDescriptor, FallbackReason> {
    let name = row.name.trim();
    let data_type = row.data_type.trim();
    if name.is_empty() || data_type.is_empty() {
        return Err(FallbackReason::malformed(format!(
            "列名或类型为空: {:?}",
            row
        )));
    }

    let comment = catalog::merge_comment(name, data_type, &row.comment);
    Ok(ColumnDescriptor::new(name, data_type, comment))
}

#[cfg(feature = "http-driver")]
fn default_driver() -> Option<Arc<dyn SchemaDriver>> {
    Some(Arc::new(super::http_driver::HttpDriver::new()))
}

#[cfg(not(feature = "http-driver"))]
fn default_driver() -> Option<Arc<dyn SchemaDriver>> {
    None
}
