use anyhow::{Context, Result};
use tmetrics_core::guard::check_single_table;
use tracing::info;

/// 检查 SQL 是否只查询单表
pub fn run_check_sql(sql: &str, table: &str) -> Result<()> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(anyhow::anyhow!("SQL 不能为空"));
    }

    check_single_table(sql, table).with_context(|| format!("SQL 未通过表 {table} 的单表约束"))?;

    info!("✅ SQL 只访问表 {}", table);
    Ok(())
}
