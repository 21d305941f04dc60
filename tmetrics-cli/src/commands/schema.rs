use crate::app::CliApp;
use tmetrics_core::error::Result;
use tmetrics_core::schema::{QueryGuide, SchemaContext, SchemaResolution, SchemaResolver};
use tracing::{info, warn};

/// 获取表结构并输出提示词上下文，未指定表时使用配置中的表
pub async fn run_schema(app: &CliApp, table: Option<&str>) -> Result<()> {
    let tp = app.resolver.config();
    info!(
        "🔍 获取表结构: {} ({}:{}/{})",
        table.unwrap_or(tp.table.as_str()),
        tp.host,
        tp.port,
        tp.database
    );

    let resolution = match table {
        Some(table) => app.resolver.resolve(table).await,
        None => app.resolver.resolve_default().await,
    };
    report_resolution(&resolution);

    let context = SchemaContext::from_resolution(&resolution);
    println!("{}", context.to_pretty_json()?);
    Ok(())
}

/// 输出内置表结构
pub fn run_static_schema(table: &str) -> Result<()> {
    let schema = SchemaResolver::fallback(table);
    if schema.is_unsupported() {
        warn!("⚠️  没有表 {} 的内置表结构", table);
    } else {
        info!("📋 内置表结构: {} ({} 列)", table, schema.columns.len());
    }

    let context = SchemaContext::from_schema(&schema);
    println!("{}", context.to_pretty_json()?);
    Ok(())
}

/// 输出查询约束与常用模式
pub fn run_guide(table: &str) -> Result<()> {
    let guide = QueryGuide::for_table(table);
    println!("{}", guide.to_pretty_json()?);
    Ok(())
}

fn report_resolution(resolution: &SchemaResolution) {
    let schema = resolution.schema();
    match resolution {
        SchemaResolution::Live(_) => {
            info!("✅ 使用实时表结构，共 {} 列", schema.columns.len());
        }
        SchemaResolution::Fallback(_, reason) => {
            warn!("⚠️  实时表结构不可用: {}", reason);
            if schema.is_unsupported() {
                warn!("❌ 表 {} 没有内置表结构", schema.table_name);
            } else {
                info!("📋 使用内置表结构，共 {} 列", schema.columns.len());
            }
        }
    }
}
