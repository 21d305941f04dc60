//! t_metrics 内置表结构与列业务描述
//!
//! 回退 schema 与实时 schema 的补充说明共用同一份业务描述表。

use super::types::ColumnDescriptor;
use crate::constants::metrics_table;

/// (列名, 类型, 业务描述)，顺序即回退时的列顺序
const T_METRICS_COLUMNS: &[(&str, &str, &str)] = &[
    ("event_ts", "uint64", "Event timestamp"),
    ("metric", "string", "Metric name identifier"),
    (
        "value",
        "string",
        "Metric value (use to_float64() for numeric operations)",
    ),
    ("metric_date", "int64", "Date component"),
    ("metric_time", "int64", "Time component"),
    ("metric_datetime", "int64", "Combined datetime"),
    ("tagK1", "low_cardinality(string)", "Tag key 1"),
    ("tagV1", "string", "Tag value 1"),
    ("tagK2", "low_cardinality(string)", "Tag key 2"),
    ("tagV2", "string", "Tag value 2"),
    ("tagK3", "low_cardinality(string)", "Tag key 3"),
    ("tagV3", "string", "Tag value 3"),
    ("tagK4", "low_cardinality(string)", "Tag key 4"),
    ("tagV4", "string", "Tag value 4"),
    ("tagK5", "low_cardinality(string)", "Tag key 5"),
    ("tagV5", "string", "Tag value 5"),
    ("_tp_time", "datetime64(3, 'UTC')", "System timestamp"),
];

/// 内置目录支持的表
pub fn supported_tables() -> &'static [&'static str] {
    &[metrics_table::TABLE_NAME]
}

pub fn is_supported(table_name: &str) -> bool {
    supported_tables().contains(&table_name)
}

/// 按列名查找业务描述
pub fn business_description(column: &str) -> Option<&'static str> {
    T_METRICS_COLUMNS
        .iter()
        .find(|(name, _, _)| *name == column)
        .map(|(_, _, desc)| *desc)
}

/// 内置列清单；不认识的表返回 None
pub fn static_columns(table_name: &str) -> Option<Vec<ColumnDescriptor>> {
    if !is_supported(table_name) {
        return None;
    }

    Some(
        T_METRICS_COLUMNS
            .iter()
            .map(|(name, data_type, desc)| ColumnDescriptor::new(*name, *data_type, *desc))
            .collect(),
    )
}

/// 合并数据库注释与业务描述
///
/// 非空的数据库注释优先；其次是业务描述；都没有时使用原始类型。
pub fn merge_comment(name: &str, data_type: &str, db_comment: &str) -> String {
    let db_comment = db_comment.trim();
    if !db_comment.is_empty() {
        return db_comment.to_string();
    }

    match business_description(name) {
        Some(desc) => desc.to_string(),
        None => data_type.to_string(),
    }
}
