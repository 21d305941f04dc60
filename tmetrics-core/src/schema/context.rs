//! 面向提示词层的 schema 序列化

use super::catalog;
use super::types::{ConnectionInfo, FallbackReason, SchemaResolution, SchemaResult, SchemaSource};
use crate::constants::metrics_table;
use crate::error::Result;
use serde::{Serialize, Serializer};

/// 提示词使用的表结构上下文
///
/// `columns` 序列化为按列顺序排列的 `{列名: "<type> - <comment>"}`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaContext {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_ordered_map")]
    pub columns: Vec<(String, String)>,
    pub constraints: Vec<String>,
    pub source: SchemaSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackNote {
    pub kind: &'static str,
    pub message: String,
}

impl From<&FallbackReason> for FallbackNote {
    fn from(reason: &FallbackReason) -> Self {
        Self {
            kind: reason.kind(),
            message: reason.to_string(),
        }
    }
}

impl SchemaContext {
    pub fn from_resolution(resolution: &SchemaResolution) -> Self {
        let mut context = Self::from_schema(resolution.schema());
        context.fallback_reason = resolution.fallback_reason().map(FallbackNote::from);
        context
    }

    pub fn from_schema(schema: &SchemaResult) -> Self {
        let (error, supported_tables) = if schema.is_unsupported() {
            (
                Some(format!("No static schema available for {}", schema.table_name)),
                catalog::supported_tables()
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
            )
        } else {
            (None, Vec::new())
        };

        Self {
            table_name: schema.table_name.clone(),
            description: table_description(&schema.table_name),
            columns: schema
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.describe()))
                .collect(),
            constraints: constraints(),
            source: schema.source,
            connection_info: schema.connection_info.clone(),
            fallback_reason: None,
            error,
            supported_tables,
        }
    }

    pub fn column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 表的约束、查询模式和常用函数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryGuide {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub constraints: Vec<String>,
    pub query_patterns: Vec<String>,
    pub common_functions: Vec<String>,
}

impl QueryGuide {
    pub fn for_table(table_name: &str) -> Self {
        let localize = |items: &[&str]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.replace(metrics_table::TABLE_NAME, table_name))
                .collect()
        };

        Self {
            table_name: table_name.to_string(),
            description: table_description(table_name),
            constraints: constraints(),
            query_patterns: localize(metrics_table::QUERY_PATTERNS),
            common_functions: localize(metrics_table::COMMON_FUNCTIONS),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 只有内置目录中的表才有描述
fn table_description(table_name: &str) -> Option<String> {
    catalog::is_supported(table_name).then(|| metrics_table::DESCRIPTION.to_string())
}

fn constraints() -> Vec<String> {
    metrics_table::CONSTRAINTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn serialize_ordered_map<S>(
    entries: &[(String, String)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}
