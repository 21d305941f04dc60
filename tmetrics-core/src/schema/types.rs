use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 表列描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub comment: String,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            comment: comment.into(),
        }
    }

    /// 面向提示词的描述："<type> - <comment>"，没有业务描述时只有类型
    pub fn describe(&self) -> String {
        if self.comment.is_empty() || self.comment == self.data_type {
            self.data_type.clone()
        } else {
            format!("{} - {}", self.data_type, self.comment)
        }
    }
}

/// Schema 来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Live,
    Fallback,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Live => write!(f, "live"),
            SchemaSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// 实时 schema 的连接信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub database: String,
}

/// 单次解析得到的表结构，每次请求重新构建，不缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResult {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub source: SchemaSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
}

impl SchemaResult {
    pub(crate) fn live(
        table_name: &str,
        columns: Vec<ColumnDescriptor>,
        connection_info: ConnectionInfo,
    ) -> Self {
        Self {
            table_name: table_name.to_string(),
            columns,
            source: SchemaSource::Live,
            connection_info: Some(connection_info),
        }
    }

    pub(crate) fn fallback(table_name: &str, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_name: table_name.to_string(),
            columns,
            source: SchemaSource::Fallback,
            connection_info: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// 回退且内置目录中没有该表
    pub fn is_unsupported(&self) -> bool {
        self.source == SchemaSource::Fallback && self.columns.is_empty()
    }
}

/// 实时 schema 获取失败的原因，全部在解析器内部被回退路径吸收
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    #[error("数据库驱动不可用: {0}")]
    DriverUnavailable(String),

    #[error("数据库连接失败: {0}")]
    ConnectionError(String),

    #[error("表 {0} 未查询到任何列")]
    EmptyResult(String),

    #[error("列元数据格式错误: {0}")]
    MalformedRow(String),
}

impl FallbackReason {
    pub fn driver_unavailable(msg: impl Into<String>) -> Self {
        Self::DriverUnavailable(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRow(msg.into())
    }

    /// 序列化用的短标签
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackReason::DriverUnavailable(_) => "driver_unavailable",
            FallbackReason::ConnectionError(_) => "connection_error",
            FallbackReason::EmptyResult(_) => "empty_result",
            FallbackReason::MalformedRow(_) => "malformed_row",
        }
    }
}

/// 解析结果：实时 schema，或附带原因的回退 schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaResolution {
    Live(SchemaResult),
    Fallback(SchemaResult, FallbackReason),
}

impl SchemaResolution {
    pub fn schema(&self) -> &SchemaResult {
        match self {
            SchemaResolution::Live(schema) | SchemaResolution::Fallback(schema, _) => schema,
        }
    }

    pub fn into_schema(self) -> SchemaResult {
        match self {
            SchemaResolution::Live(schema) | SchemaResolution::Fallback(schema, _) => schema,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            SchemaResolution::Live(_) => None,
            SchemaResolution::Fallback(_, reason) => Some(reason),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SchemaResolution::Live(_))
    }

    pub fn source(&self) -> SchemaSource {
        self.schema().source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_column() {
        let col = ColumnDescriptor::new("metric", "string", "Metric name identifier");
        assert_eq!(col.describe(), "string - Metric name identifier");

        let bare = ColumnDescriptor::new("extra", "float64", "float64");
        assert_eq!(bare.describe(), "float64");

        let empty = ColumnDescriptor::new("extra", "float64", "");
        assert_eq!(empty.describe(), "float64");
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&SchemaSource::Live).unwrap(),
            "\"live\""
        );
        assert_eq!(SchemaSource::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_resolution_accessors() {
        let schema = SchemaResult::fallback("t_metrics", Vec::new());
        let resolution =
            SchemaResolution::Fallback(schema.clone(), FallbackReason::connection("refused"));

        assert!(!resolution.is_live());
        assert_eq!(resolution.source(), SchemaSource::Fallback);
        assert_eq!(resolution.fallback_reason().map(|r| r.kind()), Some("connection_error"));
        assert!(resolution.schema().is_unsupported());
        assert_eq!(resolution.into_schema(), schema);
    }
}
