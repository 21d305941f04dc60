use super::types::FallbackReason;
use crate::config::TimeplusConfig;
use async_trait::async_trait;

pub type DriverResult<T> = std::result::Result<T, FallbackReason>;

/// 数据库返回的原始列元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub comment: String,
}

impl RawColumn {
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
}

/// 数据库驱动：每次解析打开一个新连接
#[async_trait]
pub trait SchemaDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&self, config: &TimeplusConfig) -> DriverResult<Box<dyn SchemaConnection>>;
}

/// 单次解析期间持有的连接，drop 即释放
#[async_trait]
pub trait SchemaConnection: Send {
    /// `SELECT 1` 存活探测
    async fn ping(&mut self) -> DriverResult<()>;

    /// 查询 system.columns，按列位置排序
    async fn query_columns(&mut self, database: &str, table: &str) -> DriverResult<Vec<RawColumn>>;

    /// `DESCRIBE <database>.<table>`
    async fn describe_table(&mut self, database: &str, table: &str)
    -> DriverResult<Vec<RawColumn>>;
}
