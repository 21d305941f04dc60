// t_metrics 表结构解析
//
// 在请求时决定使用运行中 Timeplus/Proton 的实时表结构还是内置的静态表结构，
// 并将结果整理为提示词可直接使用的上下文。
//
// 主要组件：
// - SchemaResolver: 实时获取 + 回退，永不失败
// - SchemaDriver / SchemaConnection: 数据库访问接口
// - HttpDriver: ClickHouse 兼容 HTTP 接口的实现
// - SchemaContext / QueryGuide: 提示词层的序列化

pub mod catalog;
mod context;
mod driver;
#[cfg(feature = "http-driver")]
mod http_driver;
mod resolver;
mod types;

pub use context::{FallbackNote, QueryGuide, SchemaContext};
pub use driver::{DriverResult, RawColumn, SchemaConnection, SchemaDriver};
#[cfg(feature = "http-driver")]
pub use http_driver::{HttpConnection, HttpDriver};
pub use resolver::SchemaResolver;
pub use types::{
    ColumnDescriptor, ConnectionInfo, FallbackReason, SchemaResolution, SchemaResult,
    SchemaSource,
};
