//! 基于 ClickHouse 兼容 HTTP 接口的 Timeplus/Proton 驱动
//!
//! SQL 作为请求体 POST，参数通过 `param_<name>` 传递，结果使用 `FORMAT JSON`。

use super::driver::{DriverResult, RawColumn, SchemaConnection, SchemaDriver};
use super::types::FallbackReason;
use crate::config::TimeplusConfig;
use crate::constants::timeplus::headers;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const PING_SQL: &str = "SELECT 1";

const COLUMNS_SQL: &str = "SELECT name, type, comment FROM system.columns \
     WHERE database = {database:String} AND table = {table:String} \
     ORDER BY position FORMAT JSON";

const DESCRIBE_SQL: &str = "DESCRIBE TABLE {database:Identifier}.{table:Identifier} FORMAT JSON";

/// HTTP 驱动
#[derive(Debug, Clone, Default)]
pub struct HttpDriver;

impl HttpDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaDriver for HttpDriver {
    fn name(&self) -> &str {
        "http"
    }

    async fn connect(&self, config: &TimeplusConfig) -> DriverResult<Box<dyn SchemaConnection>> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| FallbackReason::driver_unavailable(format!("HTTP 客户端创建失败: {e}")))?;

        Ok(Box::new(HttpConnection {
            client,
            endpoint: format!("http://{}:{}/", config.host, config.port),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
        }))
    }
}

/// 单次解析使用的 HTTP 连接
pub struct HttpConnection {
    client: Client,
    endpoint: String,
    user: String,
    password: String,
    database: String,
}

impl HttpConnection {
    async fn execute(&self, sql: &str, params: &[(&str, &str)]) -> DriverResult<String> {
        let mut query = vec![("database".to_string(), self.database.clone())];
        query.extend(
            params
                .iter()
                .map(|(k, v)| (format!("param_{k}"), (*v).to_string())),
        );

        debug!("执行查询: {}", sql);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&query)
            .header(headers::USER, &self.user)
            .header(headers::KEY, &self.password)
            .body(sql.to_string())
            .send()
            .await
            .map_err(|e| FallbackReason::connection(format!("{} 请求失败: {e}", self.endpoint)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FallbackReason::connection(format!("读取响应失败: {e}")))?;

        if !status.is_success() {
            return Err(FallbackReason::connection(format!(
                "{status} - {}",
                text.trim()
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl SchemaConnection for HttpConnection {
    async fn ping(&mut self) -> DriverResult<()> {
        self.execute(PING_SQL, &[]).await.map(|_| ())
    }

    async fn query_columns(&mut self, database: &str, table: &str) -> DriverResult<Vec<RawColumn>> {
        let body = self
            .execute(COLUMNS_SQL, &[("database", database), ("table", table)])
            .await?;
        parse_json_rows(&body)
    }

    async fn describe_table(
        &mut self,
        database: &str,
        table: &str,
    ) -> DriverResult<Vec<RawColumn>> {
        let body = self
            .execute(DESCRIBE_SQL, &[("database", database), ("table", table)])
            .await?;
        parse_json_rows(&body)
    }
}

#[derive(Debug, Deserialize)]
struct JsonResponse {
    data: Vec<serde_json::Map<String, Value>>,
}

/// 解析 `FORMAT JSON` 响应中的 name / type / comment
pub(crate) fn parse_json_rows(body: &str) -> DriverResult<Vec<RawColumn>> {
    let response: JsonResponse = serde_json::from_str(body)
        .map_err(|e| FallbackReason::malformed(format!("响应不是合法的 JSON: {e}")))?;

    let mut columns = Vec::with_capacity(response.data.len());
    for (idx, row) in response.data.iter().enumerate() {
        let field = |key: &str| row.get(key).and_then(Value::as_str);

        let name = field("name")
            .ok_or_else(|| FallbackReason::malformed(format!("第 {} 行缺少 name", idx + 1)))?;
        let data_type = field("type")
            .ok_or_else(|| FallbackReason::malformed(format!("第 {} 行缺少 type", idx + 1)))?;
        let comment = field("comment").unwrap_or_default();

        columns.push(RawColumn::new(name, data_type, comment));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns_response() {
        let body = r#"{
            "meta": [{"name": "name", "type": "string"}, {"name": "type", "type": "string"}, {"name": "comment", "type": "string"}],
            "data": [
                {"name": "event_ts", "type": "uint64", "comment": ""},
                {"name": "metric", "type": "string", "comment": "指标名"}
            ],
            "rows": 2
        }"#;

        let columns = parse_json_rows(body).unwrap();
        assert_eq!(
            columns,
            vec![
                RawColumn::new("event_ts", "uint64", ""),
                RawColumn::new("metric", "string", "指标名"),
            ]
        );
    }

    #[test]
    fn test_parse_describe_response() {
        // DESCRIBE 返回更多字段，只取需要的三个
        let body = r#"{"data": [
            {"name": "value", "type": "string", "default_type": "", "default_expression": "", "comment": "", "codec_expression": "", "ttl_expression": ""}
        ]}"#;

        let columns = parse_json_rows(body).unwrap();
        assert_eq!(columns, vec![RawColumn::new("value", "string", "")]);
    }

    #[test]
    fn test_parse_empty_data() {
        let columns = parse_json_rows(r#"{"data": [], "rows": 0}"#).unwrap();
        assert!(columns.is_empty());
    }

    #[test]
    fn test_parse_malformed_rows() {
        let missing_type = r#"{"data": [{"name": "metric", "comment": ""}]}"#;
        assert!(matches!(
            parse_json_rows(missing_type),
            Err(FallbackReason::MalformedRow(_))
        ));

        let not_json = "Code: 60. DB::Exception: Table default.t_metrics doesn't exist";
        assert!(matches!(
            parse_json_rows(not_json),
            Err(FallbackReason::MalformedRow(_))
        ));
    }
}
