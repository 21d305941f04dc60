use crate::constants::{metrics_table, model, timeplus};
use crate::error::{AgentError, Result};
use crate::schema::ConnectionInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub timeplus: TimeplusConfig,
}

/// 模型配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// anthropic, openai, groq
    pub provider: String,
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Timeplus/Proton 连接配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimeplusConfig {
    pub host: String,
    /// ClickHouse 兼容 HTTP 接口端口
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: model::DEFAULT_PROVIDER.to_string(),
            model_id: model::DEFAULT_MODEL_ID.to_string(),
            api_key: None,
            api_url: None,
            temperature: model::DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

impl Default for TimeplusConfig {
    fn default() -> Self {
        Self {
            host: timeplus::DEFAULT_HOST.to_string(),
            port: timeplus::DEFAULT_PORT,
            user: timeplus::DEFAULT_USER.to_string(),
            password: String::new(),
            database: timeplus::DEFAULT_DATABASE.to_string(),
            table: metrics_table::TABLE_NAME.to_string(),
            timeout_secs: timeplus::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// 加载配置：配置文件存在时读取文件，否则读取环境变量
    pub fn find_and_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("找到配置文件: {}", path.display());
            return Self::load_from_file(path);
        }

        tracing::debug!("未找到配置文件 {}，从环境变量读取配置", path.display());
        Ok(Self::from_env())
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AgentError::ConfigNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// 从进程环境变量读取配置
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，未设置或无法解析的值保留默认值
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let model = &mut config.model;
        if let Some(v) = lookup("AGENT_MODEL_PROVIDER") {
            model.provider = v;
        }
        if let Some(v) = lookup("AGENT_MODEL_ID") {
            model.model_id = v;
        }
        model.api_key = lookup("AGENT_API_KEY").filter(|v| !v.is_empty());
        model.api_url = lookup("AGENT_API_URL").filter(|v| !v.is_empty());
        if let Some(v) = parse_var(&lookup, "AGENT_TEMPERATURE") {
            model.temperature = v;
        }
        model.max_tokens = parse_var(&lookup, "AGENT_MAX_TOKENS");

        let tp = &mut config.timeplus;
        if let Some(v) = lookup("TIMEPLUS_HOST") {
            tp.host = v;
        }
        if let Some(v) = parse_var(&lookup, "TIMEPLUS_PORT") {
            tp.port = v;
        }
        if let Some(v) = lookup("TIMEPLUS_USER") {
            tp.user = v;
        }
        if let Some(v) = lookup("TIMEPLUS_PASSWORD") {
            tp.password = v;
        }
        if let Some(v) = lookup("TIMEPLUS_DATABASE") {
            tp.database = v;
        }
        if let Some(v) = lookup("TIMEPLUS_TABLE") {
            tp.table = v;
        }
        if let Some(v) = parse_var(&lookup, "TIMEPLUS_TIMEOUT_SECS") {
            tp.timeout_secs = v;
        }

        config
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("环境变量 {key} 的值无法解析: {raw}，使用默认值");
            None
        }
    }
}

impl ModelConfig {
    /// 检查模型提供商是否受支持
    pub fn validate(&self) -> Result<()> {
        let provider = self.provider.to_lowercase();
        if model::SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            Ok(())
        } else {
            Err(AgentError::unsupported_provider(&self.provider))
        }
    }
}

impl TimeplusConfig {
    /// 连接参数是否完整
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && self.port != 0 && !self.database.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
        }
    }
}

fn mask(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "已设置",
        _ => "未设置",
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.model;
        writeln!(f, "模型配置:")?;
        writeln!(f, "  提供商: {}", m.provider)?;
        writeln!(f, "  模型ID: {}", m.model_id)?;
        writeln!(f, "  API密钥: {}", mask(m.api_key.as_deref()))?;
        writeln!(f, "  API URL: {}", m.api_url.as_deref().unwrap_or("默认"))?;
        writeln!(f, "  温度: {}", m.temperature)?;
        match m.max_tokens {
            Some(n) => writeln!(f, "  最大Token: {n}")?,
            None => writeln!(f, "  最大Token: 默认")?,
        }

        let tp = &self.timeplus;
        writeln!(f, "\nTimeplus配置:")?;
        writeln!(f, "  主机: {}:{}", tp.host, tp.port)?;
        writeln!(f, "  用户: {}", tp.user)?;
        writeln!(f, "  密码: {}", mask(Some(tp.password.as_str())))?;
        writeln!(f, "  数据库: {}", tp.database)?;
        writeln!(f, "  表名: {}", tp.table)?;
        writeln!(f, "  超时: {}s", tp.timeout_secs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.provider, "anthropic");
        assert_eq!(config.timeplus.host, "localhost");
        assert_eq!(config.timeplus.port, 8123);
        assert_eq!(config.timeplus.table, "t_metrics");
        assert!(config.timeplus.is_complete());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tmetrics.toml");

        let mut config = AppConfig::default();
        config.timeplus.host = "proton.internal".to_string();
        config.timeplus.password = "secret".to_string();
        config.model.max_tokens = Some(2048);
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tmetrics.toml");
        fs::write(&path, "[timeplus]\nhost = \"10.0.0.5\"\n").unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.timeplus.host, "10.0.0.5");
        assert_eq!(loaded.timeplus.port, 8123);
        assert_eq!(loaded.timeplus.database, "default");
        assert_eq!(loaded.model, ModelConfig::default());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tmetrics.toml");
        fs::write(&path, "[timeplus\nhost = ").unwrap();

        let result = AppConfig::find_and_load(&path);
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let result = AppConfig::load_from_file(&path);
        assert!(matches!(result, Err(AgentError::ConfigNotFound(_))));
    }

    #[test]
    fn test_from_env_with() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("AGENT_MODEL_PROVIDER", "groq"),
            ("AGENT_MAX_TOKENS", "1024"),
            ("TIMEPLUS_HOST", "timeplus.local"),
            ("TIMEPLUS_PORT", "not-a-port"),
            ("TIMEPLUS_DATABASE", "metrics"),
            ("TIMEPLUS_TIMEOUT_SECS", "2"),
        ]);
        let config = AppConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.model.provider, "groq");
        assert_eq!(config.model.max_tokens, Some(1024));
        assert_eq!(config.model.api_key, None);
        assert_eq!(config.timeplus.host, "timeplus.local");
        // 无法解析的端口保留默认值
        assert_eq!(config.timeplus.port, 8123);
        assert_eq!(config.timeplus.database, "metrics");
        assert_eq!(config.timeplus.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_validate_provider() {
        let mut model = ModelConfig::default();
        assert!(model.validate().is_ok());
        model.provider = "OpenAI".to_string();
        assert!(model.validate().is_ok());
        model.provider = "mistral".to_string();
        assert!(matches!(
            model.validate(),
            Err(AgentError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn test_incomplete_connection_params() {
        let mut tp = TimeplusConfig::default();
        tp.host = "  ".to_string();
        assert!(!tp.is_complete());

        let mut tp = TimeplusConfig::default();
        tp.port = 0;
        assert!(!tp.is_complete());
    }

    #[test]
    fn test_display_masks_secrets() {
        let mut config = AppConfig::default();
        config.model.api_key = Some("sk-very-secret".to_string());
        config.timeplus.password = "hunter2".to_string();
        let shown = config.to_string();
        assert!(!shown.contains("sk-very-secret"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("已设置"));
    }
}
