/// 配置文件相关常量
pub mod config {
    /// 默认配置文件名（当前工作目录）
    pub const CONFIG_FILE_NAME: &str = "tmetrics.toml";
}

/// 模型相关默认值
pub mod model {
    /// 默认模型提供商
    pub const DEFAULT_PROVIDER: &str = "anthropic";

    /// 默认模型ID
    pub const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-20250514";

    /// 默认温度
    pub const DEFAULT_TEMPERATURE: f64 = 0.1;

    /// 支持的模型提供商
    pub const SUPPORTED_PROVIDERS: &[&str] = &["anthropic", "openai", "groq"];
}

/// Timeplus/Proton 连接相关默认值
pub mod timeplus {
    /// 默认主机
    pub const DEFAULT_HOST: &str = "localhost";

    /// 默认端口（ClickHouse 兼容的 HTTP 接口）
    pub const DEFAULT_PORT: u16 = 8123;

    /// 默认用户
    pub const DEFAULT_USER: &str = "default";

    /// 默认数据库
    pub const DEFAULT_DATABASE: &str = "default";

    /// 默认连接与请求超时（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// ClickHouse 兼容 HTTP 接口的认证头
    pub mod headers {
        pub const USER: &str = "X-ClickHouse-User";
        pub const KEY: &str = "X-ClickHouse-Key";
    }
}

/// t_metrics 表相关常量
pub mod metrics_table {
    /// 唯一允许查询的表
    pub const TABLE_NAME: &str = "t_metrics";

    /// 表描述
    pub const DESCRIPTION: &str =
        "Time-series metrics data table - ONLY TABLE ALLOWED FOR QUERIES";

    /// 无论 schema 来源都附带的查询约束
    pub const CONSTRAINTS: &[&str] = &[
        "SINGLE TABLE ONLY - No JOINs allowed",
        "No subqueries with other tables",
    ];

    /// Proton 常用查询模式
    pub const QUERY_PATTERNS: &[&str] = &[
        "Use to_float64(value) for numeric operations",
        "Use _tp_time for time-based filtering and windows",
        "Filter by metric field for specific metric types",
        "Use tagK/tagV pairs for dimension filtering",
        "Use table(t_metrics) for historical data analysis",
        "Use streaming queries for real-time monitoring",
    ];

    /// Proton 常用函数
    pub const COMMON_FUNCTIONS: &[&str] = &[
        "tumble(t_metrics, _tp_time, interval) - Non-overlapping windows",
        "hop(t_metrics, _tp_time, hop_size, window_size) - Sliding windows",
        "to_float64(value) - Convert string values to numbers",
        "now() - Current timestamp for time filters",
    ];
}
