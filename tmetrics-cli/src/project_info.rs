//! T-Metrics CLI 项目信息模块
//!
//! tmetrics-core 作为内部库，只提供技术性常量

/// 项目元数据（自动从 Cargo.toml 同步）
pub mod metadata {
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// 用户友好的显示名称（手动维护，用于 UI 显示）
    pub mod display {
        pub const FRIENDLY_NAME: &str = "T-Metrics";

        /// 项目详细描述（比 Cargo.toml 中的描述更详细）
        pub const DESCRIPTION_LONG: &str = "为 t_metrics 文本转 SQL 智能体提供表结构上下文：优先读取 Timeplus/Proton 的实时表结构，不可用时回退到内置表结构，并检查生成的 SQL 是否只访问单表";
    }
}

/// 版本信息
pub mod version_info {
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{}",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION
    )
}
