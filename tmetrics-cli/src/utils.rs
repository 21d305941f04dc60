/// # T-Metrics CLI 日志系统
///
/// - 库代码只使用 `tracing` 宏，日志配置由 `main.rs` 调用 `setup_logging()` 决定
/// - 表结构和 SQL 检查结果通过标准输出打印，日志输出到标准错误
///
/// ## 日志配置选项
/// - `-v, --verbose`：启用 DEBUG 级别
/// - `RUST_LOG`：标准的 Rust 日志级别控制
/// - `TMETRICS_LOG_FILE`：日志文件路径，设置后日志输出到文件而非终端
///
/// ```bash
/// tmetrics schema
/// tmetrics -v schema t_metrics
/// TMETRICS_LOG_FILE=tmetrics.log tmetrics schema
/// RUST_LOG=tmetrics_core::schema=debug tmetrics schema
/// ```
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::env::var(LOG_FILE_ENV).ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eprintln!("无法打开日志文件 {path}: {e}，日志输出到终端"))
            .ok()
    });

    if let Some(file) = log_file {
        // 输出到文件 - 使用详细格式便于调试
        fmt()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .init();
    } else {
        // 输出到终端 - 写入标准错误，避免混入 JSON 输出
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .without_time()
            .compact()
            .init();
    }
}

const LOG_FILE_ENV: &str = "TMETRICS_LOG_FILE";
