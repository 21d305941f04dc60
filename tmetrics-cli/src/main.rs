use clap::Parser;
use tmetrics_cli::project_info::get_version_string;
use tmetrics_cli::{Cli, CliApp, Commands, ConfigCommand, run_config_init, setup_logging};
use tmetrics_core::AgentError;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    setup_logging(cli.verbose);
    debug!("{}", get_version_string());

    // `config init` 是特例，它不需要预先加载配置
    if let Commands::Config(ConfigCommand::Init { force }) = cli.command {
        if let Err(e) = run_config_init(&cli.config, force) {
            error!("❌ 初始化配置失败: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let app = match CliApp::new(&cli.config) {
        Ok(app) => app,
        Err(AgentError::UnsupportedProvider(provider)) => {
            error!("❌ 不支持的模型提供商: {}", provider);
            info!("👉 请检查 '{}' 中的 [model] provider", cli.config.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!("❌ 应用初始化失败: {}", e);
            info!("👉 可以运行 'tmetrics config init' 生成默认配置");
            std::process::exit(1);
        }
    };

    // 运行命令
    if let Err(e) = app.run(cli.command).await {
        error!("❌ 操作失败: {:#}", e);
        std::process::exit(1);
    }
}
