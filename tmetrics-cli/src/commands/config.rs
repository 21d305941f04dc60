use crate::app::CliApp;
use std::path::Path;
use tmetrics_core::config::AppConfig;
use tmetrics_core::error::Result;
use tracing::{info, warn};

/// 生成默认配置文件
pub fn run_config_init(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        warn!("⚠️  配置文件已存在: {}", path.display());
        info!("如果您要重新生成，请使用 --force 参数");
        return Ok(false);
    }

    AppConfig::default().save_to_file(path)?;
    info!("✅ 创建配置文件: {}", path.display());
    Ok(true)
}

/// 显示当前配置
pub fn run_config_show(app: &CliApp) -> Result<()> {
    if app.config_path.exists() {
        info!("📋 配置文件: {}", app.config_path.display());
    } else {
        info!("📋 配置来源: 环境变量（未找到 {}）", app.config_path.display());
    }
    print!("{}", app.config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_init_respects_force() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tmetrics.toml");

        assert!(run_config_init(&path, false).unwrap());
        std::fs::write(&path, "[timeplus]\nhost = \"custom\"\n").unwrap();

        // 已存在时不覆盖
        assert!(!run_config_init(&path, false).unwrap());
        let kept = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(kept.timeplus.host, "custom");

        assert!(run_config_init(&path, true).unwrap());
        let reset = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(reset, AppConfig::default());
    }
}
