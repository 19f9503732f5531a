//! 日志工具模块

use std::fs;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者（默认 info，可用 RUST_LOG 覆盖）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str, category_name: &str) -> Result<()> {
    let log_header = format!(
        "{}\n地点抓取日志（{}）- {}\n{}\n\n",
        "=".repeat(60),
        category_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}
