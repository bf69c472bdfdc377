/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs;
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::WorkPlan;
use crate::workflow::RunProgress;

/// 初始化日志订阅器
///
/// 设置了 `RUST_LOG` 时以其为准，否则为 `info`（详细模式为 `debug`）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（如测试中）时忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一行到日志文件
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档逐页处理模式");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!("📁 下载目录: {}", config.download_dir);
    info!("{}", "=".repeat(60));
}

/// 记录工作计划
pub fn log_plan(plan: &WorkPlan) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📋 工作计划: {:?} 模式, {} 个文档, 共 {} 页",
        plan.mode(),
        plan.documents_total(),
        plan.total_pages()
    );
    for (index, entry) in plan.entries().iter().enumerate() {
        info!(
            "  [文档 {}] {} ({} 页)",
            index + 1,
            entry.document.name,
            entry.pages.len()
        );
    }
    info!("🤖 模型: {}, 温度: {}", plan.prompt().model, plan.prompt().temperature);
    info!("📤 输出: {}", plan.output());
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `progress`: 运行结束时的进度
/// - `outcome`: 最终结果描述（成功消息或错误）
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(progress: &RunProgress, outcome: &str, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📄 文档: {}/{}",
        progress.current_document_index, progress.documents_total
    );
    info!(
        "✅ 页面: {}/{} ({}%)",
        progress.overall_pages_done,
        progress.overall_pages_total,
        progress.percent()
    );
    info!("📌 结果: {}", outcome);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本，被截断时以 `...` 结尾
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("short", 200), "short");
    }

    #[test]
    fn log_file_gets_header_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_log.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_log_line(path, "完成 3/3 页").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("文档处理日志"));
        assert!(content.trim_end().ends_with("完成 3/3 页"));
    }
}
