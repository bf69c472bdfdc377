//! 命令行应用
//!
//! 读取配置和运行请求，检查服务，生成工作计划并执行，最后输出结果和统计。

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::{HttpServiceClient, ProcessingApi};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{load_run_request, RunOutcome};
use crate::orchestrator::Orchestrator;
use crate::services::InputResolver;
use crate::utils::logging::{
    append_log_line, init_log_file, log_plan, log_startup, print_final_stats,
};
use crate::workflow::{CancelFlag, ProgressTracker, RunProgress};

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn ProcessingApi>,
}

impl App {
    /// 初始化应用：日志文件、HTTP 客户端、服务健康检查
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let client = HttpServiceClient::new(&config)?;
        let health = client
            .health()
            .await
            .map_err(|e| AppError::ingestion_failed(client.base_url(), e))?;
        info!("✓ 服务可用: {} {}", health.status, health.message);

        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// 使用给定的服务实现创建应用（不做健康检查）
    pub fn with_api(config: Config, api: Arc<dyn ProcessingApi>) -> Self {
        Self { config, api }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunOutcome> {
        info!("\n📁 正在读取运行请求: {}", self.config.run_file);
        let request = load_run_request(Path::new(&self.config.run_file)).await?;

        let plan = InputResolver::new(self.api.clone()).resolve(&request).await?;
        log_plan(&plan);

        let (mut tracker, rx) = ProgressTracker::new();
        let observer = spawn_progress_logger(rx, self.config.output_log_file.clone());

        let cancel = CancelFlag::new();
        let ctrl_c = spawn_ctrl_c_handler(cancel.clone());

        let orchestrator = Orchestrator::new(self.api.clone(), &self.config.download_dir)
            .with_cancel_flag(cancel);
        let result = orchestrator.run(&plan, &mut tracker).await;

        ctrl_c.abort();
        // 关闭发送端，观察者随之退出
        drop(tracker);
        if let Err(e) = observer.await {
            debug!("进度观察任务异常结束: {}", e);
        }

        match result {
            Ok(report) => {
                let message = report.outcome.message();
                self.finish_log(&report.progress, &message);
                Ok(report.outcome)
            }
            Err(failure) => {
                let message = format!("{}: {}", failure.error.kind(), failure.error);
                self.finish_log(&failure.progress, &message);
                Err(failure.into())
            }
        }
    }

    fn finish_log(&self, progress: &RunProgress, message: &str) {
        print_final_stats(progress, message, &self.config.output_log_file);
        if let Err(e) = append_log_line(&self.config.output_log_file, message) {
            warn!("⚠️ 写入日志文件失败: {}", e);
        }
    }
}

/// 观察进度变化并输出到日志
fn spawn_progress_logger(mut rx: watch::Receiver<RunProgress>, log_file: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_done = 0;
        while rx.changed().await.is_ok() {
            let progress = rx.borrow_and_update().clone();
            if progress.overall_pages_done == last_done {
                continue;
            }
            last_done = progress.overall_pages_done;

            let line = format!(
                "[文档 {}/{}] {} 第 {} 页完成 ({}/{}, 总进度 {}%)",
                progress.current_document_index,
                progress.documents_total,
                progress.current_document_name,
                progress.last_page.unwrap_or_default(),
                progress.current_document_pages_done,
                progress.current_document_pages_total,
                progress.percent()
            );
            info!("📈 {}", line);
            if let Err(e) = append_log_line(&log_file, &line) {
                debug!("写入日志文件失败: {}", e);
            }
        }
    })
}

/// Ctrl-C 时设置取消标记，当前页完成后停止
fn spawn_ctrl_c_handler(cancel: CancelFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⏹ 收到中断信号，当前页完成后停止");
            cancel.cancel();
        }
    })
}
