//! 运行器 - 编排层入口
//!
//! 一次运行：计划 → {Sequencer | BatchCoordinator} → Finalizer → OutputResolver。
//! 任何致命错误都立即终止运行，并连同已累积的结果一起返回。

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::clients::ProcessingApi;
use crate::error::{AppError, AppResult};
use crate::models::{Deliverable, PageResult, RunMode, RunOutcome, WorkPlan};
use crate::orchestrator::batch_coordinator::BatchCoordinator;
use crate::orchestrator::sequencer::{DocumentRun, RunRecord, Sequencer};
use crate::services::{DownloadWriter, Finalizer, OutputResolver};
use crate::workflow::{CancelFlag, ProgressTracker, RunProgress};

/// 成功运行的报告
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub page_results: Vec<PageResult>,
    pub progress: RunProgress,
    pub job_ids: Vec<String>,
}

/// 失败的运行：终止错误以及失败前已累积的状态
#[derive(Debug, Error)]
#[error("运行失败 [{}]: 已完成 {} 页", .error.kind(), .page_results.len())]
pub struct RunFailure {
    #[source]
    pub error: AppError,
    pub page_results: Vec<PageResult>,
    pub progress: RunProgress,
    pub job_ids: Vec<String>,
}

/// 文档处理编排器
pub struct Orchestrator {
    api: Arc<dyn ProcessingApi>,
    download_dir: PathBuf,
    cancel: CancelFlag,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ProcessingApi>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            download_dir: download_dir.into(),
            cancel: CancelFlag::new(),
        }
    }

    /// 使用外部提供的取消标记
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 执行一次完整运行
    ///
    /// 进度在开始时重置，之后只由本次运行写入
    pub async fn run(
        &self,
        plan: &WorkPlan,
        progress: &mut ProgressTracker,
    ) -> Result<RunReport, RunFailure> {
        progress.reset(plan);
        let mut record = RunRecord::default();

        match self.execute(plan, &mut record, progress).await {
            Ok(outcome) => {
                progress.finish();
                info!("🎉 {}", outcome.message());
                Ok(RunReport {
                    outcome,
                    page_results: record.page_results,
                    progress: progress.snapshot(),
                    job_ids: record.job_ids,
                })
            }
            Err(error) => {
                error!("❌ 运行终止 [{}]: {}", error.kind(), error);
                progress.fail(&error);
                Err(RunFailure {
                    error,
                    page_results: record.page_results,
                    progress: progress.snapshot(),
                    job_ids: record.job_ids,
                })
            }
        }
    }

    async fn execute(
        &self,
        plan: &WorkPlan,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<RunOutcome> {
        let deliverable = match plan.mode() {
            RunMode::Single => self.run_single(plan, record, progress).await?,
            RunMode::Batch => self.run_batch(plan, record, progress).await?,
        };

        let resolver = OutputResolver::new(
            self.api.clone(),
            DownloadWriter::new(self.download_dir.clone()),
        );
        resolver.resolve(&deliverable, plan.output()).await
    }

    /// 单文档：交付信息来自最后一页，不需要额外的汇总请求
    async fn run_single(
        &self,
        plan: &WorkPlan,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<Deliverable> {
        let entry = plan
            .entries()
            .first()
            .ok_or_else(|| AppError::invalid_selection("工作计划中没有文档"))?;

        let doc = DocumentRun {
            entry,
            prompt: plan.prompt(),
            output: plan.output(),
            document_index: 1,
            documents_total: 1,
            batch_member: false,
        };

        let hints = Sequencer::new(self.api.clone(), self.cancel.clone())
            .run(&doc, record, progress)
            .await?;

        Finalizer::from_last_page(hints, plan.output())
    }

    async fn run_batch(
        &self,
        plan: &WorkPlan,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<Deliverable> {
        let job_ids = BatchCoordinator::new(self.api.clone(), self.cancel.clone())
            .run(plan, record, progress)
            .await?;

        Finalizer::new(self.api.clone())
            .finalize_batch(&job_ids, plan.output())
            .await
    }
}
