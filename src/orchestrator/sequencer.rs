//! 单文档页面调度器 - 编排层
//!
//! ## 职责
//!
//! 为一个文档创建任务，然后严格按页码升序逐页提交，一次只有一个请求在途。
//!
//! ## 状态
//!
//! ```text
//! Idle ──创建任务──▶ Running ──最后一页成功──▶ Completed
//!                       │
//!                       └──任意一页失败/取消──▶ Failed
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::clients::{JobRequest, ProcessingApi};
use crate::error::{AppError, AppResult};
use crate::models::{FinalizationHints, OutputConfig, PageResult, PlanEntry, PromptConfig};
use crate::services::PageExecutor;
use crate::workflow::{CancelFlag, PageCtx, ProgressTracker};

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// 本次运行已累积的结果，失败时原样交给调用方
#[derive(Debug, Default)]
pub struct RunRecord {
    pub page_results: Vec<PageResult>,
    pub job_ids: Vec<String>,
}

/// 一个文档的调度输入
pub struct DocumentRun<'a> {
    pub entry: &'a PlanEntry,
    pub prompt: &'a PromptConfig,
    pub output: &'a OutputConfig,
    /// 文档序号（从1开始）
    pub document_index: usize,
    pub documents_total: usize,
    /// 批量模式下由汇总步骤统一交付
    pub batch_member: bool,
}

/// 单文档页面调度器
pub struct Sequencer {
    api: Arc<dyn ProcessingApi>,
    executor: PageExecutor,
    cancel: CancelFlag,
    state: SequencerState,
}

impl Sequencer {
    pub fn new(api: Arc<dyn ProcessingApi>, cancel: CancelFlag) -> Self {
        Self {
            executor: PageExecutor::new(api.clone()),
            api,
            cancel,
            state: SequencerState::Idle,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// 处理一个文档的全部所选页面
    ///
    /// # 返回
    /// 最后一页携带的交付提示
    pub async fn run(
        &mut self,
        doc: &DocumentRun<'_>,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<Option<FinalizationHints>> {
        let result = self.drive(doc, record, progress).await;
        self.state = match &result {
            Ok(_) => SequencerState::Completed,
            Err(_) => SequencerState::Failed,
        };
        result
    }

    async fn drive(
        &mut self,
        doc: &DocumentRun<'_>,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<Option<FinalizationHints>> {
        let name = doc.entry.document.name.as_str();
        let pages = &doc.entry.pages;
        let prefix = format!("[文档 {}/{}]", doc.document_index, doc.documents_total);

        progress.start_document(doc.document_index, name, pages.len());
        info!("{} 开始处理: {} ({} 页)", prefix, name, pages.len());

        let job_id = self.create_job(doc).await.map_err(|e| {
            error!("{} ❌ 创建任务失败: {}", prefix, e);
            e
        })?;
        info!("{} ✓ 任务已创建: {}", prefix, job_id);
        record.job_ids.push(job_id.clone());
        self.state = SequencerState::Running;

        let mut hints = None;
        for (index, &page) in pages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("{} ⏹ 收到取消请求，停止提交", prefix);
                return Err(AppError::Cancelled {
                    pages_done: record.page_results.len(),
                });
            }

            let ctx = PageCtx {
                job_id: job_id.clone(),
                document_index: doc.document_index,
                documents_total: doc.documents_total,
                document_name: name.to_string(),
                page,
                position: index + 1,
                pages_total: pages.len(),
            };

            let submission = self.executor.submit_page(&ctx).await.map_err(|e| {
                error!("{} ❌ 处理失败: {}", ctx, e);
                e
            })?;
            info!("{} ✓ 完成", ctx);

            record.page_results.push(submission.result);
            progress.record_page(page);

            if submission.is_last_page {
                hints = submission.hints;
            }
        }

        info!("{} ✅ 文档处理完成", prefix);
        Ok(hints)
    }

    async fn create_job(&self, doc: &DocumentRun<'_>) -> AppResult<String> {
        let document = &doc.entry.document;
        let request = JobRequest {
            prompt: doc.prompt.clone(),
            file_id: document.id.clone(),
            selected_pages: doc.entry.pages.clone(),
            output: doc.output.clone(),
            document_name: document.name.clone(),
            document_stem: document.stem.clone(),
            batch_member: doc.batch_member,
        };

        self.api
            .create_job(&request)
            .await
            .map_err(|e| AppError::job_creation_failed(&document.name, e))
    }
}
