//! 批量文档协调器 - 编排层
//!
//! ## 职责
//!
//! 按计划顺序逐个处理文档：每个文档创建任务并运行一次 `Sequencer`。
//! 文档之间不并发；任何一个文档失败，整批立即停止。

use std::sync::Arc;

use tracing::{error, info};

use crate::clients::ProcessingApi;
use crate::error::{AppError, AppResult};
use crate::models::WorkPlan;
use crate::orchestrator::sequencer::{DocumentRun, RunRecord, Sequencer};
use crate::workflow::{CancelFlag, ProgressTracker};

/// 批量文档协调器
pub struct BatchCoordinator {
    api: Arc<dyn ProcessingApi>,
    cancel: CancelFlag,
}

impl BatchCoordinator {
    pub fn new(api: Arc<dyn ProcessingApi>, cancel: CancelFlag) -> Self {
        Self { api, cancel }
    }

    /// 处理计划中的所有文档
    ///
    /// # 返回
    /// 按文档顺序排列的任务 ID
    pub async fn run(
        &self,
        plan: &WorkPlan,
        record: &mut RunRecord,
        progress: &mut ProgressTracker,
    ) -> AppResult<Vec<String>> {
        let total = plan.documents_total();
        log_batch_start(total, plan.total_pages());

        for (index, entry) in plan.entries().iter().enumerate() {
            let document_index = index + 1;

            if self.cancel.is_cancelled() {
                info!("⏹ 收到取消请求，跳过剩余 {} 个文档", total - index);
                return Err(AppError::Cancelled {
                    pages_done: record.page_results.len(),
                });
            }

            let doc = DocumentRun {
                entry,
                prompt: plan.prompt(),
                output: plan.output(),
                document_index,
                documents_total: total,
                batch_member: true,
            };

            let mut sequencer = Sequencer::new(self.api.clone(), self.cancel.clone());
            if let Err(e) = sequencer.run(&doc, record, progress).await {
                error!(
                    "[文档 {}/{}] ❌ {} 处理失败，终止批量处理: {}",
                    document_index, total, entry.document.name, e
                );
                return Err(e);
            }

            log_document_complete(
                document_index,
                total,
                &entry.document.stem,
                record.page_results.len(),
            );
        }

        Ok(record.job_ids.clone())
    }
}

// ========== 日志辅助函数 ==========

fn log_batch_start(documents: usize, pages: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量处理: {} 个文档, 共 {} 页", documents, pages);
    info!("{}", "=".repeat(60));
}

fn log_document_complete(index: usize, total: usize, stem: &str, pages_done: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {}/{} 个文档完成 (来源标记: {}), 累计 {} 页",
        index, total, stem, pages_done
    );
    info!("{}", "─".repeat(60));
}
