//! 运行进度
//!
//! 只有编排层写入进度；观察者通过 watch 通道拿到每次变化后的快照

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

use crate::error::AppError;
use crate::models::plan::WorkPlan;

/// 运行状态（用于展示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Processing,
    Completed,
    Error,
}

/// 运行进度快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunProgress {
    pub documents_total: usize,
    /// 当前文档序号（从1开始，未开始时为0）
    pub current_document_index: usize,
    pub current_document_name: String,
    pub current_document_pages_total: usize,
    pub current_document_pages_done: usize,
    pub overall_pages_total: usize,
    pub overall_pages_done: usize,
    /// 最近一个完成的页码
    pub last_page: Option<u32>,
    pub finished: bool,
    pub terminal_error: Option<String>,
}

impl RunProgress {
    /// 总体完成百分比，四舍五入且不超过 100
    pub fn percent(&self) -> u8 {
        if self.overall_pages_total == 0 {
            return 0;
        }
        let pct = (self.overall_pages_done as f64 / self.overall_pages_total as f64 * 100.0).round();
        pct.min(100.0) as u8
    }

    pub fn status(&self) -> RunStatus {
        if self.terminal_error.is_some() {
            RunStatus::Error
        } else if self.finished
            || (self.overall_pages_total > 0 && self.overall_pages_done == self.overall_pages_total)
        {
            RunStatus::Completed
        } else {
            RunStatus::Processing
        }
    }
}

/// 进度跟踪器
pub struct ProgressTracker {
    state: RunProgress,
    tx: watch::Sender<RunProgress>,
}

impl ProgressTracker {
    pub fn new() -> (Self, watch::Receiver<RunProgress>) {
        let (tx, rx) = watch::channel(RunProgress::default());
        (
            Self {
                state: RunProgress::default(),
                tx,
            },
            rx,
        )
    }

    /// 新的观察者
    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> RunProgress {
        self.state.clone()
    }

    /// 开始新的运行：清空上一轮状态，总页数取自计划
    pub fn reset(&mut self, plan: &WorkPlan) {
        self.state = RunProgress {
            documents_total: plan.documents_total(),
            overall_pages_total: plan.total_pages(),
            ..Default::default()
        };
        self.publish();
    }

    /// 切换到下一个文档
    pub fn start_document(&mut self, index: usize, name: &str, pages_total: usize) {
        self.state.current_document_index = index;
        self.state.current_document_name = name.to_string();
        self.state.current_document_pages_total = pages_total;
        self.state.current_document_pages_done = 0;
        self.publish();
    }

    /// 记录一页完成
    pub fn record_page(&mut self, page: u32) {
        if self.state.overall_pages_done >= self.state.overall_pages_total {
            warn!(
                "进度已达总页数 {}，忽略第 {} 页的计数",
                self.state.overall_pages_total, page
            );
        } else {
            self.state.overall_pages_done += 1;
        }
        if self.state.current_document_pages_done < self.state.current_document_pages_total {
            self.state.current_document_pages_done += 1;
        }
        self.state.last_page = Some(page);
        self.publish();
    }

    pub fn fail(&mut self, error: &AppError) {
        self.state.terminal_error = Some(format!("{}: {}", error.kind(), error));
        self.publish();
    }

    pub fn finish(&mut self) {
        self.state.finished = true;
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}
