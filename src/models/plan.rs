//! 工作计划
//!
//! 一次运行的完整执行意图，在提交任何页面之前确定，之后不再修改

use serde::{Deserialize, Serialize};

use crate::models::document::DocumentReference;
use crate::models::output::OutputConfig;
use crate::models::prompt::PromptConfig;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// 单个文档，用户显式选择页码
    Single,
    /// 多个文档，每个文档处理全部页面
    Batch,
}

/// 一个文档及其要处理的页码（升序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub document: DocumentReference,
    pub pages: Vec<u32>,
}

/// 工作计划
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPlan {
    mode: RunMode,
    prompt: PromptConfig,
    entries: Vec<PlanEntry>,
    output: OutputConfig,
}

impl WorkPlan {
    /// 只能由输入解析器构造，调用方负责保证不变量
    pub(crate) fn new(
        mode: RunMode,
        prompt: PromptConfig,
        entries: Vec<PlanEntry>,
        output: OutputConfig,
    ) -> Self {
        Self {
            mode,
            prompt,
            entries,
            output,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn prompt(&self) -> &PromptConfig {
        &self.prompt
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn documents_total(&self) -> usize {
        self.entries.len()
    }

    /// 所有文档的页数之和
    pub fn total_pages(&self) -> usize {
        self.entries.iter().map(|e| e.pages.len()).sum()
    }
}
