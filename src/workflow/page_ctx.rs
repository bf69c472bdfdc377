//! 页面处理上下文
//!
//! 封装"我正在处理哪个文档的第几页"这一信息

use std::fmt::Display;

/// 页面处理上下文
#[derive(Debug, Clone)]
pub struct PageCtx {
    /// 任务ID
    pub job_id: String,

    /// 文档序号（从1开始，仅用于日志显示）
    pub document_index: usize,

    /// 文档总数
    pub documents_total: usize,

    /// 文档名称
    pub document_name: String,

    /// 页码
    pub page: u32,

    /// 该页在本文档页码列表中的位置（从1开始）
    pub position: usize,

    /// 本文档要处理的页数
    pub pages_total: usize,
}

impl PageCtx {
    /// 是否为本文档页码列表的最后一页
    pub fn is_last(&self) -> bool {
        self.position == self.pages_total
    }
}

impl Display for PageCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 {}/{} 第 {} 页 ({}/{})]",
            self.document_index, self.documents_total, self.page, self.position, self.pages_total
        )
    }
}
