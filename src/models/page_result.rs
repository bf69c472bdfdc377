use serde::{Deserialize, Serialize};

use crate::models::output::DeliverableLocator;

/// 单页生成结果，按页码顺序追加，追加后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub page: u32,
    pub text: String,
    /// 服务端提交给模型的页面图片大小（字节）
    pub payload_size: Option<u64>,
}

/// 最后一页随结果返回的交付提示（单文档模式下等同于汇总结果）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizationHints {
    pub locator: Option<DeliverableLocator>,
    pub remote_stored: bool,
    pub used_fallback: bool,
}
