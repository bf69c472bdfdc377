use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 取消标记
///
/// 在每次提交页面和开始每个文档之前检查；正在进行的请求不会被打断
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
