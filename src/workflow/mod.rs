pub mod cancel;
pub mod page_ctx;
pub mod progress;

pub use cancel::CancelFlag;
pub use page_ctx::PageCtx;
pub use progress::{ProgressTracker, RunProgress, RunStatus};
