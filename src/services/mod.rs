//! 业务能力层（Services）
//!
//! 每个服务只描述"我能做什么"，不关心调用顺序；顺序由编排层决定。

pub mod download_writer;
pub mod finalizer;
pub mod input_resolver;
pub mod output_resolver;
pub mod page_executor;
pub mod page_selection;

pub use download_writer::DownloadWriter;
pub use finalizer::Finalizer;
pub use input_resolver::{build_batch_plan, build_single_plan, InputResolver};
pub use output_resolver::OutputResolver;
pub use page_executor::{PageExecutor, PageSubmission};
pub use page_selection::{quick_select, SelectionStrategy};
