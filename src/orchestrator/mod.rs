//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! runner::Orchestrator (一次运行)
//!     ↓
//! batch_coordinator (批量：逐个文档)
//!     ↓
//! sequencer (单个文档：逐页)
//!     ↓
//! services (能力层：page_executor / finalizer / output_resolver)
//!     ↓
//! clients (传输：ProcessingApi)
//! ```
//!
//! 编排层只做调度和进度记录，不解释服务端响应的内容。

pub mod batch_coordinator;
pub mod runner;
pub mod sequencer;

pub use batch_coordinator::BatchCoordinator;
pub use runner::{Orchestrator, RunFailure, RunReport};
pub use sequencer::{DocumentRun, RunRecord, Sequencer, SequencerState};
