//! # Document Processor
//!
//! 驱动远程生成服务逐页处理文档，并把结果汇总为一张表格
//!
//! ## 架构设计
//!
//! ### ① 传输层（Clients）
//! - `clients/` - `ProcessingApi` trait 和基于 reqwest 的 `HttpServiceClient`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每次只处理一件事
//! - `InputResolver` - 上传/拉取文档，生成工作计划
//! - `PageExecutor` - 提交单页
//! - `Finalizer` - 生成交付结果
//! - `OutputResolver` - 下载到本地或确认远程已保存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 单页上下文 `PageCtx`、进度 `ProgressTracker`、取消标记 `CancelFlag`
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/runner` - 一次完整运行
//! - `orchestrator/batch_coordinator` - 批量模式，逐个文档
//! - `orchestrator/sequencer` - 单个文档，逐页提交
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{HttpServiceClient, ProcessingApi};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult};
pub use models::{OutputConfig, PromptConfig, RunMode, RunOutcome, WorkPlan};
pub use orchestrator::{Orchestrator, RunFailure, RunReport};
pub use workflow::{CancelFlag, ProgressTracker, RunProgress, RunStatus};
