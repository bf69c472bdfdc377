//! 处理服务接口
//!
//! 编排层只依赖这个 trait，测试时可以替换为 mock 或脚本化的假服务

use async_trait::async_trait;
use std::path::Path;

use crate::clients::wire::{FinalizeResponse, HealthStatus, JobRequest, PageResponse};
use crate::error::ApiError;
use crate::models::document::{BootstrapParams, BootstrapResult, DocumentReference};
use crate::models::output::{DeliverableLocator, OutputConfig};

/// 远程处理服务的逻辑操作
///
/// 返回的 `ApiError` 只描述传输层问题，由调用方映射为具体的运行错误。
/// `success=false` 的响应在这一层就会转换为 `ApiError::Unsuccessful`。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// 服务健康检查
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// 上传单个文档
    async fn ingest_document(&self, path: &Path) -> Result<DocumentReference, ApiError>;

    /// 从远程存储拉取文档列表及预填提示词
    async fn bootstrap(&self, params: &BootstrapParams) -> Result<BootstrapResult, ApiError>;

    /// 创建任务，返回任务 ID
    async fn create_job(&self, request: &JobRequest) -> Result<String, ApiError>;

    /// 提交一页
    async fn submit_page(
        &self,
        job_id: &str,
        page: u32,
        document_name: &str,
    ) -> Result<PageResponse, ApiError>;

    /// 合并多个任务的结果
    async fn finalize_batch(
        &self,
        job_ids: &[String],
        output: &OutputConfig,
    ) -> Result<FinalizeResponse, ApiError>;

    /// 下载结果文件
    async fn fetch_deliverable(&self, locator: &DeliverableLocator) -> Result<Vec<u8>, ApiError>;
}
