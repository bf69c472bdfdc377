//! 处理服务的请求/响应结构（JSON）

use serde::{Deserialize, Serialize};

use crate::models::output::{DeliverableLocator, OutputConfig};
use crate::models::prompt::{PromptConfig, PromptDefaults};

/// 所有响应共有的 success / error 字段
pub trait ServiceReply {
    fn succeeded(&self) -> bool;
    fn error_message(&self) -> Option<String>;
}

macro_rules! impl_service_reply {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ServiceReply for $ty {
                fn succeeded(&self) -> bool {
                    self.success
                }

                fn error_message(&self) -> Option<String> {
                    self.error.clone()
                }
            }
        )*
    };
}

impl_service_reply!(
    UploadResponse,
    BootstrapResponse,
    CreateJobResponse,
    PageResponse,
    FinalizeResponse,
);

/// 健康检查
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDocument {
    pub file_id: String,
    pub filename: String,
    pub page_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub documents: Vec<RemoteDocument>,
    #[serde(default)]
    pub prompt_defaults: Option<PromptDefaults>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 创建任务请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    #[serde(flatten)]
    pub prompt: PromptConfig,
    pub file_id: String,
    pub selected_pages: Vec<u32>,
    pub output: OutputConfig,
    pub document_name: String,
    /// 去掉扩展名的文件名，批量汇总时作为来源列
    pub document_stem: String,
    /// 批量模式下由汇总步骤统一交付，单个任务不交付
    pub batch_member: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageRequest<'a> {
    pub page: u32,
    pub document_name: &'a str,
}

/// 单页处理响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub gpt_response: Option<String>,
    #[serde(default)]
    pub image_size_bytes: Option<u64>,
    #[serde(default)]
    pub is_last_page: bool,
    #[serde(default)]
    pub csv_download_url: Option<String>,
    #[serde(default)]
    pub csv_filename: Option<String>,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default)]
    pub remote_stored: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeRequest<'a> {
    pub job_ids: &'a [String],
    pub output: &'a OutputConfig,
}

/// 批量汇总响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalizeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub csv_download_url: Option<String>,
    #[serde(default)]
    pub csv_filename: Option<String>,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default)]
    pub remote_stored: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// 从 url + 文件名组装下载位置
pub fn locator_from(url: Option<&String>, filename: Option<&String>) -> Option<DeliverableLocator> {
    url.filter(|u| !u.trim().is_empty())
        .map(|u| DeliverableLocator {
            url: u.clone(),
            filename: filename.cloned(),
        })
}

impl PageResponse {
    pub fn locator(&self) -> Option<DeliverableLocator> {
        locator_from(self.csv_download_url.as_ref(), self.csv_filename.as_ref())
    }
}

impl FinalizeResponse {
    pub fn locator(&self) -> Option<DeliverableLocator> {
        locator_from(self.csv_download_url.as_ref(), self.csv_filename.as_ref())
    }
}
