//! 集成测试用的脚本化处理服务
//!
//! 在内存中模拟处理服务，记录每一次调用，可配置失败页、回退和取消

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use document_processor::clients::wire::{FinalizeResponse, HealthStatus, JobRequest, PageResponse};
use document_processor::clients::ProcessingApi;
use document_processor::error::ApiError;
use document_processor::models::{
    BootstrapParams, BootstrapResult, DeliverableLocator, DocumentReference, OutputConfig,
    PromptDefaults,
};
use document_processor::workflow::CancelFlag;

/// 服务收到的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ingest(String),
    Bootstrap(String),
    CreateJob {
        document: String,
        stem: String,
        pages: Vec<u32>,
        batch_member: bool,
    },
    SubmitPage {
        job_id: String,
        page: u32,
    },
    FinalizeBatch(Vec<String>),
    Fetch(String),
}

struct Job {
    document_name: String,
    stem: String,
    pages: Vec<u32>,
    output: OutputConfig,
    batch_member: bool,
}

#[derive(Default)]
pub struct FakeService {
    upload_pages: u32,
    remote_documents: Vec<(String, u32)>,
    prompt_defaults: Option<PromptDefaults>,
    fail_on: Option<(String, u32)>,
    fallback: bool,
    cancel_on: Option<(u32, CancelFlag)>,
    calls: Mutex<Vec<Call>>,
    jobs: Mutex<HashMap<String, Job>>,
    next_id: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            upload_pages: 3,
            ..Default::default()
        }
    }

    /// 上传的文档页数
    pub fn with_upload_pages(mut self, pages: u32) -> Self {
        self.upload_pages = pages;
        self
    }

    /// 远程存储中的文档
    pub fn with_remote_documents(mut self, docs: &[(&str, u32)]) -> Self {
        self.remote_documents = docs.iter().map(|&(n, p)| (n.to_string(), p)).collect();
        self
    }

    pub fn with_prompt_defaults(mut self, defaults: PromptDefaults) -> Self {
        self.prompt_defaults = Some(defaults);
        self
    }

    /// 指定文档的指定页返回失败
    pub fn failing_on(mut self, document: &str, page: u32) -> Self {
        self.fail_on = Some((document.to_string(), page));
        self
    }

    /// 远程写入失败，改为提供下载
    pub fn with_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    /// 处理完指定页后设置取消标记
    pub fn cancelling_after(mut self, page: u32, flag: CancelFlag) -> Self {
        self.cancel_on = Some((page, flag));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// 按提交顺序返回所有页码
    pub fn submitted_pages(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitPage { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn issue_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn delivery(&self, output: &OutputConfig, name: &str) -> (Option<String>, Option<String>, bool, bool) {
        let used_fallback = output.is_remote() && self.fallback;
        let remote_stored = output.is_remote() && !self.fallback;
        if remote_stored {
            (None, None, false, true)
        } else {
            let filename = format!("{}.csv", name);
            (
                Some(format!("/download/{}", filename)),
                Some(filename),
                used_fallback,
                false,
            )
        }
    }
}

#[async_trait]
impl ProcessingApi for FakeService {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "ok".into(),
            message: "fake".into(),
        })
    }

    async fn ingest_document(&self, path: &Path) -> Result<DocumentReference, ApiError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.record(Call::Ingest(name.clone()));
        Ok(DocumentReference::new(
            self.issue_id("file"),
            name,
            self.upload_pages,
        ))
    }

    async fn bootstrap(&self, params: &BootstrapParams) -> Result<BootstrapResult, ApiError> {
        self.record(Call::Bootstrap(params.folder.clone()));
        let documents = self
            .remote_documents
            .iter()
            .map(|(name, pages)| DocumentReference::new(self.issue_id("file"), name.as_str(), *pages))
            .collect();
        Ok(BootstrapResult {
            documents,
            prompt_defaults: self.prompt_defaults.clone(),
        })
    }

    async fn create_job(&self, request: &JobRequest) -> Result<String, ApiError> {
        self.record(Call::CreateJob {
            document: request.document_name.clone(),
            stem: request.document_stem.clone(),
            pages: request.selected_pages.clone(),
            batch_member: request.batch_member,
        });
        let job_id = self.issue_id("job");
        self.jobs.lock().unwrap().insert(
            job_id.clone(),
            Job {
                document_name: request.document_name.clone(),
                stem: request.document_stem.clone(),
                pages: request.selected_pages.clone(),
                output: request.output.clone(),
                batch_member: request.batch_member,
            },
        );
        Ok(job_id)
    }

    async fn submit_page(
        &self,
        job_id: &str,
        page: u32,
        document_name: &str,
    ) -> Result<PageResponse, ApiError> {
        self.record(Call::SubmitPage {
            job_id: job_id.to_string(),
            page,
        });
        // 让观察者有机会看到每一次进度变化
        tokio::task::yield_now().await;

        let endpoint = format!("/api/jobs/{}/pages", job_id);
        if let Some((doc, fail_page)) = &self.fail_on {
            if doc == document_name && *fail_page == page {
                return Err(ApiError::unsuccessful(endpoint, Some("generation failed".into())));
            }
        }

        let jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get(job_id)
            .ok_or_else(|| ApiError::unsuccessful(&endpoint, Some("unknown job".into())))?;
        let is_last_page = job.pages.last() == Some(&page);

        let mut response = PageResponse {
            success: true,
            page: Some(page),
            gpt_response: Some(format!("{} p{}", job.document_name, page)),
            image_size_bytes: Some(1024 * page as u64),
            is_last_page,
            ..Default::default()
        };
        if is_last_page && !job.batch_member {
            let (url, filename, used_fallback, remote_stored) = self.delivery(&job.output, &job.stem);
            response.csv_download_url = url;
            response.csv_filename = filename;
            response.used_fallback = used_fallback;
            response.remote_stored = remote_stored;
        }
        drop(jobs);

        if let Some((cancel_page, flag)) = &self.cancel_on {
            if *cancel_page == page {
                flag.cancel();
            }
        }

        Ok(response)
    }

    async fn finalize_batch(
        &self,
        job_ids: &[String],
        output: &OutputConfig,
    ) -> Result<FinalizeResponse, ApiError> {
        self.record(Call::FinalizeBatch(job_ids.to_vec()));
        let (url, filename, used_fallback, remote_stored) = self.delivery(output, "batch_results");
        Ok(FinalizeResponse {
            success: true,
            csv_download_url: url,
            csv_filename: filename,
            used_fallback,
            remote_stored,
            error: None,
        })
    }

    async fn fetch_deliverable(&self, locator: &DeliverableLocator) -> Result<Vec<u8>, ApiError> {
        self.record(Call::Fetch(locator.url.clone()));
        Ok(format!("document,page,response\nfrom {}\n", locator.url).into_bytes())
    }
}
