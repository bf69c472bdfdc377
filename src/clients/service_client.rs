/// 处理服务 HTTP 客户端
///
/// 封装所有与处理服务相关的调用逻辑（JSON over HTTP）
use crate::clients::processing_api::ProcessingApi;
use crate::clients::wire::{
    BootstrapResponse, CreateJobResponse, FinalizeRequest, FinalizeResponse, HealthStatus,
    JobRequest, PageRequest, PageResponse, ServiceReply, UploadResponse,
};
use crate::config::{api_url, Config};
use crate::error::{ApiError, AppResult, ConfigError};
use crate::models::document::{BootstrapParams, BootstrapResult, DocumentReference};
use crate::models::output::{DeliverableLocator, OutputConfig};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// 处理服务客户端
pub struct HttpServiceClient {
    client: Client,
    base_url: String,
}

impl HttpServiceClient {
    /// 创建新的服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base = config.api_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(config.api_base_url.clone()).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::ClientBuildFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        api_url(&self.base_url, path)
    }

    /// 发送 JSON POST 并解析响应
    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + ServiceReply,
    {
        debug!("POST {}", endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(endpoint, e))?;

        let reply: R = read_json(endpoint, response).await?;
        ensure_success(endpoint, reply)
    }
}

#[async_trait]
impl ProcessingApi for HttpServiceClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let endpoint = "/";
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(endpoint, e))?;
        read_json(endpoint, response).await
    }

    async fn ingest_document(&self, path: &Path) -> Result<DocumentReference, ApiError> {
        let endpoint = "/upload";
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::request_failed(endpoint, e))?;
        debug!("上传文件 {} ({} 字节)", file_name, bytes.len());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(endpoint, e))?;

        let reply: UploadResponse = read_json(endpoint, response).await?;
        let reply = ensure_success(endpoint, reply)?;

        if reply.file_id.trim().is_empty() {
            return Err(ApiError::malformed(endpoint, "缺少 file_id"));
        }

        Ok(DocumentReference::new(
            reply.file_id,
            reply.filename,
            reply.page_count,
        ))
    }

    async fn bootstrap(&self, params: &BootstrapParams) -> Result<BootstrapResult, ApiError> {
        let reply: BootstrapResponse = self.post_json("/api/bootstrap", params).await?;

        let documents = reply
            .documents
            .into_iter()
            .map(|d| DocumentReference::new(d.file_id, d.filename, d.page_count))
            .collect();

        Ok(BootstrapResult {
            documents,
            prompt_defaults: reply.prompt_defaults,
        })
    }

    async fn create_job(&self, request: &JobRequest) -> Result<String, ApiError> {
        let endpoint = "/api/jobs";
        let reply: CreateJobResponse = self.post_json(endpoint, request).await?;
        reply
            .job_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::malformed(endpoint, "缺少 job_id"))
    }

    async fn submit_page(
        &self,
        job_id: &str,
        page: u32,
        document_name: &str,
    ) -> Result<PageResponse, ApiError> {
        let endpoint = format!("/api/jobs/{}/pages", job_id);
        let body = PageRequest {
            page,
            document_name,
        };
        self.post_json(&endpoint, &body).await
    }

    async fn finalize_batch(
        &self,
        job_ids: &[String],
        output: &OutputConfig,
    ) -> Result<FinalizeResponse, ApiError> {
        let body = FinalizeRequest { job_ids, output };
        self.post_json("/api/jobs/finalize-batch", &body).await
    }

    async fn fetch_deliverable(&self, locator: &DeliverableLocator) -> Result<Vec<u8>, ApiError> {
        let url = if locator.url.starts_with("http://") || locator.url.starts_with("https://") {
            locator.url.clone()
        } else {
            self.url(&locator.url)
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(&locator.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::BadStatus {
                endpoint: locator.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let mut stream = response.bytes_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::request_failed(&locator.url, e))?;
            bytes.extend_from_slice(&chunk);
        }
        debug!("已下载 {} 字节: {}", bytes.len(), locator.url);

        Ok(bytes)
    }
}

/// 读取响应体并按状态码解析
async fn read_json<R: DeserializeOwned>(endpoint: &str, response: Response) -> Result<R, ApiError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::request_failed(endpoint, e))?;
    decode_body(endpoint, status, &body)
}

/// 解析响应体
///
/// 非 2xx 时尽量保留服务端的 `error` 字段，方便日志排查
pub fn decode_body<R: DeserializeOwned>(endpoint: &str, status: u16, body: &str) -> Result<R, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        return Err(ApiError::BadStatus {
            endpoint: endpoint.to_string(),
            status,
            body: message,
        });
    }

    serde_json::from_str(body).map_err(|e| ApiError::malformed(endpoint, e.to_string()))
}

/// 检查 success 字段
pub fn ensure_success<R: ServiceReply>(endpoint: &str, reply: R) -> Result<R, ApiError> {
    if reply.succeeded() {
        Ok(reply)
    } else {
        Err(ApiError::unsuccessful(endpoint, reply.error_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_successful_page_reply() {
        let reply: PageResponse = decode_body(
            "/api/jobs/j1/pages",
            200,
            r#"{"success": true, "page": 4, "gpt_response": "ok", "is_last_page": true}"#,
        )
        .unwrap();
        let reply = ensure_success("/api/jobs/j1/pages", reply).unwrap();
        assert_eq!(reply.page, Some(4));
        assert!(reply.is_last_page);
    }

    #[test]
    fn bad_status_keeps_server_error_text() {
        let err = decode_body::<PageResponse>("/api/jobs", 500, r#"{"error": "model overloaded"}"#)
            .unwrap_err();
        match err {
            ApiError::BadStatus { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode_body::<CreateJobResponse>("/api/jobs", 200, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[test]
    fn success_false_is_unsuccessful() {
        let reply: FinalizeResponse =
            decode_body("/api/jobs/finalize-batch", 200, r#"{"success": false, "error": "no rows"}"#)
                .unwrap();
        let err = ensure_success("/api/jobs/finalize-batch", reply).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn client_joins_base_url() {
        let config = Config {
            api_base_url: "http://localhost:4005/".into(),
            ..Default::default()
        };
        let client = HttpServiceClient::new(&config).unwrap();
        assert_eq!(client.url("/api/jobs"), "http://localhost:4005/api/jobs");
    }

    #[test]
    fn same_origin_base_is_rejected() {
        for base in ["/", "", "localhost:4005"] {
            let config = Config {
                api_base_url: base.into(),
                ..Default::default()
            };
            let err = HttpServiceClient::new(&config).err().unwrap();
            assert!(
                matches!(err, crate::error::AppError::Config(ConfigError::InvalidBaseUrl(_))),
                "base {base:?} gave {err:?}"
            );
        }
    }
}
