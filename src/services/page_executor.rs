//! 单页执行 - 业务能力层
//!
//! 只负责"提交一页并得到结果"，不关心页面顺序和进度

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::{PageResponse, ProcessingApi};
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{FinalizationHints, PageResult};
use crate::utils::logging::truncate_text;
use crate::workflow::PageCtx;

/// 单页提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSubmission {
    pub result: PageResult,
    /// 是否为本文档页码列表的最后一页
    pub is_last_page: bool,
    /// 仅最后一页携带
    pub hints: Option<FinalizationHints>,
}

/// 单页执行器
pub struct PageExecutor {
    api: Arc<dyn ProcessingApi>,
}

impl PageExecutor {
    pub fn new(api: Arc<dyn ProcessingApi>) -> Self {
        Self { api }
    }

    /// 提交一页，失败不重试
    pub async fn submit_page(&self, ctx: &PageCtx) -> AppResult<PageSubmission> {
        let response = self
            .api
            .submit_page(&ctx.job_id, ctx.page, &ctx.document_name)
            .await
            .map_err(|e| AppError::page_failed(&ctx.document_name, ctx.page, e))?;

        interpret_response(ctx, response)
            .map_err(|e| AppError::page_failed(&ctx.document_name, ctx.page, e))
    }
}

/// 校验响应并提取结果
///
/// 是否为最后一页以本地页码列表为准；服务端标记不一致时只记录警告
fn interpret_response(ctx: &PageCtx, response: PageResponse) -> Result<PageSubmission, ApiError> {
    let endpoint = format!("/api/jobs/{}/pages", ctx.job_id);

    let page = response
        .page
        .ok_or_else(|| ApiError::malformed(&endpoint, "缺少 page 字段"))?;
    if page != ctx.page {
        return Err(ApiError::malformed(
            &endpoint,
            format!("返回页码 {} 与提交页码 {} 不一致", page, ctx.page),
        ));
    }

    let is_last_page = ctx.is_last();
    if response.is_last_page != is_last_page {
        warn!(
            "{} 服务端 is_last_page={} 与本地判断 {} 不一致，以本地为准",
            ctx, response.is_last_page, is_last_page
        );
    }

    let hints = is_last_page.then(|| FinalizationHints {
        locator: response.locator(),
        remote_stored: response.remote_stored,
        used_fallback: response.used_fallback,
    });

    let text = response
        .gpt_response
        .ok_or_else(|| ApiError::malformed(&endpoint, "缺少 gpt_response 字段"))?;
    debug!("{} 结果: {}", ctx, truncate_text(&text, 200));

    Ok(PageSubmission {
        result: PageResult {
            page,
            text,
            payload_size: response.image_size_bytes,
        },
        is_last_page,
        hints,
    })
}
