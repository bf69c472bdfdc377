//! 结果汇总 - 业务能力层
//!
//! 单文档模式：最后一页的提示即为交付结果，不需要额外请求
//! 批量模式：请求服务端把多个任务合并为一张表（按文档名加一列）

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::ProcessingApi;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{Deliverable, DeliverableLocator, FinalizationHints, OutputConfig};

const FINALIZE_ENDPOINT: &str = "/api/jobs/finalize-batch";

/// 汇总服务
pub struct Finalizer {
    api: Arc<dyn ProcessingApi>,
}

impl Finalizer {
    pub fn new(api: Arc<dyn ProcessingApi>) -> Self {
        Self { api }
    }

    /// 单文档模式：根据最后一页的提示生成交付结果
    pub fn from_last_page(
        hints: Option<FinalizationHints>,
        output: &OutputConfig,
    ) -> AppResult<Deliverable> {
        let hints = hints.ok_or_else(|| {
            AppError::finalize_failed(ApiError::malformed("last page", "最后一页没有交付信息"))
        })?;

        deliverable_for(output, hints.locator, hints.remote_stored, hints.used_fallback)
            .map_err(|detail| AppError::finalize_failed(ApiError::malformed("last page", detail)))
    }

    /// 批量模式：合并所有任务
    pub async fn finalize_batch(
        &self,
        job_ids: &[String],
        output: &OutputConfig,
    ) -> AppResult<Deliverable> {
        info!("📊 正在合并 {} 个任务的结果 (输出: {})", job_ids.len(), output);

        let response = self
            .api
            .finalize_batch(job_ids, output)
            .await
            .map_err(AppError::finalize_failed)?;

        let locator = response.locator();
        deliverable_for(output, locator, response.remote_stored, response.used_fallback).map_err(
            |detail| AppError::finalize_failed(ApiError::malformed(FINALIZE_ENDPOINT, detail)),
        )
    }
}

/// 按输出目的地检查交付信息是否完整
///
/// 远程目的地没有回退时，服务端成功即视为远程写入成功
fn deliverable_for(
    output: &OutputConfig,
    locator: Option<DeliverableLocator>,
    remote_stored: bool,
    used_fallback: bool,
) -> Result<Deliverable, String> {
    if !output.is_remote() {
        if used_fallback {
            warn!("本地下载模式下服务端报告了回退，忽略该标记");
        }
        return match locator {
            Some(locator) => Ok(Deliverable {
                locator: Some(locator),
                remote_stored: false,
                used_fallback: false,
            }),
            None => Err("本地下载模式缺少下载地址".to_string()),
        };
    }

    if used_fallback {
        warn!("⚠️ 远程存储写入失败，改为本地下载");
        return match locator {
            Some(locator) => Ok(Deliverable {
                locator: Some(locator),
                remote_stored: false,
                used_fallback: true,
            }),
            None => Err("远程存储回退但缺少下载地址".to_string()),
        };
    }

    if !remote_stored {
        info!("服务端未显式确认远程写入，按成功处理");
    }

    Ok(Deliverable {
        locator,
        remote_stored: true,
        used_fallback: false,
    })
}
