//! 输出处理 - 业务能力层
//!
//! 根据交付结果决定：下载到本地，或确认远程已保存

use std::sync::Arc;

use tracing::info;

use crate::clients::ProcessingApi;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{Deliverable, DeliverableLocator, OutputConfig, RunOutcome};
use crate::services::download_writer::DownloadWriter;
use std::path::PathBuf;

/// 输出处理服务
pub struct OutputResolver {
    api: Arc<dyn ProcessingApi>,
    writer: DownloadWriter,
}

impl OutputResolver {
    pub fn new(api: Arc<dyn ProcessingApi>, writer: DownloadWriter) -> Self {
        Self { api, writer }
    }

    /// 处理交付结果，只会得到三种最终结果之一
    ///
    /// 回退时一定下载到本地，结果不会是单纯的 `RemoteStored`
    pub async fn resolve(
        &self,
        deliverable: &Deliverable,
        output: &OutputConfig,
    ) -> AppResult<RunOutcome> {
        if deliverable.used_fallback {
            let path = self.fetch_and_save(deliverable.locator.as_ref()).await?;
            return Ok(RunOutcome::RemoteStoredWithFallbackDownload { path });
        }

        if !output.is_remote() {
            let path = self.fetch_and_save(deliverable.locator.as_ref()).await?;
            return Ok(RunOutcome::Downloaded { path });
        }

        info!("✓ 结果已保存到远程存储 ({})", output);
        Ok(RunOutcome::RemoteStored)
    }

    async fn fetch_and_save(&self, locator: Option<&DeliverableLocator>) -> AppResult<PathBuf> {
        let locator = locator.ok_or_else(|| {
            AppError::download_failed("<none>", ApiError::malformed("deliverable", "缺少下载地址"))
        })?;

        info!("📥 正在下载结果: {}", locator.url);
        let bytes = self
            .api
            .fetch_deliverable(locator)
            .await
            .map_err(|e| AppError::download_failed(&locator.url, e))?;

        let path = self
            .writer
            .save(locator.filename.as_deref(), &bytes)
            .await
            .map_err(|e| AppError::download_failed(&locator.url, e))?;
        info!("✓ 已保存: {}", path.display());

        Ok(path)
    }
}
