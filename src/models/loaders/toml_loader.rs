use crate::error::{AppResult, ConfigError};
use crate::models::document::BootstrapParams;
use crate::models::output::OutputConfig;
use crate::models::plan::RunMode;
use crate::models::prompt::PromptInput;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 运行请求：界面表单填写完成后的内容
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub mode: RunMode,
    /// 快捷选页策略（单文档模式）
    #[serde(default)]
    pub selection: Option<String>,
    /// 显式页码（单文档模式），优先于 `selection`
    #[serde(default)]
    pub pages: Option<Vec<u32>>,
    /// 要上传的本地文件（单文档模式）
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub prompt: PromptInput,
    #[serde(default)]
    pub output: OutputConfig,
    /// 从远程存储拉取文档（批量模式必填）
    #[serde(default)]
    pub bootstrap: Option<BootstrapParams>,
}

/// 从 TOML 文本解析运行请求
pub fn parse_run_request(content: &str, source: &str) -> AppResult<RunRequest> {
    let request: RunRequest =
        toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: source.to_string(),
            source: e,
        })?;
    Ok(request)
}

/// 从 TOML 文件加载运行请求
pub async fn load_run_request(path: &Path) -> AppResult<RunRequest> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;

    let request = parse_run_request(&content, &path.display().to_string())?;

    tracing::info!(
        "已加载运行请求: {} (模式: {:?}, 输出: {})",
        path.display(),
        request.mode,
        request.output
    );

    Ok(request)
}
