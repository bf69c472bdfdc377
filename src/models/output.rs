//! 输出配置与交付结果

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// 输出目的地
///
/// 每种模式只携带自己需要的字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "destination", rename_all = "kebab-case")]
pub enum OutputConfig {
    /// 下载到本地
    #[default]
    LocalDownload,
    /// 写入用户选择的远程文件夹
    RemoteStore {
        folder: String,
        filename: String,
        context_id: String,
    },
    /// 写回启动参数指定的远程位置
    RemoteStoreFromBootstrap {
        folder: String,
        filename: String,
        session_id: String,
    },
}

impl OutputConfig {
    pub fn is_remote(&self) -> bool {
        !matches!(self, OutputConfig::LocalDownload)
    }

    /// 校验远程目的地字段
    pub fn validate(&self) -> AppResult<()> {
        let (folder, filename, id) = match self {
            OutputConfig::LocalDownload => return Ok(()),
            OutputConfig::RemoteStore {
                folder,
                filename,
                context_id,
            } => (folder, filename, context_id),
            OutputConfig::RemoteStoreFromBootstrap {
                folder,
                filename,
                session_id,
            } => (folder, filename, session_id),
        };

        if folder.trim().is_empty() {
            return Err(AppError::invalid_selection("请选择远程文件夹"));
        }
        if id.trim().is_empty() {
            return Err(AppError::invalid_selection("缺少远程存储会话 ID"));
        }
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(AppError::invalid_selection(format!(
                "文件名必须以 .csv 结尾: {}",
                filename
            )));
        }
        Ok(())
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputConfig::LocalDownload => write!(f, "本地下载"),
            OutputConfig::RemoteStore {
                folder, filename, ..
            } => write!(f, "远程存储 {}/{}", folder, filename),
            OutputConfig::RemoteStoreFromBootstrap {
                folder, filename, ..
            } => write!(f, "远程存储(启动位置) {}/{}", folder, filename),
        }
    }
}

/// 可下载结果的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableLocator {
    /// 下载地址，可以是相对服务地址的路径
    pub url: String,
    /// 服务端建议的文件名
    pub filename: Option<String>,
}

/// 汇总后的交付结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliverable {
    pub locator: Option<DeliverableLocator>,
    /// 远程写入是否成功
    pub remote_stored: bool,
    /// 远程写入失败、改为本地下载
    pub used_fallback: bool,
}

/// 一次运行的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 已下载到本地
    Downloaded { path: PathBuf },
    /// 已写入远程存储
    RemoteStored,
    /// 远程写入失败，已改为本地下载
    RemoteStoredWithFallbackDownload { path: PathBuf },
}

impl RunOutcome {
    /// 面向用户的结果说明
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Downloaded { path } => {
                format!("文档处理完成，结果表格已下载: {}", path.display())
            }
            RunOutcome::RemoteStored => "文档处理完成，结果表格已保存到远程存储".to_string(),
            RunOutcome::RemoteStoredWithFallbackDownload { path } => format!(
                "文档处理完成，但无法保存到远程存储，结果表格已改为本地下载: {}",
                path.display()
            ),
        }
    }
}
