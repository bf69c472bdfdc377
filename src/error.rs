use thiserror::Error;

/// 应用程序错误类型
///
/// 编排相关的变体与一次运行的终止原因一一对应，
/// 任何一个都会立刻终止本次运行，不做自动重试。
#[derive(Debug, Error)]
pub enum AppError {
    /// 无法生成工作计划（没有文档、页码为空、参数非法）
    #[error("选择无效: {reason}")]
    InvalidSelection { reason: String },

    /// 上传或从远程存储拉取文档失败
    #[error("文档导入失败 ({target}): {source}")]
    Ingestion {
        target: String,
        #[source]
        source: ApiError,
    },

    /// 创建任务失败
    #[error("创建任务失败 (文档: {document}): {source}")]
    JobCreation {
        document: String,
        #[source]
        source: ApiError,
    },

    /// 单页处理失败
    #[error("页面处理失败 (文档: {document}, 第 {page} 页): {source}")]
    PageProcessing {
        document: String,
        page: u32,
        #[source]
        source: ApiError,
    },

    /// 汇总生成最终表格失败
    #[error("汇总结果失败: {source}")]
    Finalize {
        #[source]
        source: ApiError,
    },

    /// 下载或保存结果文件失败
    #[error("下载结果失败 ({locator}): {source}")]
    Download {
        locator: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 运行被用户取消
    #[error("运行已取消 (已完成 {pages_done} 页)")]
    Cancelled { pages_done: usize },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 未归类的传输错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP 状态码非 2xx
    #[error("API返回错误状态 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 服务端明确返回 success=false
    #[error("API返回失败 ({endpoint}): {message}")]
    Unsuccessful { endpoint: String, message: String },

    /// 响应格式不符合约定
    #[error("API响应格式错误 ({endpoint}): {detail}")]
    MalformedResponse { endpoint: String, detail: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 运行文件不存在或无法读取
    #[error("读取运行文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// HTTP 客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    ClientBuildFailed(String),

    /// 命令行客户端没有同源页面可依托，必须给出完整地址
    #[error("服务地址必须是 http(s) 绝对地址: {0:?}")]
    InvalidBaseUrl(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建选择无效错误
    pub fn invalid_selection(reason: impl Into<String>) -> Self {
        AppError::InvalidSelection {
            reason: reason.into(),
        }
    }

    /// 创建文档导入错误
    pub fn ingestion_failed(target: impl Into<String>, source: ApiError) -> Self {
        AppError::Ingestion {
            target: target.into(),
            source,
        }
    }

    /// 创建任务创建错误
    pub fn job_creation_failed(document: impl Into<String>, source: ApiError) -> Self {
        AppError::JobCreation {
            document: document.into(),
            source,
        }
    }

    /// 创建页面处理错误
    pub fn page_failed(document: impl Into<String>, page: u32, source: ApiError) -> Self {
        AppError::PageProcessing {
            document: document.into(),
            page,
            source,
        }
    }

    /// 创建汇总错误
    pub fn finalize_failed(source: ApiError) -> Self {
        AppError::Finalize { source }
    }

    /// 创建下载错误
    pub fn download_failed(
        locator: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Download {
            locator: locator.into(),
            source: Box::new(source),
        }
    }

    /// 错误种类的简短标识，用于进度状态和日志
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidSelection { .. } => "InvalidSelection",
            AppError::Ingestion { .. } => "IngestionError",
            AppError::JobCreation { .. } => "JobCreationError",
            AppError::PageProcessing { .. } => "PageProcessingError",
            AppError::Finalize { .. } => "FinalizeError",
            AppError::Download { .. } => "DownloadError",
            AppError::Cancelled { .. } => "Cancelled",
            AppError::Config(_) => "ConfigError",
            AppError::Api(_) => "ApiError",
        }
    }
}

impl ApiError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建响应格式错误
    pub fn malformed(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// 创建服务端失败错误
    pub fn unsuccessful(endpoint: impl Into<String>, message: Option<String>) -> Self {
        ApiError::Unsuccessful {
            endpoint: endpoint.into(),
            message: message.unwrap_or_else(|| "未知错误".to_string()),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_error_mentions_document_and_page() {
        let err = AppError::page_failed(
            "report.pdf",
            3,
            ApiError::unsuccessful("/api/jobs/j1/pages", Some("boom".into())),
        );
        let text = err.to_string();
        assert!(text.contains("report.pdf"));
        assert!(text.contains("第 3 页"));
        assert_eq!(err.kind(), "PageProcessingError");
    }

    #[test]
    fn unsuccessful_without_message_uses_placeholder() {
        let err = ApiError::unsuccessful("/upload", None);
        assert!(err.to_string().contains("未知错误"));
    }
}
