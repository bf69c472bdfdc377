/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 处理服务地址
    pub api_base_url: String,
    /// 单次请求超时（秒），单页生成可能很慢
    pub request_timeout_secs: u64,
    /// 结果文件下载目录
    pub download_dir: String,
    /// 运行请求文件（TOML）
    pub run_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4005/".to_string(),
            request_timeout_secs: 300,
            download_dir: "downloads".to_string(),
            run_file: "run.toml".to_string(),
            verbose_logging: false,
            output_log_file: "run_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            download_dir: std::env::var("DOWNLOAD_DIR").unwrap_or(default.download_dir),
            run_file: std::env::var("RUN_FILE").unwrap_or(default.run_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

/// 拼接服务地址和路径，保证中间恰好一个 `/`
///
/// 基地址为 `/` 时视为同源，返回以 `/` 开头的相对路径。
pub fn api_url(base: &str, path: &str) -> String {
    let clean_base = if base == "/" { "" } else { base.trim_end_matches('/') };
    let clean_path = path.trim_start_matches('/');

    if clean_base.is_empty() {
        return format!("/{}", clean_path);
    }

    format!("{}/{}", clean_base, clean_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_double_slash() {
        assert_eq!(api_url("http://localhost:4005/", "/upload"), "http://localhost:4005/upload");
        assert_eq!(api_url("http://localhost:4005", "upload"), "http://localhost:4005/upload");
        assert_eq!(api_url("http://host:8316///", "//api/jobs"), "http://host:8316/api/jobs");
    }

    #[test]
    fn same_origin_base() {
        assert_eq!(api_url("/", "api/jobs"), "/api/jobs");
        assert_eq!(api_url("/", "/api/jobs"), "/api/jobs");
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, 300);
        assert!(!config.verbose_logging);
    }
}
