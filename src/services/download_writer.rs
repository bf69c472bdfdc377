//! 结果文件写入 - 业务能力层
//!
//! 只负责"把下载的字节保存到本地"，不关心结果从哪来

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

/// 服务端没有给文件名时使用
pub const DEFAULT_FILENAME: &str = "gpt_responses.csv";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.\- ()]").expect("BUG: invalid UNSAFE_CHARS regex literal"));

/// 结果文件写入服务
pub struct DownloadWriter {
    download_dir: PathBuf,
}

impl DownloadWriter {
    /// 创建新的写入服务
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    /// 保存文件，同名文件已存在时自动加序号，不覆盖
    ///
    /// # 返回
    /// 返回实际写入的路径
    pub async fn save(&self, filename: Option<&str>, bytes: &[u8]) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.download_dir).await?;

        let name = sanitize_filename(filename.unwrap_or(DEFAULT_FILENAME));
        let path = self.available_path(&name).await;

        debug!("写入结果文件: {} ({} 字节)", path.display(), bytes.len());
        fs::write(&path, bytes).await?;

        Ok(path)
    }

    async fn available_path(&self, name: &str) -> PathBuf {
        let candidate = self.download_dir.join(name);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
            _ => (name.to_string(), String::new()),
        };

        let mut n = 1;
        loop {
            let candidate = self.download_dir.join(format!("{} ({}){}", stem, n, ext));
            if !fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// 清理文件名：去掉目录部分，替换不安全字符
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("").trim();

    let cleaned = UNSAFE_CHARS.replace_all(base, "_").to_string();

    if cleaned.trim_matches('.').is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned
    }
}
