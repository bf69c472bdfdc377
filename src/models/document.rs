//! 文档引用
//!
//! 由处理服务在上传或批量拉取后签发，创建后不再修改

use serde::{Deserialize, Serialize};

use crate::models::prompt::PromptDefaults;

/// 文档引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    /// 服务端签发的文档 ID（不透明）
    pub id: String,
    /// 显示名称（含扩展名）
    pub name: String,
    /// 总页数
    pub page_count: u32,
    /// 去掉扩展名的文件名，批量模式下用于标记结果行
    pub stem: String,
}

impl DocumentReference {
    /// 创建新的文档引用，自动计算 stem
    pub fn new(id: impl Into<String>, name: impl Into<String>, page_count: u32) -> Self {
        let name = name.into();
        let stem = name_stem(&name);
        Self {
            id: id.into(),
            name,
            page_count,
            stem,
        }
    }
}

/// 取文件名主干（去掉目录和最后一个扩展名）
///
/// 以 `.` 开头且没有其他点的文件名（如 `.env`）视为没有扩展名。
pub fn name_stem(name: &str) -> String {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// 从远程存储拉取文档的位置参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// 远程文件夹路径
    pub folder: String,
    /// 只拉取这些文件；为空时拉取整个文件夹
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// 远程拉取结果
#[derive(Debug, Clone, Default)]
pub struct BootstrapResult {
    pub documents: Vec<DocumentReference>,
    pub prompt_defaults: Option<PromptDefaults>,
}
