//! 提示词配置

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 默认模型
pub const DEFAULT_MODEL: &str = "GPT-4.1";
/// 默认温度
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
/// 服务端支持的模型
pub const KNOWN_MODELS: [&str; 2] = ["GPT-4.1", "GPT-5"];
/// 表格单元格允许的最大字符数
pub const SPREADSHEET_CELL_LIMIT: usize = 32_767;

/// 提示词配置：五个自由文本字段 + 温度 + 模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub role: String,
    pub task: String,
    pub context: String,
    pub format: String,
    pub constraints: String,
    pub temperature: f32,
    pub model: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            role: String::new(),
            task: String::new(),
            context: String::new(),
            format: String::new(),
            constraints: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// 运行请求中填写的提示词
///
/// 温度和模型未填写时为 `None`，此时才会使用服务端预填值或默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptInput {
    pub role: String,
    pub task: String,
    pub context: String,
    pub format: String,
    pub constraints: String,
    pub temperature: Option<f32>,
    pub model: Option<String>,
}

impl PromptInput {
    /// 合并服务端预填值，得到最终的提示词配置
    ///
    /// 优先级：请求中填写的值 > 预填值 > 默认值
    pub fn resolve(&self, defaults: Option<&PromptDefaults>) -> PromptConfig {
        let empty = PromptDefaults::default();
        let defaults = defaults.unwrap_or(&empty);

        PromptConfig {
            role: pick_text(&self.role, &defaults.role),
            task: pick_text(&self.task, &defaults.task),
            context: pick_text(&self.context, &defaults.context),
            format: pick_text(&self.format, &defaults.format),
            constraints: pick_text(&self.constraints, &defaults.constraints),
            temperature: self
                .temperature
                .or(defaults.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            model: non_blank(&self.model)
                .or_else(|| non_blank(&defaults.model))
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
        }
    }
}

/// 远程拉取时服务端预填的提示词
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDefaults {
    pub role: Option<String>,
    pub task: Option<String>,
    pub context: Option<String>,
    pub format: Option<String>,
    pub constraints: Option<String>,
    pub temperature: Option<f32>,
    pub model: Option<String>,
}

impl PromptConfig {
    /// 校验温度和模型
    pub fn validate(&self) -> AppResult<()> {
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(AppError::invalid_selection(format!(
                "温度必须在 [0, 1] 之间，当前为 {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::invalid_selection("模型不能为空"));
        }
        Ok(())
    }

    /// 模型是否在已知列表中
    pub fn is_known_model(&self) -> bool {
        KNOWN_MODELS.contains(&self.model.as_str())
    }

    /// 长度恰好等于单元格上限的字段，这些文本很可能在上游已被截断
    pub fn fields_at_cell_limit(&self) -> Vec<&'static str> {
        self.named_fields()
            .into_iter()
            .filter(|(_, value)| value.chars().count() == SPREADSHEET_CELL_LIMIT)
            .map(|(name, _)| name)
            .collect()
    }

    fn named_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("role", &self.role),
            ("task", &self.task),
            ("context", &self.context),
            ("format", &self.format),
            ("constraints", &self.constraints),
        ]
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn pick_text(value: &str, default: &Option<String>) -> String {
    if value.trim().is_empty() {
        non_blank(default).unwrap_or(value).to_string()
    } else {
        value.to_string()
    }
}
