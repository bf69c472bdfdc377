//! 输入解析 - 业务能力层
//!
//! 把上传/远程拉取的文档和用户的选页结果整理成工作计划

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::ProcessingApi;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{
    BootstrapParams, BootstrapResult, DocumentReference, OutputConfig, PlanEntry, PromptConfig,
    RunMode, RunRequest, WorkPlan,
};
use crate::services::page_selection::quick_select;

/// 允许上传的文件类型
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "pptx"];

/// 生成单文档模式的工作计划
///
/// 页码去重并升序排列；超出文档页数的页码视为无效选择
pub fn build_single_plan(
    document: Option<DocumentReference>,
    selected_pages: &[u32],
    prompt: PromptConfig,
    output: OutputConfig,
) -> AppResult<WorkPlan> {
    let document = document.ok_or_else(|| AppError::invalid_selection("没有可处理的文档"))?;

    if selected_pages.is_empty() {
        return Err(AppError::invalid_selection("至少需要选择一页"));
    }

    let mut pages = selected_pages.to_vec();
    pages.sort_unstable();
    pages.dedup();

    if let Some(&bad) = pages
        .iter()
        .find(|&&p| p == 0 || p > document.page_count)
    {
        return Err(AppError::invalid_selection(format!(
            "页码 {} 超出范围 [1, {}] ({})",
            bad, document.page_count, document.name
        )));
    }

    check_prompt_and_output(&prompt, &output)?;

    Ok(WorkPlan::new(
        RunMode::Single,
        prompt,
        vec![PlanEntry { document, pages }],
        output,
    ))
}

/// 生成批量模式的工作计划，每个文档处理全部页面
pub fn build_batch_plan(
    documents: Vec<DocumentReference>,
    prompt: PromptConfig,
    output: OutputConfig,
) -> AppResult<WorkPlan> {
    if documents.is_empty() {
        return Err(AppError::invalid_selection("批量模式没有文档"));
    }

    if let Some(empty) = documents.iter().find(|d| d.page_count == 0) {
        return Err(AppError::invalid_selection(format!(
            "文档没有页面: {}",
            empty.name
        )));
    }

    check_prompt_and_output(&prompt, &output)?;

    let entries = documents
        .into_iter()
        .map(|document| {
            let pages = (1..=document.page_count).collect();
            PlanEntry { document, pages }
        })
        .collect();

    Ok(WorkPlan::new(RunMode::Batch, prompt, entries, output))
}

fn check_prompt_and_output(prompt: &PromptConfig, output: &OutputConfig) -> AppResult<()> {
    prompt.validate()?;
    output.validate()?;

    if !prompt.is_known_model() {
        warn!("⚠️ 未知模型: {}，仍将提交给服务端", prompt.model);
    }

    let at_limit = prompt.fields_at_cell_limit();
    if !at_limit.is_empty() {
        warn!(
            "⚠️ 以下字段长度恰好为表格单元格上限，可能在上游已被截断: {}",
            at_limit.join(", ")
        );
    }
    Ok(())
}

/// 文件扩展名是否允许上传
pub fn is_allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// 输入解析服务
pub struct InputResolver {
    api: Arc<dyn ProcessingApi>,
}

impl InputResolver {
    pub fn new(api: Arc<dyn ProcessingApi>) -> Self {
        Self { api }
    }

    /// 上传单个文档
    pub async fn ingest(&self, path: &Path) -> AppResult<DocumentReference> {
        let target = path.display().to_string();

        if !is_allowed_file(path) {
            return Err(AppError::ingestion_failed(
                &target,
                ApiError::unsuccessful(
                    "/upload",
                    Some("不支持的文件类型，只允许 PDF、DOCX、PPTX".to_string()),
                ),
            ));
        }

        info!("📤 正在上传文档: {}", target);
        let document = self
            .api
            .ingest_document(path)
            .await
            .map_err(|e| AppError::ingestion_failed(&target, e))?;
        info!("✓ 上传完成: {} (共 {} 页)", document.name, document.page_count);

        Ok(document)
    }

    /// 从远程存储拉取文档
    pub async fn bootstrap(&self, params: &BootstrapParams) -> AppResult<BootstrapResult> {
        info!("📁 正在从远程存储拉取文档: {}", params.folder);
        let result = self
            .api
            .bootstrap(params)
            .await
            .map_err(|e| AppError::ingestion_failed(&params.folder, e))?;
        info!("✓ 找到 {} 个文档", result.documents.len());

        Ok(result)
    }

    /// 根据运行请求生成工作计划
    ///
    /// 不依赖页数的校验在上传或拉取之前完成，无效请求不会产生任何网络请求
    pub async fn resolve(&self, request: &RunRequest) -> AppResult<WorkPlan> {
        check_request(request)?;

        match request.mode {
            RunMode::Single => {
                let (document, defaults) = if let Some(file) = &request.file {
                    (Some(self.ingest(Path::new(file)).await?), None)
                } else if let Some(params) = &request.bootstrap {
                    let result = self.bootstrap(params).await?;
                    if result.documents.len() > 1 {
                        warn!(
                            "⚠️ 单文档模式拉取到 {} 个文档，只处理第一个",
                            result.documents.len()
                        );
                    }
                    (result.documents.into_iter().next(), result.prompt_defaults)
                } else {
                    (None, None)
                };
                let prompt = request.prompt.resolve(defaults.as_ref());

                let pages = match (&request.pages, &request.selection, &document) {
                    (Some(pages), _, _) => pages.clone(),
                    (None, Some(strategy), Some(doc)) => quick_select(doc.page_count, strategy),
                    _ => Vec::new(),
                };

                build_single_plan(document, &pages, prompt, request.output.clone())
            }
            RunMode::Batch => {
                let params = request
                    .bootstrap
                    .as_ref()
                    .ok_or_else(|| AppError::invalid_selection("批量模式需要远程存储位置"))?;
                let result = self.bootstrap(params).await?;
                let prompt = request.prompt.resolve(result.prompt_defaults.as_ref());

                build_batch_plan(result.documents, prompt, request.output.clone())
            }
        }
    }
}

/// 不需要文档页数就能完成的校验
pub fn check_request(request: &RunRequest) -> AppResult<()> {
    request.prompt.resolve(None).validate()?;
    request.output.validate()?;

    match request.mode {
        RunMode::Single => {
            if request.file.is_none() && request.bootstrap.is_none() {
                return Err(AppError::invalid_selection(
                    "单文档模式需要上传文件或远程存储位置",
                ));
            }
            match (&request.pages, &request.selection) {
                (Some(pages), _) if pages.is_empty() => {
                    Err(AppError::invalid_selection("至少需要选择一页"))
                }
                (None, None) => Err(AppError::invalid_selection("没有选择页码")),
                _ => Ok(()),
            }
        }
        RunMode::Batch => {
            if request.bootstrap.is_none() {
                return Err(AppError::invalid_selection("批量模式需要远程存储位置"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::processing_api::MockProcessingApi;
    use crate::models::PromptDefaults;

    fn doc(id: &str, name: &str, pages: u32) -> DocumentReference {
        DocumentReference::new(id, name, pages)
    }

    #[test]
    fn single_plan_sorts_and_dedups() {
        let plan = build_single_plan(
            Some(doc("f1", "a.pdf", 10)),
            &[5, 1, 3, 3],
            PromptConfig::default(),
            OutputConfig::LocalDownload,
        )
        .unwrap();
        assert_eq!(plan.mode(), RunMode::Single);
        assert_eq!(plan.entries().len(), 1);
        assert_eq!(plan.entries()[0].pages, vec![1, 3, 5]);
        assert_eq!(plan.total_pages(), 3);
    }

    #[test]
    fn single_plan_requires_document_and_pages() {
        let err = build_single_plan(None, &[1], PromptConfig::default(), OutputConfig::LocalDownload)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection { .. }));

        let err = build_single_plan(
            Some(doc("f1", "a.pdf", 3)),
            &[],
            PromptConfig::default(),
            OutputConfig::LocalDownload,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection { .. }));
    }

    #[test]
    fn single_plan_rejects_out_of_range_pages() {
        let err = build_single_plan(
            Some(doc("f1", "a.pdf", 3)),
            &[1, 4],
            PromptConfig::default(),
            OutputConfig::LocalDownload,
        )
        .unwrap_err();
        assert!(err.to_string().contains("页码 4"));
    }

    #[test]
    fn batch_plan_covers_every_page() {
        let plan = build_batch_plan(
            vec![doc("a", "a.pdf", 2), doc("b", "b.pdf", 3)],
            PromptConfig::default(),
            OutputConfig::LocalDownload,
        )
        .unwrap();
        assert_eq!(plan.mode(), RunMode::Batch);
        assert_eq!(plan.entries()[0].pages, vec![1, 2]);
        assert_eq!(plan.entries()[1].pages, vec![1, 2, 3]);
        assert_eq!(plan.total_pages(), 5);
        assert_eq!(plan.documents_total(), 2);
    }

    #[test]
    fn batch_plan_rejects_empty_input() {
        assert!(build_batch_plan(vec![], PromptConfig::default(), OutputConfig::LocalDownload).is_err());
        assert!(build_batch_plan(
            vec![doc("a", "a.pdf", 0)],
            PromptConfig::default(),
            OutputConfig::LocalDownload
        )
        .is_err());
    }

    #[test]
    fn replanning_is_value_equal() {
        let build = || {
            build_single_plan(
                Some(doc("f1", "a.pdf", 10)),
                &[2, 4],
                PromptConfig::default(),
                OutputConfig::LocalDownload,
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn plan_rejects_invalid_remote_output() {
        let err = build_single_plan(
            Some(doc("f1", "a.pdf", 1)),
            &[1],
            PromptConfig::default(),
            OutputConfig::RemoteStore {
                folder: "/f".into(),
                filename: "out.txt".into(),
                context_id: "ctx".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection { .. }));
    }

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        assert!(is_allowed_file(Path::new("deck.PPTX")));
        assert!(is_allowed_file(Path::new("dir/memo.docx")));
        assert!(!is_allowed_file(Path::new("sheet.xlsx")));
        assert!(!is_allowed_file(Path::new("noext")));
    }

    #[tokio::test]
    async fn ingest_rejects_unsupported_type_without_network() {
        let mut api = MockProcessingApi::new();
        api.expect_ingest_document().times(0);
        let resolver = InputResolver::new(Arc::new(api));

        let err = resolver.ingest(Path::new("notes.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::Ingestion { .. }));
    }

    #[tokio::test]
    async fn ingest_failure_maps_to_ingestion_error() {
        let mut api = MockProcessingApi::new();
        api.expect_ingest_document()
            .times(1)
            .returning(|_| Err(ApiError::unsuccessful("/upload", Some("disk full".into()))));
        let resolver = InputResolver::new(Arc::new(api));

        let err = resolver.ingest(Path::new("report.pdf")).await.unwrap_err();
        assert_eq!(err.kind(), "IngestionError");
    }

    #[tokio::test]
    async fn batch_request_uses_bootstrap_documents_and_defaults() {
        let mut api = MockProcessingApi::new();
        api.expect_bootstrap().times(1).returning(|_| {
            Ok(BootstrapResult {
                documents: vec![
                    DocumentReference::new("a", "a.pdf", 2),
                    DocumentReference::new("b", "b.docx", 3),
                ],
                prompt_defaults: Some(PromptDefaults {
                    task: Some("classify each page".into()),
                    ..Default::default()
                }),
            })
        });
        let resolver = InputResolver::new(Arc::new(api));

        let request = crate::models::parse_run_request(
            r#"
            mode = "batch"
            [bootstrap]
            folder = "/in"
            "#,
            "inline",
        )
        .unwrap();

        let plan = resolver.resolve(&request).await.unwrap();
        assert_eq!(plan.total_pages(), 5);
        assert_eq!(plan.prompt().task, "classify each page");
    }

    #[tokio::test]
    async fn batch_request_without_location_is_invalid() {
        let mut api = MockProcessingApi::new();
        api.expect_bootstrap().times(0);
        let resolver = InputResolver::new(Arc::new(api));

        let request = crate::models::parse_run_request("mode = \"batch\"", "inline").unwrap();
        let err = resolver.resolve(&request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection { .. }));
    }

    #[tokio::test]
    async fn unknown_selection_strategy_yields_invalid_selection() {
        let mut api = MockProcessingApi::new();
        api.expect_bootstrap()
            .returning(|_| {
                Ok(BootstrapResult {
                    documents: vec![DocumentReference::new("a", "a.pdf", 4)],
                    prompt_defaults: None,
                })
            });
        let resolver = InputResolver::new(Arc::new(api));

        let request = crate::models::parse_run_request(
            r#"
            mode = "single"
            selection = "middle"
            [bootstrap]
            folder = "/in"
            "#,
            "inline",
        )
        .unwrap();
        let err = resolver.resolve(&request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection { .. }));
    }
}
