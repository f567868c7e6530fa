pub mod cli;
pub mod convert;
pub mod errors;
pub mod loader;
pub mod resource_locator;

use std::path::{Path, PathBuf};

use convert::{ConvertRequest, convert};
use errors::FrontendError;
use planprim_config::AppConfig;
use planprim_engine::PipelineOutcome;
use planprim_engine::inspect::DocumentInspection;
use planprim_io::JsonResultWriter;
use tracing::info;

/// 转换的最终状态，供二进制映射为退出码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStatus {
    Written,
    FilteredEmpty,
}

/// 执行转换并打印摘要；`print_json` 时额外把结果 JSON 打到标准输出。
pub fn run_convert(
    request: &ConvertRequest,
    config: &AppConfig,
    print_json: bool,
) -> Result<ConvertStatus, FrontendError> {
    info!(input = %request.input.display(), "开始转换");
    let summary = convert(request, config)?;
    cli::print_convert_summary(&summary);

    if print_json {
        let json = JsonResultWriter::new()
            .pretty(true)
            .render(&summary.outcome.run().result)
            .map_err(|source| FrontendError::Write {
                path: PathBuf::from("-"),
                source,
            })?;
        println!("{json}");
    }

    Ok(match summary.outcome {
        PipelineOutcome::Populated(_) => ConvertStatus::Written,
        PipelineOutcome::FilteredEmpty(_) => ConvertStatus::FilteredEmpty,
    })
}

/// 加载文档并打印检查报告。
pub fn run_inspect(input: &Path, config: &AppConfig) -> Result<DocumentInspection, FrontendError> {
    let loaded = loader::load_document(input, config)?;
    let inspection = DocumentInspection::of(&loaded.document);
    cli::print_inspection(&inspection);
    Ok(inspection)
}
