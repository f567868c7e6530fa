use std::path::{Path, PathBuf};

use planprim_config::{AppConfig, PipelineConfig};
use planprim_engine::rescale::MinLengths;
use planprim_engine::zones::ZoneOptions;
use planprim_engine::{Pipeline, PipelineOptions, PipelineOutcome};
use planprim_io::{JsonResultWriter, ResultSaver};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::load_document;

const OUTPUT_SUFFIX: &str = "_s2.json";

/// 命令行对配置的覆盖项。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOverrides {
    pub page: Option<usize>,
    pub target_size: Option<f64>,
    pub no_exclude_text: bool,
    /// 关闭图签与图例裁切。
    pub no_crop: bool,
}

impl ConvertOverrides {
    pub fn apply(&self, options: &mut PipelineOptions) {
        if let Some(page) = self.page {
            options.page_index = page;
        }
        if let Some(target_size) = self.target_size {
            options.target_size = target_size;
        }
        if self.no_exclude_text {
            options.zones.exclude_text = false;
        }
        if self.no_crop {
            options.zones.exclude_layout = false;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub overrides: ConvertOverrides,
}

#[derive(Debug)]
pub struct ConvertSummary {
    pub input: PathBuf,
    /// 空结果时不写文件。
    pub output: Option<PathBuf>,
    pub outcome: PipelineOutcome,
}

pub fn pipeline_options(config: &PipelineConfig) -> PipelineOptions {
    let defaults = PipelineOptions::default();
    PipelineOptions {
        target_size: config.target_size,
        uniform_width: config.uniform_width,
        min_lengths: MinLengths {
            wall: config.min_length.wall,
            medium: config.min_length.medium,
            detail: config.min_length.detail,
        },
        zones: ZoneOptions {
            exclude_text: config.zones.exclude_text,
            exclude_layout: config.zones.exclude_layout,
            text_margin: config.zones.text_margin,
            title_block_min_chars: config.zones.title_block_min_chars,
        },
        page_index: config.page,
        skip_hidden_layers: config.skip_hidden_layers,
        structural_keywords: config
            .structural_keywords
            .clone()
            .unwrap_or(defaults.structural_keywords),
    }
}

/// `<输入文件名去扩展名>_s2.json`，与输入同目录。
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

pub fn convert(request: &ConvertRequest, config: &AppConfig) -> Result<ConvertSummary, FrontendError> {
    let loaded = load_document(&request.input, config)?;

    let mut options = pipeline_options(&config.pipeline);
    request.overrides.apply(&mut options);
    let outcome = Pipeline::new(options).run(&loaded.document)?;

    let output = match &outcome {
        PipelineOutcome::Populated(run) => {
            let path = request
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(&loaded.path));
            JsonResultWriter::new()
                .save(&run.result, &path)
                .map_err(|source| FrontendError::Write {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), primitives = run.result.len(), "结果已保存");
            Some(path)
        }
        PipelineOutcome::FilteredEmpty(run) => {
            warn!(
                candidates = run.report.candidates,
                "过滤后没有保留任何图元，未写出结果"
            );
            None
        }
    };

    Ok(ConvertSummary {
        input: loaded.path,
        output,
        outcome,
    })
}
