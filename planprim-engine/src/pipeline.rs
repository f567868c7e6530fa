//! 单页流水线：统计 → 区域 → 提取/分类 → 缩放过滤 → 输出。

use planprim_core::document::SourceDocument;
use planprim_core::output::{PipelineResult, ResultMetadata, UNIFORM_DISPLAY_WIDTH};
use tracing::{debug, info, warn};

use crate::classify::StructuralClassifier;
use crate::errors::PipelineError;
use crate::extract::PrimitiveExtractor;
use crate::output::OutputAssembler;
use crate::report::{DistributionWarning, FilterReport, LengthSummary, check_distribution};
use crate::rescale::{DEFAULT_TARGET_SIZE, MinLengths, RescalerFilter};
use crate::stats::{DEFAULT_STRUCTURAL_KEYWORDS, DocumentAnalysis, DocumentStatsAnalyzer};
use crate::zones::{ZoneDetector, ZoneKind, ZoneOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub target_size: f64,
    pub uniform_width: f64,
    pub min_lengths: MinLengths,
    pub zones: ZoneOptions,
    pub page_index: usize,
    pub skip_hidden_layers: bool,
    pub structural_keywords: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            uniform_width: UNIFORM_DISPLAY_WIDTH,
            min_lengths: MinLengths::default(),
            zones: ZoneOptions::default(),
            page_index: 0,
            skip_hidden_layers: false,
            structural_keywords: DEFAULT_STRUCTURAL_KEYWORDS
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneSummary {
    pub text: usize,
    pub title_block: usize,
    pub legend: usize,
}

/// 一次运行的全部产物与诊断信息。
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub result: PipelineResult,
    pub report: FilterReport,
    pub analysis: DocumentAnalysis,
    pub page_index: usize,
    pub scale: f64,
    pub zones: ZoneSummary,
    pub lengths: Option<LengthSummary>,
    pub warnings: Vec<DistributionWarning>,
}

/// 空结果不是错误，但必须与正常结果区分开。
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Populated(PipelineRun),
    /// 有候选图元，但全部被过滤。
    FilteredEmpty(PipelineRun),
}

impl PipelineOutcome {
    pub fn run(&self) -> &PipelineRun {
        match self {
            PipelineOutcome::Populated(run) | PipelineOutcome::FilteredEmpty(run) => run,
        }
    }

    pub fn into_run(self) -> PipelineRun {
        match self {
            PipelineOutcome::Populated(run) | PipelineOutcome::FilteredEmpty(run) => run,
        }
    }

    #[inline]
    pub fn is_populated(&self) -> bool {
        matches!(self, PipelineOutcome::Populated(_))
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    analyzer: DocumentStatsAnalyzer,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        let analyzer = DocumentStatsAnalyzer::new(&options.structural_keywords);
        Self { options, analyzer }
    }

    pub fn run(&self, document: &SourceDocument) -> Result<PipelineOutcome, PipelineError> {
        let page_index = self.options.page_index;
        let page = document
            .page(page_index)
            .ok_or(PipelineError::PageNotFound {
                index: page_index,
                page_count: document.page_count(),
            })?;
        let registry = document.registry();

        let analysis = self.analyzer.analyze(registry, page);
        info!(
            source = document.source(),
            page = page_index,
            paths = analysis.total_paths,
            items = analysis.total_items,
            has_registry = analysis.has_registry,
            structural_layers = analysis.structural_layers.len(),
            wall_threshold = analysis.thresholds.wall,
            medium_threshold = analysis.thresholds.medium,
            "文档分析完成"
        );

        let rescaler = RescalerFilter::for_page(
            page_index,
            page,
            self.options.target_size,
            self.options.min_lengths,
        )?;

        let zones = ZoneDetector::new(self.options.zones.clone()).detect(page);
        let classifier = StructuralClassifier::from_analysis(&analysis);
        let extraction = PrimitiveExtractor::new(&classifier, &zones, registry)
            .skip_hidden_layers(self.options.skip_hidden_layers)
            .extract(page);

        let candidates = extraction.candidates.len();
        let filtered = rescaler.apply(extraction.candidates);
        let report = FilterReport {
            extracted: extraction.extracted,
            hidden_layer_excluded: extraction.hidden_layer_excluded,
            zone_excluded: extraction.zone_excluded,
            candidates,
            length_excluded: filtered.length_excluded,
            kept: filtered.kept_counts,
        };

        let metadata = ResultMetadata {
            source: document.source().to_string(),
            has_layer_registry: analysis.has_registry,
            wall_threshold: analysis.thresholds.wall,
            medium_threshold: analysis.thresholds.medium,
        };
        let result = OutputAssembler::new(self.options.uniform_width).assemble(
            rescaler.canvas_size(),
            &filtered.kept,
            metadata,
        );

        let lengths = LengthSummary::from_lengths(&result.lengths);
        let warnings = lengths.as_ref().map(check_distribution).unwrap_or_default();
        for warning in &warnings {
            warn!(%warning, "输出分布偏离训练数据");
        }
        debug!(
            extracted = report.extracted,
            candidates = report.candidates,
            kept = report.kept_total(),
            "流水线完成"
        );

        let run = PipelineRun {
            result,
            report,
            analysis,
            page_index,
            scale: rescaler.scale(),
            zones: ZoneSummary {
                text: zones.count(ZoneKind::Text),
                title_block: zones.count(ZoneKind::TitleBlock),
                legend: zones.count(ZoneKind::Legend),
            },
            lengths,
            warnings,
        };

        if run.report.filtered_everything() {
            warn!(
                extracted = run.report.extracted,
                candidates = run.report.candidates,
                "所有图元均被过滤"
            );
            return Ok(PipelineOutcome::FilteredEmpty(run));
        }
        Ok(PipelineOutcome::Populated(run))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}
