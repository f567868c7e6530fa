//! 文档统计：线宽分布、分类阈值与结构图层识别。

use std::collections::BTreeSet;

use planprim_core::document::{LayerRef, LayerRegistry, Page};
use tracing::debug;

/// 页面没有任何正线宽时代入的合成线宽。
pub const FALLBACK_STROKE_WIDTH: f64 = 0.1;

/// 结构图层名关键字（小写，子串匹配），覆盖英文与法文图纸惯例。
pub const DEFAULT_STRUCTURAL_KEYWORDS: &[&str] = &[
    "wall",
    "mur",
    "refend",
    "cloison",
    "partition",
    "struct",
    "porteur",
    "bearing",
    "béton",
    "beton",
    "concrete",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub wall: f64,
    pub medium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthStatistics {
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub max: f64,
    /// 参与统计的正线宽数量（合成回退时为 0）。
    pub sample_count: usize,
    pub synthetic: bool,
}

impl WidthStatistics {
    /// 只统计有限正值；为空时以 [`FALLBACK_STROKE_WIDTH`] 作为唯一样本。
    pub fn from_widths(widths: &[f64]) -> Self {
        let mut samples: Vec<f64> = widths.iter().copied().filter(is_width_sample).collect();
        let sample_count = samples.len();
        let synthetic = samples.is_empty();
        if synthetic {
            samples.push(FALLBACK_STROKE_WIDTH);
        }
        samples.sort_by(|a, b| a.total_cmp(b));

        Self {
            p50: percentile(&samples, 50.0),
            p75: percentile(&samples, 75.0),
            p90: percentile(&samples, 90.0),
            p95: percentile(&samples, 95.0),
            max: samples[samples.len() - 1],
            sample_count,
            synthetic,
        }
    }

    #[inline]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            wall: self.p90,
            medium: self.p50,
        }
    }
}

#[inline]
fn is_width_sample(width: &f64) -> bool {
    width.is_finite() && *width > 0.0
}

/// `wall = p90`，`medium = p50`；由百分位单调性保证 `medium <= wall`。
pub fn thresholds(widths: &[f64]) -> Thresholds {
    WidthStatistics::from_widths(widths).thresholds()
}

/// 线性插值百分位（与常见数值库默认方法一致）。`sorted` 必须非空且升序。
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// 按阈值划分的路径数量（粗 / 中 / 细）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidthDistribution {
    pub thick: usize,
    pub medium: usize,
    pub thin: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    pub has_registry: bool,
    pub layer_count: usize,
    pub structural_layers: BTreeSet<LayerRef>,
    pub total_paths: usize,
    pub total_items: usize,
    pub statistics: WidthStatistics,
    pub thresholds: Thresholds,
    pub distribution: WidthDistribution,
}

#[derive(Debug, Clone)]
pub struct DocumentStatsAnalyzer {
    keywords: Vec<String>,
}

impl DocumentStatsAnalyzer {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|kw| kw.as_ref().trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn with_default_keywords() -> Self {
        Self::new(DEFAULT_STRUCTURAL_KEYWORDS.iter().copied())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// 大小写不敏感的子串匹配。
    pub fn is_structural_name(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.keywords.iter().any(|kw| lowered.contains(kw.as_str()))
    }

    pub fn structural_layers(&self, registry: Option<&LayerRegistry>) -> BTreeSet<LayerRef> {
        registry
            .map(|registry| {
                registry
                    .iter()
                    .filter(|layer| self.is_structural_name(&layer.name))
                    .map(|layer| layer.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 分析单页。不会失败：缺少数据本身就是一种结果。
    pub fn analyze(&self, registry: Option<&LayerRegistry>, page: &Page) -> DocumentAnalysis {
        let widths: Vec<f64> = page.paths.iter().map(|path| path.stroke_width).collect();
        let statistics = WidthStatistics::from_widths(&widths);
        let thresholds = statistics.thresholds();

        let mut distribution = WidthDistribution::default();
        // 与统计同一批样本：未描边的路径不计入“细线”。
        for width in widths.iter().filter(|w| is_width_sample(w)) {
            if *width >= thresholds.wall {
                distribution.thick += 1;
            } else if *width >= thresholds.medium {
                distribution.medium += 1;
            } else {
                distribution.thin += 1;
            }
        }

        let structural_layers = self.structural_layers(registry);
        debug!(
            samples = statistics.sample_count,
            synthetic = statistics.synthetic,
            wall = thresholds.wall,
            medium = thresholds.medium,
            structural_layers = structural_layers.len(),
            "线宽统计完成"
        );

        DocumentAnalysis {
            has_registry: registry.is_some_and(|r| !r.is_empty()),
            layer_count: registry.map_or(0, LayerRegistry::len),
            structural_layers,
            total_paths: page.paths.len(),
            total_items: page.item_count(),
            statistics,
            thresholds,
            distribution,
        }
    }
}

impl Default for DocumentStatsAnalyzer {
    fn default() -> Self {
        Self::with_default_keywords()
    }
}
