//! 结构分类：图层名证据优先，线宽证据兜底。

use std::collections::BTreeSet;

use planprim_core::document::{DrawPath, LayerRef, LayerRegistry};
use planprim_core::primitive::StructuralClass;

use crate::stats::{DocumentAnalysis, Thresholds};

/// 单条分类证据。
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// 路径所在图层的名称命中结构关键字。
    StructuralLayer(String),
    StrokeWidth(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceSource {
    LayerName,
    Width,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub class: StructuralClass,
    pub source: EvidenceSource,
}

/// 按线宽分层，每一档的下界都是闭区间（相等时归入更重要的一档）。
pub fn classify_width(width: f64, thresholds: Thresholds) -> StructuralClass {
    if width >= thresholds.wall {
        StructuralClass::Wall
    } else if width >= thresholds.medium {
        StructuralClass::Medium
    } else {
        StructuralClass::Detail
    }
}

/// 唯一的优先级裁决点：任一图层证据即判为墙体，否则取线宽证据；
/// 没有任何证据时按线宽 0 处理。
pub fn resolve(evidence: &[Evidence], thresholds: Thresholds) -> Classification {
    if evidence
        .iter()
        .any(|e| matches!(e, Evidence::StructuralLayer(_)))
    {
        return Classification {
            class: StructuralClass::Wall,
            source: EvidenceSource::LayerName,
        };
    }
    let width = evidence
        .iter()
        .find_map(|e| match e {
            Evidence::StrokeWidth(width) => Some(*width),
            Evidence::StructuralLayer(_) => None,
        })
        .unwrap_or(0.0);
    Classification {
        class: classify_width(width, thresholds),
        source: EvidenceSource::Width,
    }
}

#[derive(Debug, Clone)]
pub struct StructuralClassifier {
    thresholds: Thresholds,
    structural_layers: BTreeSet<LayerRef>,
}

impl StructuralClassifier {
    pub fn new(thresholds: Thresholds, structural_layers: BTreeSet<LayerRef>) -> Self {
        Self {
            thresholds,
            structural_layers,
        }
    }

    pub fn from_analysis(analysis: &DocumentAnalysis) -> Self {
        Self::new(analysis.thresholds, analysis.structural_layers.clone())
    }

    pub fn evidence_for(&self, path: &DrawPath, registry: Option<&LayerRegistry>) -> Vec<Evidence> {
        let mut evidence = Vec::with_capacity(2);
        if let Some(layer) = path.layer.as_ref() {
            if self.structural_layers.contains(layer) {
                let name = registry
                    .and_then(|registry| registry.get(layer))
                    .map(|info| info.name.clone())
                    .unwrap_or_else(|| layer.to_string());
                evidence.push(Evidence::StructuralLayer(name));
            }
        }
        evidence.push(Evidence::StrokeWidth(path.stroke_width));
        evidence
    }

    pub fn classify_path(&self, path: &DrawPath, registry: Option<&LayerRegistry>) -> Classification {
        resolve(&self.evidence_for(path, registry), self.thresholds)
    }
}
