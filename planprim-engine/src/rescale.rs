//! 缩放到目标画布并按类别最小长度过滤。

use planprim_core::document::Page;
use planprim_core::primitive::{Primitive, StructuralClass};
use tracing::debug;

use crate::errors::PipelineError;
use crate::report::ClassCounts;

/// 长边缩放到的目标尺寸。
pub const DEFAULT_TARGET_SIZE: f64 = 140.0;

/// 各类别的最小保留长度（缩放后单位）。墙体最宽松，细节最严格。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinLengths {
    pub wall: f64,
    pub medium: f64,
    pub detail: f64,
}

impl MinLengths {
    #[inline]
    pub fn for_class(&self, class: StructuralClass) -> f64 {
        match class {
            StructuralClass::Wall => self.wall,
            StructuralClass::Medium => self.medium,
            StructuralClass::Detail => self.detail,
        }
    }
}

impl Default for MinLengths {
    fn default() -> Self {
        Self {
            wall: 1.0,
            medium: 2.0,
            detail: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filtered {
    pub kept: Vec<Primitive>,
    pub kept_counts: ClassCounts,
    pub length_excluded: ClassCounts,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescalerFilter {
    scale: f64,
    page_width: f64,
    page_height: f64,
    min_lengths: MinLengths,
}

impl RescalerFilter {
    /// `page_index` 只用于错误信息。
    pub fn for_page(
        page_index: usize,
        page: &Page,
        target_size: f64,
        min_lengths: MinLengths,
    ) -> Result<Self, PipelineError> {
        if !(target_size.is_finite() && target_size > 0.0) {
            return Err(PipelineError::InvalidOption {
                name: "target_size",
                value: target_size,
            });
        }
        let valid_side = |side: f64| side.is_finite() && side >= 0.0;
        let extent = page.width.max(page.height);
        if !(valid_side(page.width) && valid_side(page.height) && extent > 0.0) {
            return Err(PipelineError::DegenerateGeometry {
                page: page_index,
                width: page.width,
                height: page.height,
            });
        }
        Ok(Self {
            scale: target_size / extent,
            page_width: page.width,
            page_height: page.height,
            min_lengths,
        })
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 四舍五入后的画布尺寸。
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            round_dimension(self.page_width * self.scale),
            round_dimension(self.page_height * self.scale),
        )
    }

    pub fn apply(&self, candidates: Vec<Primitive>) -> Filtered {
        let mut filtered = Filtered::default();
        for primitive in candidates {
            let primitive = primitive.rescaled(self.scale);
            let class = primitive.structural_class;
            if primitive.length >= self.min_lengths.for_class(class) {
                filtered.kept_counts.increment(class);
                filtered.kept.push(primitive);
            } else {
                filtered.length_excluded.increment(class);
            }
        }
        debug!(
            scale = self.scale,
            kept = filtered.kept.len(),
            length_excluded = filtered.length_excluded.total(),
            "缩放与长度过滤完成"
        );
        filtered
    }
}

fn round_dimension(value: f64) -> u32 {
    let rounded = value.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}
