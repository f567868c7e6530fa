//! 过滤计数与长度分布诊断。

use std::fmt;

use planprim_core::primitive::StructuralClass;

/// 目标训练分布下单页图元数量的合理上限。
pub const MAX_EXPECTED_PRIMITIVES: usize = 5000;
/// 平均长度低于此值说明碎线过多。
pub const MIN_EXPECTED_MEAN_LENGTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub wall: usize,
    pub medium: usize,
    pub detail: usize,
}

impl ClassCounts {
    pub fn get(&self, class: StructuralClass) -> usize {
        match class {
            StructuralClass::Wall => self.wall,
            StructuralClass::Medium => self.medium,
            StructuralClass::Detail => self.detail,
        }
    }

    pub fn increment(&mut self, class: StructuralClass) {
        match class {
            StructuralClass::Wall => self.wall += 1,
            StructuralClass::Medium => self.medium += 1,
            StructuralClass::Detail => self.detail += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wall + self.medium + self.detail
    }
}

/// 每个被丢弃的图元都恰好归因于一个过滤器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    HiddenLayer,
    ZoneExcluded,
    BelowMinLength(StructuralClass),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::HiddenLayer => f.write_str("hidden-layer"),
            DropReason::ZoneExcluded => f.write_str("zone-excluded"),
            DropReason::BelowMinLength(class) => write!(f, "length-excluded({})", class.as_str()),
        }
    }
}

/// 各阶段图元数量。`extracted = hidden + zone + candidates`，
/// `candidates = length_excluded + kept`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub extracted: usize,
    pub hidden_layer_excluded: usize,
    pub zone_excluded: usize,
    pub candidates: usize,
    pub length_excluded: ClassCounts,
    pub kept: ClassCounts,
}

impl FilterReport {
    pub fn dropped(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::HiddenLayer => self.hidden_layer_excluded,
            DropReason::ZoneExcluded => self.zone_excluded,
            DropReason::BelowMinLength(class) => self.length_excluded.get(class),
        }
    }

    #[inline]
    pub fn kept_total(&self) -> usize {
        self.kept.total()
    }

    /// 有候选但全部被过滤。
    #[inline]
    pub fn filtered_everything(&self) -> bool {
        self.extracted > 0 && self.kept_total() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl LengthSummary {
    pub fn from_lengths(lengths: &[f64]) -> Option<Self> {
        if lengths.is_empty() {
            return None;
        }
        let mut sorted = lengths.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let count = sorted.len();
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) * 0.5
        };
        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
            median,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionWarning {
    TooManyPrimitives { count: usize, limit: usize },
    LengthsTooShort { mean: f64, minimum: f64 },
}

impl fmt::Display for DistributionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionWarning::TooManyPrimitives { count, limit } => {
                write!(f, "{count} primitives exceed the expected maximum of {limit}")
            }
            DistributionWarning::LengthsTooShort { mean, minimum } => {
                write!(f, "mean length {mean:.2} is below the expected {minimum:.2}")
            }
        }
    }
}

pub fn check_distribution(summary: &LengthSummary) -> Vec<DistributionWarning> {
    let mut warnings = Vec::new();
    if summary.count > MAX_EXPECTED_PRIMITIVES {
        warnings.push(DistributionWarning::TooManyPrimitives {
            count: summary.count,
            limit: MAX_EXPECTED_PRIMITIVES,
        });
    }
    if summary.mean < MIN_EXPECTED_MEAN_LENGTH {
        warnings.push(DistributionWarning::LengthsTooShort {
            mean: summary.mean,
            minimum: MIN_EXPECTED_MEAN_LENGTH,
        });
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_odd_and_even_counts() {
        let odd = LengthSummary::from_lengths(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(odd.count, 3);
        assert!((odd.median - 2.0).abs() < 1e-12);
        assert!((odd.mean - 2.0).abs() < 1e-12);
        assert!((odd.min - 1.0).abs() < 1e-12);
        assert!((odd.max - 3.0).abs() < 1e-12);

        let even = LengthSummary::from_lengths(&[4.0, 1.0, 2.0, 3.0]).unwrap();
        assert!((even.median - 2.5).abs() < 1e-12);

        assert!(LengthSummary::from_lengths(&[]).is_none());
    }

    #[test]
    fn short_mean_triggers_warning() {
        let summary = LengthSummary::from_lengths(&[1.0, 1.5, 2.0]).unwrap();
        let warnings = check_distribution(&summary);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            DistributionWarning::LengthsTooShort { .. }
        ));

        let healthy = LengthSummary::from_lengths(&[5.0, 6.0]).unwrap();
        assert!(check_distribution(&healthy).is_empty());
    }

    #[test]
    fn report_attributes_drops() {
        let mut report = FilterReport {
            extracted: 10,
            hidden_layer_excluded: 1,
            zone_excluded: 2,
            candidates: 7,
            ..FilterReport::default()
        };
        report.length_excluded.increment(StructuralClass::Detail);
        report.kept.increment(StructuralClass::Wall);
        assert_eq!(report.dropped(DropReason::HiddenLayer), 1);
        assert_eq!(report.dropped(DropReason::ZoneExcluded), 2);
        assert_eq!(
            report.dropped(DropReason::BelowMinLength(StructuralClass::Detail)),
            1
        );
        assert_eq!(report.kept_total(), 1);
        assert!(!report.filtered_everything());
        assert_eq!(
            DropReason::BelowMinLength(StructuralClass::Medium).to_string(),
            "length-excluded(medium)"
        );
    }
}
