pub mod classify;
pub mod extract;
pub mod inspect;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod rescale;
pub mod stats;
pub mod zones;

pub use pipeline::{Pipeline, PipelineOptions, PipelineOutcome, PipelineRun};

pub mod errors {
    use std::fmt;

    use thiserror::Error;

    /// 流水线阶段，用于在致命错误中指明出错位置。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PipelineStage {
        Analysis,
        Rescale,
    }

    impl PipelineStage {
        pub fn as_str(self) -> &'static str {
            match self {
                PipelineStage::Analysis => "analysis",
                PipelineStage::Rescale => "rescale",
            }
        }
    }

    impl fmt::Display for PipelineStage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Error)]
    pub enum PipelineError {
        #[error("page {index} not found (document has {page_count} pages)")]
        PageNotFound { index: usize, page_count: usize },
        #[error("page {page} has degenerate geometry ({width} x {height})")]
        DegenerateGeometry { page: usize, width: f64, height: f64 },
        #[error("invalid option {name}: {value}")]
        InvalidOption { name: &'static str, value: f64 },
    }

    impl PipelineError {
        pub fn stage(&self) -> PipelineStage {
            match self {
                PipelineError::PageNotFound { .. } => PipelineStage::Analysis,
                PipelineError::DegenerateGeometry { .. } => PipelineStage::Rescale,
                PipelineError::InvalidOption { .. } => PipelineStage::Rescale,
            }
        }
    }
}
