use std::path::PathBuf;

use planprim_engine::errors::PipelineError;
use planprim_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("加载输入文档失败: {0}")]
    Load(#[from] IoError),
    #[error("流水线在 {} 阶段失败: {}", .0.stage(), .0)]
    Pipeline(#[from] PipelineError),
    #[error("写出结果 {path:?} 失败: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}

impl FrontendError {
    /// 出错阶段名称，用于命令行诊断。
    pub fn stage(&self) -> &'static str {
        match self {
            FrontendError::Load(_) => "load",
            FrontendError::Pipeline(err) => err.stage().as_str(),
            FrontendError::Write { .. } => "write",
        }
    }
}
