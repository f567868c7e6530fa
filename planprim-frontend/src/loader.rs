use std::path::{Path, PathBuf};

use planprim_config::AppConfig;
use planprim_core::document::SourceDocument;
use planprim_io::{DocumentLoader, PageDumpFacade};
use tracing::info;

use crate::errors::FrontendError;
use crate::resource_locator::DocumentLocator;

/// 已加载的文档与其解析后的实际路径。
#[derive(Debug)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: SourceDocument,
}

pub fn load_document(raw: &Path, config: &AppConfig) -> Result<LoadedDocument, FrontendError> {
    let path = DocumentLocator::from_config(config).resolve_or_original(raw);
    let document = PageDumpFacade::new().load(&path)?;
    info!(
        path = %path.display(),
        source = document.source(),
        pages = document.page_count(),
        "文档加载完成"
    );
    Ok(LoadedDocument { path, document })
}
