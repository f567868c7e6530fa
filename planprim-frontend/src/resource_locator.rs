use std::env;
use std::path::{Path, PathBuf};

use planprim_config::AppConfig;
use tracing::{debug, trace};

pub const INPUT_ROOTS_ENV: &str = "PLANPRIM_INPUT_ROOTS";

/// 解析命令行给出的输入路径：先看当前目录，再依次查找配置与环境变量中的搜索根。
pub struct DocumentLocator {
    search_roots: Vec<PathBuf>,
}

impl DocumentLocator {
    pub fn from_config(config: &AppConfig) -> Self {
        let env_roots = env::var_os(INPUT_ROOTS_ENV)
            .map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::with_roots(config.resources.input_roots.iter().cloned().chain(env_roots))
    }

    /// 仅保留存在的目录，去重并保持靠前优先级。
    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut deduped: Vec<PathBuf> = Vec::new();
        for root in roots.into_iter().filter(|path| path.is_dir()) {
            if !deduped.iter().any(|existing| existing == &root) {
                deduped.push(root);
            }
        }
        Self {
            search_roots: deduped,
        }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub fn resolve(&self, raw: &Path) -> Option<PathBuf> {
        if raw.is_file() {
            return Some(raw.to_path_buf());
        }
        if raw.is_absolute() {
            debug!(path = %raw.display(), "输入路径为绝对路径但未找到对应文件");
            return None;
        }
        self.search_roots.iter().find_map(|root| {
            let candidate = root.join(raw);
            trace!(candidate = %candidate.display(), "input locator candidate");
            candidate.is_file().then_some(candidate)
        })
    }

    /// 找不到时原样返回，由加载器报告 not-found。
    pub fn resolve_or_original(&self, raw: &Path) -> PathBuf {
        self.resolve(raw).unwrap_or_else(|| raw.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn finds_relative_input_in_search_roots() {
        let first = tempdir().expect("temp dir");
        let second = tempdir().expect("temp dir");
        fs::write(second.path().join("plan.json"), "{}").expect("write");

        let locator = DocumentLocator::with_roots([
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            first.path().to_path_buf(),
            PathBuf::from("/definitely/not/a/dir"),
        ]);
        assert_eq!(locator.search_roots().len(), 2);
        assert_eq!(
            locator.resolve(Path::new("plan.json")),
            Some(second.path().join("plan.json"))
        );
        assert!(locator.resolve(Path::new("other.json")).is_none());
        assert_eq!(
            locator.resolve_or_original(Path::new("other.json")),
            PathBuf::from("other.json")
        );
    }

    #[test]
    fn existing_absolute_path_is_returned_as_is() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("a.json");
        fs::write(&path, "{}").expect("write");
        let locator = DocumentLocator::with_roots(Vec::new());
        assert_eq!(locator.resolve(&path), Some(path.clone()));
        assert!(locator.resolve(&dir.path().join("missing.json")).is_none());
    }
}
