use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use planprim_core::document::{
    DrawItem, DrawPath, LayerInfo, LayerRef, LayerRegistry, Page, SourceDocument, TextBlock,
};
use planprim_core::geometry::{Point2, Rect};
use planprim_core::output::PipelineResult;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("input document {path:?} does not exist")]
    NotFound { path: PathBuf },
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("failed to serialize result: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<SourceDocument, IoError>;
}

pub trait ResultSaver {
    fn save(&self, result: &PipelineResult, path: &Path) -> Result<(), IoError>;
}

/// 读取渲染器导出的 JSON 页面转储。
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDumpFacade;

impl PageDumpFacade {
    pub fn new() -> Self {
        Self
    }

    /// 解析转储文本；`fallback_source` 在转储未给出 `source` 时使用。
    pub fn parse(&self, data: &str, fallback_source: &str) -> Result<SourceDocument, IoError> {
        let dump: DumpDocument =
            serde_json::from_str(data).map_err(|err| IoError::InvalidDocument(err.to_string()))?;
        dump.into_document(fallback_source)
    }
}

impl DocumentLoader for PageDumpFacade {
    fn load(&self, path: &Path) -> Result<SourceDocument, IoError> {
        if !path.is_file() {
            return Err(IoError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let fallback = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let document = self.parse(&data, &fallback)?;
        debug!(
            path = %path.display(),
            pages = document.page_count(),
            has_registry = document.has_registry(),
            "页面转储读取完成"
        );
        Ok(document)
    }
}

/// 把流水线结果写成 JSON。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultWriter {
    pretty: bool,
}

impl JsonResultWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn render(&self, result: &PipelineResult) -> Result<String, IoError> {
        if self.pretty {
            serde_json::to_string_pretty(result).map_err(IoError::Serialize)
        } else {
            serde_json::to_string(result).map_err(IoError::Serialize)
        }
    }
}

impl ResultSaver for JsonResultWriter {
    fn save(&self, result: &PipelineResult, path: &Path) -> Result<(), IoError> {
        let data = self.render(result)?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), primitives = result.len(), "结果已写出");
        Ok(())
    }
}

/// 尽力读取可选的图层注册表：格式不对就当作没有，空表同样视为没有。
pub fn try_read_registry(value: &Value) -> Option<LayerRegistry> {
    let layers = match BTreeMap::<String, DumpLayer>::deserialize(value) {
        Ok(layers) => layers,
        Err(err) => {
            debug!(error = %err, "图层注册表无法解析，按无注册表处理");
            return None;
        }
    };
    let registry: LayerRegistry = layers
        .into_iter()
        .map(|(id, layer)| LayerInfo::new(LayerRef::new(id), layer.name, layer.visible))
        .collect();
    (!registry.is_empty()).then_some(registry)
}

#[derive(Debug, Deserialize)]
struct DumpDocument {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    layers: Option<Value>,
    pages: Vec<DumpPage>,
}

impl DumpDocument {
    fn into_document(self, fallback_source: &str) -> Result<SourceDocument, IoError> {
        let source = self
            .source
            .filter(|source| !source.trim().is_empty())
            .unwrap_or_else(|| fallback_source.to_string());
        let mut document = SourceDocument::new(source);
        document.set_registry(self.layers.as_ref().and_then(try_read_registry));
        for (index, page) in self.pages.into_iter().enumerate() {
            document.add_page(page.into_page(index)?);
        }
        Ok(document)
    }
}

#[derive(Debug, Deserialize)]
struct DumpLayer {
    #[serde(default)]
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct DumpPage {
    width: f64,
    height: f64,
    #[serde(default)]
    paths: Vec<DumpPath>,
    #[serde(default)]
    text_blocks: Vec<DumpTextBlock>,
}

impl DumpPage {
    fn into_page(self, index: usize) -> Result<Page, IoError> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(IoError::InvalidDocument(format!(
                "page {index} has a non-finite size"
            )));
        }
        let mut page = Page::new(self.width, self.height);
        for path in self.paths {
            page.add_path(path.into_path());
        }
        for block in self.text_blocks {
            page.add_text_block(TextBlock::new(rect_from(block.bbox), block.text));
        }
        Ok(page)
    }
}

/// 图层引用在不同渲染器里可能是字符串或对象编号；其他形式按无图层处理。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpLayerRef {
    Name(String),
    Number(serde_json::Number),
    Other(Value),
}

impl DumpLayerRef {
    fn into_ref(self) -> Option<LayerRef> {
        match self {
            DumpLayerRef::Name(name) => Some(LayerRef::new(name)),
            DumpLayerRef::Number(number) => Some(LayerRef::new(number.to_string())),
            DumpLayerRef::Other(value) => {
                debug!(layer = %value, "无法识别的图层引用，按无图层处理");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DumpPath {
    #[serde(default)]
    layer: Option<DumpLayerRef>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    items: Vec<DumpItem>,
}

impl DumpPath {
    fn into_path(self) -> DrawPath {
        let mut path = DrawPath::new(self.width.unwrap_or(0.0));
        if let Some(layer) = self.layer.and_then(DumpLayerRef::into_ref) {
            path = path.on_layer(layer);
        }
        path.items = self.items.into_iter().map(DumpItem::into_item).collect();
        path
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum DumpItem {
    Line { points: [[f64; 2]; 2] },
    Cubic { points: [[f64; 2]; 4] },
    Rect { rect: [f64; 4] },
    Quad { points: [[f64; 2]; 4] },
}

impl DumpItem {
    fn into_item(self) -> DrawItem {
        match self {
            DumpItem::Line { points } => DrawItem::Line {
                start: point_from(points[0]),
                end: point_from(points[1]),
            },
            DumpItem::Cubic { points } => DrawItem::Cubic {
                points: points.map(point_from),
            },
            DumpItem::Rect { rect } => DrawItem::Rect(rect_from(rect)),
            DumpItem::Quad { points } => DrawItem::Quad {
                points: points.map(point_from),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct DumpTextBlock {
    bbox: [f64; 4],
    #[serde(default)]
    text: String,
}

#[inline]
fn point_from([x, y]: [f64; 2]) -> Point2 {
    Point2::new(x, y)
}

#[inline]
fn rect_from([x0, y0, x1, y1]: [f64; 4]) -> Rect {
    Rect::from_coords(x0, y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn registry_read_is_best_effort() {
        let good = json!({
            "7": {"name": "MURS", "visible": true},
            "8": {"name": "TEXTE"}
        });
        let registry = try_read_registry(&good).expect("registry");
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&LayerRef::new("8")).unwrap().visible);

        assert!(try_read_registry(&json!({})).is_none());
        assert!(try_read_registry(&json!([1, 2, 3])).is_none());
        assert!(try_read_registry(&json!({"7": {"name": 12}})).is_none());
        assert!(try_read_registry(&Value::Null).is_none());
    }

    #[test]
    fn parse_minimal_dump() {
        let data = r#"{
            "pages": [{
                "width": 595.0, "height": 842.0,
                "paths": [
                    {"layer": 12, "width": null, "items": [
                        {"kind": "line", "points": [[0, 0], [10, 0]]},
                        {"kind": "rect", "rect": [5, 5, 1, 1]}
                    ]}
                ]
            }]
        }"#;
        let doc = PageDumpFacade::new().parse(data, "plan.json").unwrap();
        assert_eq!(doc.source(), "plan.json");
        assert!(!doc.has_registry());
        let page = doc.page(0).unwrap();
        assert_eq!(page.paths.len(), 1);
        let path = &page.paths[0];
        assert_eq!(path.layer, Some(LayerRef::new("12")));
        assert_eq!(path.stroke_width, 0.0);
        assert_eq!(
            path.items[1],
            DrawItem::Rect(Rect::from_coords(1.0, 1.0, 5.0, 5.0))
        );
        assert!(page.text_blocks.is_empty());
    }

    #[test]
    fn malformed_items_are_invalid_documents() {
        let facade = PageDumpFacade::new();
        for data in [
            "not json",
            r#"{"source": "x"}"#,
            r#"{"pages": [{"width": 1, "height": 1, "paths": [{"items": [{"kind": "arc"}]}]}]}"#,
            r#"{"pages": [{"width": 1, "height": 1, "paths": [{"items": [{"kind": "line", "points": [[0, 0]]}]}]}]}"#,
        ] {
            let err = facade.parse(data, "x").unwrap_err();
            assert!(matches!(err, IoError::InvalidDocument(_)), "{data}");
        }
    }

    #[test]
    fn unusual_layer_refs_are_read_best_effort() {
        let data = r#"{
            "pages": [{
                "width": 10, "height": 10,
                "paths": [
                    {"layer": 3.5, "width": 0.1},
                    {"layer": -2, "width": 0.1},
                    {"layer": {"xref": 9}, "width": 0.1},
                    {"layer": [1, 2], "width": 0.1},
                    {"layer": null, "width": 0.1}
                ]
            }]
        }"#;
        let doc = PageDumpFacade::new().parse(data, "x").unwrap();
        let layers: Vec<_> = doc.page(0).unwrap().paths.iter().map(|p| p.layer.clone()).collect();
        assert_eq!(
            layers,
            vec![
                Some(LayerRef::new("3.5")),
                Some(LayerRef::new("-2")),
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn bad_registry_does_not_fail_the_document() {
        let data = r#"{"layers": "broken", "pages": [{"width": 10, "height": 10}]}"#;
        let doc = PageDumpFacade::new().parse(data, "x").unwrap();
        assert!(!doc.has_registry());
        assert_eq!(doc.page_count(), 1);
    }
}
