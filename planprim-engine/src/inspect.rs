//! 文档检查：不运行流水线，只汇总图层与绘制指令信息。

use std::collections::{BTreeMap, BTreeSet};

use planprim_core::document::{DrawItemKind, LayerInfo, LayerRef, Page, SourceDocument};

#[derive(Debug, Clone, PartialEq)]
pub struct PageInspection {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub path_count: usize,
    pub text_block_count: usize,
    pub item_kinds: BTreeMap<DrawItemKind, usize>,
    pub layered_paths: usize,
    pub layer_refs: BTreeSet<LayerRef>,
}

impl PageInspection {
    pub fn from_page(index: usize, page: &Page) -> Self {
        let mut item_kinds = BTreeMap::new();
        let mut layered_paths = 0;
        let mut layer_refs = BTreeSet::new();
        for path in &page.paths {
            if let Some(layer) = &path.layer {
                layered_paths += 1;
                layer_refs.insert(layer.clone());
            }
            for item in &path.items {
                *item_kinds.entry(item.kind()).or_insert(0) += 1;
            }
        }
        Self {
            index,
            width: page.width,
            height: page.height,
            path_count: page.paths.len(),
            text_block_count: page.text_blocks.len(),
            item_kinds,
            layered_paths,
            layer_refs,
        }
    }

    pub fn item_count(&self, kind: DrawItemKind) -> usize {
        self.item_kinds.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInspection {
    pub source: String,
    pub layers: Vec<LayerInfo>,
    pub pages: Vec<PageInspection>,
}

impl DocumentInspection {
    pub fn of(document: &SourceDocument) -> Self {
        Self {
            source: document.source().to_string(),
            layers: document
                .registry()
                .map(|registry| registry.iter().cloned().collect())
                .unwrap_or_default(),
            pages: document
                .pages()
                .iter()
                .enumerate()
                .map(|(index, page)| PageInspection::from_page(index, page))
                .collect(),
        }
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 有图层注册表，或任一路径引用了图层。
    pub fn has_layer_information(&self) -> bool {
        !self.layers.is_empty() || self.pages.iter().any(|page| page.layered_paths > 0)
    }
}

#[cfg(test)]
mod tests {
    use planprim_core::document::{DrawItem, DrawPath, LayerRegistry};
    use planprim_core::geometry::{Point2, Rect};

    use super::*;

    #[test]
    fn counts_items_and_layer_refs() {
        let mut page = Page::new(420.0, 297.0);
        page.add_path(
            DrawPath::new(0.5)
                .on_layer(LayerRef::new("3"))
                .line(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0))
                .with_item(DrawItem::Rect(Rect::from_coords(0.0, 0.0, 5.0, 5.0))),
        );
        page.add_path(
            DrawPath::new(0.1)
                .on_layer(LayerRef::new("3"))
                .line(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
        );
        page.add_path(DrawPath::new(0.1).line(Point2::new(0.0, 0.0), Point2::new(3.0, 3.0)));

        let doc = SourceDocument::new("plan.pdf")
            .with_page(page)
            .with_page(Page::new(100.0, 100.0));
        let inspection = DocumentInspection::of(&doc);

        assert_eq!(inspection.page_count(), 2);
        let first = &inspection.pages[0];
        assert_eq!(first.path_count, 3);
        assert_eq!(first.item_count(DrawItemKind::Line), 3);
        assert_eq!(first.item_count(DrawItemKind::Rect), 1);
        assert_eq!(first.item_count(DrawItemKind::Cubic), 0);
        assert_eq!(first.layered_paths, 2);
        assert_eq!(first.layer_refs.len(), 1);
        assert!(inspection.layers.is_empty());
        assert!(inspection.has_layer_information());
    }

    #[test]
    fn plain_document_has_no_layer_information() {
        let mut page = Page::new(100.0, 100.0);
        page.add_path(DrawPath::new(0.1).line(Point2::new(0.0, 0.0), Point2::new(3.0, 3.0)));
        let doc = SourceDocument::new("flat.pdf").with_page(page);
        assert!(!DocumentInspection::of(&doc).has_layer_information());

        let registry: LayerRegistry = [LayerInfo::new(LayerRef::new("1"), "COTES", true)]
            .into_iter()
            .collect();
        let doc = SourceDocument::new("ocg.pdf").with_registry(registry);
        let inspection = DocumentInspection::of(&doc);
        assert_eq!(inspection.layers.len(), 1);
        assert!(inspection.has_layer_information());
    }
}
