//! 排除区域检测：文本块、图签（标题栏）与图例。
//!
//! 每个启发式区域都需要旁证才会被采信：图签要求区域内有足够密度的文字，
//! 图例要求全页文本出现图例关键字。没有旁证时不会凭空切掉真实几何。

use planprim_core::document::Page;
use planprim_core::geometry::{Point2, Rect};
use tracing::debug;

/// 文本块包围盒的默认外扩量（页面单位）。
pub const DEFAULT_TEXT_MARGIN: f64 = 5.0;
/// 图签候选区内文字超过此字符数才采信。
pub const DEFAULT_TITLE_BLOCK_MIN_CHARS: usize = 50;
pub const LEGEND_KEYWORDS: &[&str] = &["legend", "légende"];

const TITLE_BLOCK_LEFT: f64 = 0.60;
const TITLE_BLOCK_TOP: f64 = 0.75;
const BOTTOM_STRIP_TOP: f64 = 0.90;
const LEGEND_LEFT: f64 = 0.75;
const LEGEND_BOTTOM: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    Text,
    TitleBlock,
    Legend,
}

impl ZoneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Text => "text",
            ZoneKind::TitleBlock => "title-block",
            ZoneKind::Legend => "legend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionZone {
    pub kind: ZoneKind,
    pub rect: Rect,
}

impl ExclusionZone {
    #[inline]
    pub fn contains(&self, point: Point2) -> bool {
        self.rect.contains(point)
    }
}

/// 单页的排除区域集合，创建后只读。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: Vec<ExclusionZone>,
}

impl ZoneSet {
    pub fn new(zones: Vec<ExclusionZone>) -> Self {
        Self { zones }
    }

    /// 点落在任一区域内。
    pub fn contains(&self, point: Point2) -> bool {
        self.zones.iter().any(|zone| zone.contains(point))
    }

    pub fn count(&self, kind: ZoneKind) -> usize {
        self.zones.iter().filter(|zone| zone.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOptions {
    pub exclude_text: bool,
    /// 图签与图例。
    pub exclude_layout: bool,
    pub text_margin: f64,
    pub title_block_min_chars: usize,
}

impl Default for ZoneOptions {
    fn default() -> Self {
        Self {
            exclude_text: true,
            exclude_layout: true,
            text_margin: DEFAULT_TEXT_MARGIN,
            title_block_min_chars: DEFAULT_TITLE_BLOCK_MIN_CHARS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoneDetector {
    options: ZoneOptions,
}

impl ZoneDetector {
    pub fn new(options: ZoneOptions) -> Self {
        Self { options }
    }

    pub fn detect(&self, page: &Page) -> ZoneSet {
        let mut zones = Vec::new();

        if self.options.exclude_text {
            zones.extend(page.text_blocks.iter().map(|block| ExclusionZone {
                kind: ZoneKind::Text,
                rect: block.bbox.expand(self.options.text_margin),
            }));
        }

        if self.options.exclude_layout {
            zones.push(self.title_block_zone(page));
            if let Some(legend) = legend_zone(page) {
                zones.push(legend);
            }
        }

        let set = ZoneSet::new(zones);
        debug!(
            text = set.count(ZoneKind::Text),
            title_block = set.count(ZoneKind::TitleBlock),
            legend = set.count(ZoneKind::Legend),
            "排除区域检测完成"
        );
        set
    }

    /// 右下角候选区文字足够密集时采信为图签，否则退化为底部 10% 横条。
    fn title_block_zone(&self, page: &Page) -> ExclusionZone {
        let candidate = Rect::from_coords(
            page.width * TITLE_BLOCK_LEFT,
            page.height * TITLE_BLOCK_TOP,
            page.width,
            page.height,
        );
        let chars = text_chars_within(page, &candidate);
        if chars > self.options.title_block_min_chars {
            return ExclusionZone {
                kind: ZoneKind::TitleBlock,
                rect: candidate,
            };
        }
        ExclusionZone {
            kind: ZoneKind::TitleBlock,
            rect: Rect::from_coords(0.0, page.height * BOTTOM_STRIP_TOP, page.width, page.height),
        }
    }
}

fn legend_zone(page: &Page) -> Option<ExclusionZone> {
    let text = page.full_text().to_lowercase();
    if !LEGEND_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return None;
    }
    Some(ExclusionZone {
        kind: ZoneKind::Legend,
        rect: Rect::from_coords(
            page.width * LEGEND_LEFT,
            0.0,
            page.width,
            page.height * LEGEND_BOTTOM,
        ),
    })
}

/// 中心落在 `area` 内的文本块的字符总数；只擦到边角的文字不计入。
fn text_chars_within(page: &Page, area: &Rect) -> usize {
    page.text_blocks
        .iter()
        .filter(|block| area.contains(block.bbox.center()))
        .map(|block| block.text.chars().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use planprim_core::document::TextBlock;

    use super::*;

    fn page_with_text(blocks: &[(Rect, &str)]) -> Page {
        let mut page = Page::new(1000.0, 800.0);
        for (rect, text) in blocks {
            page.add_text_block(TextBlock::new(*rect, *text));
        }
        page
    }

    #[test]
    fn text_blocks_become_expanded_zones() {
        let page = page_with_text(&[(Rect::from_coords(100.0, 100.0, 200.0, 120.0), "SEJOUR")]);
        let zones = ZoneDetector::default().detect(&page);
        let text_zone = zones
            .iter()
            .find(|zone| zone.kind == ZoneKind::Text)
            .expect("text zone");
        assert_eq!(text_zone.rect, Rect::from_coords(95.0, 95.0, 205.0, 125.0));
        assert!(zones.contains(Point2::new(96.0, 96.0)));
    }

    #[test]
    fn dense_bottom_right_text_is_accepted_as_title_block() {
        let long = "PROJET RESIDENCE DES LILAS - PLAN RDC - ECHELLE 1/100 - INDICE B";
        let page = page_with_text(&[(Rect::from_coords(700.0, 650.0, 980.0, 780.0), long)]);
        let zones = ZoneDetector::default().detect(&page);
        let title = zones
            .iter()
            .find(|zone| zone.kind == ZoneKind::TitleBlock)
            .expect("title block");
        assert_eq!(title.rect, Rect::from_coords(600.0, 600.0, 1000.0, 800.0));
    }

    #[test]
    fn title_block_needs_more_than_fifty_chars() {
        let inside = Rect::from_coords(700.0, 650.0, 980.0, 780.0);
        let title_rect = |chars: usize| {
            let page = page_with_text(&[(inside, "X".repeat(chars).as_str())]);
            ZoneDetector::default()
                .detect(&page)
                .iter()
                .find(|zone| zone.kind == ZoneKind::TitleBlock)
                .map(|zone| zone.rect)
                .expect("title block zone")
        };
        assert_eq!(title_rect(50), Rect::from_coords(0.0, 720.0, 1000.0, 800.0));
        assert_eq!(title_rect(51), Rect::from_coords(600.0, 600.0, 1000.0, 800.0));
    }

    #[test]
    fn text_grazing_the_title_area_is_not_counted() {
        // 长注释只有右下角伸进候选区，中心在外
        let note = "NOTA : LES COTES SONT A VERIFIER SUR PLACE AVANT TOUTE EXECUTION DES TRAVAUX";
        let page = page_with_text(&[(Rect::from_coords(100.0, 500.0, 620.0, 610.0), note)]);
        let zones = ZoneDetector::default().detect(&page);
        let title = zones
            .iter()
            .find(|zone| zone.kind == ZoneKind::TitleBlock)
            .expect("title block zone");
        assert_eq!(title.rect, Rect::from_coords(0.0, 720.0, 1000.0, 800.0));
    }

    #[test]
    fn sparse_title_area_falls_back_to_bottom_strip() {
        let page = page_with_text(&[(Rect::from_coords(700.0, 650.0, 800.0, 700.0), "A1")]);
        let zones = ZoneDetector::default().detect(&page);
        let title = zones
            .iter()
            .find(|zone| zone.kind == ZoneKind::TitleBlock)
            .expect("fallback strip is unconditional");
        assert_eq!(title.rect, Rect::from_coords(0.0, 720.0, 1000.0, 800.0));
        assert_eq!(zones.count(ZoneKind::TitleBlock), 1);
    }

    #[test]
    fn legend_requires_keyword() {
        let without = page_with_text(&[(Rect::from_coords(0.0, 0.0, 10.0, 10.0), "CUISINE")]);
        assert_eq!(ZoneDetector::default().detect(&without).count(ZoneKind::Legend), 0);

        for keyword in ["LEGENDE", "Légende :", "legend"] {
            let with = page_with_text(&[(Rect::from_coords(0.0, 0.0, 10.0, 10.0), keyword)]);
            let zones = ZoneDetector::default().detect(&with);
            let legend = zones
                .iter()
                .find(|zone| zone.kind == ZoneKind::Legend)
                .unwrap_or_else(|| panic!("legend zone for {keyword}"));
            assert_eq!(legend.rect, Rect::from_coords(750.0, 0.0, 1000.0, 640.0));
        }
    }

    #[test]
    fn toggles_disable_zone_families() {
        let page = page_with_text(&[(Rect::from_coords(0.0, 0.0, 10.0, 10.0), "LEGENDE")]);
        let no_text = ZoneDetector::new(ZoneOptions {
            exclude_text: false,
            ..ZoneOptions::default()
        })
        .detect(&page);
        assert_eq!(no_text.count(ZoneKind::Text), 0);
        assert_eq!(no_text.count(ZoneKind::Legend), 1);

        let no_layout = ZoneDetector::new(ZoneOptions {
            exclude_layout: false,
            ..ZoneOptions::default()
        })
        .detect(&page);
        assert_eq!(no_layout.count(ZoneKind::Text), 1);
        assert_eq!(no_layout.count(ZoneKind::TitleBlock), 0);
        assert_eq!(no_layout.count(ZoneKind::Legend), 0);
    }
}
