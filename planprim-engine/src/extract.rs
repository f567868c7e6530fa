//! 把绘制指令归一化为 4 控制点图元，并应用区域排除。

use planprim_core::document::{DrawItem, LayerRef, LayerRegistry, Page};
use planprim_core::geometry::Point2;
use planprim_core::primitive::{ControlPoints, Primitive, PrimitiveKind, StructuralClass};
use tracing::debug;

use crate::classify::StructuralClassifier;
use crate::zones::ZoneSet;

/// 单个绘制指令展开后的形状（矩形/四边形展开为 4 条边）。
pub fn normalize_item(item: &DrawItem) -> Vec<(PrimitiveKind, ControlPoints)> {
    match item {
        DrawItem::Line { start, end } => {
            vec![(PrimitiveKind::Line, ControlPoints::from_line(*start, *end))]
        }
        DrawItem::Cubic { points } => {
            vec![(PrimitiveKind::CubicCurve, ControlPoints::new(*points))]
        }
        DrawItem::Rect(rect) => perimeter_edges(&rect.corners()),
        DrawItem::Quad { points } => perimeter_edges(points),
    }
}

fn perimeter_edges(corners: &[Point2; 4]) -> Vec<(PrimitiveKind, ControlPoints)> {
    (0..4)
        .map(|i| {
            (
                PrimitiveKind::Line,
                ControlPoints::from_line(corners[i], corners[(i + 1) % 4]),
            )
        })
        .collect()
}

/// 直线看两个端点，曲线看首个控制点。
fn inside_zones(kind: PrimitiveKind, points: &ControlPoints, zones: &ZoneSet) -> bool {
    match kind {
        PrimitiveKind::Line => zones.contains(points.first()) && zones.contains(points.last()),
        PrimitiveKind::CubicCurve => zones.contains(points.first()),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// 未缩放、未按长度过滤的候选图元，顺序与路径/指令顺序一致。
    pub candidates: Vec<Primitive>,
    pub extracted: usize,
    pub zone_excluded: usize,
    pub hidden_layer_excluded: usize,
}

pub struct PrimitiveExtractor<'a> {
    classifier: &'a StructuralClassifier,
    zones: &'a ZoneSet,
    registry: Option<&'a LayerRegistry>,
    skip_hidden_layers: bool,
}

impl<'a> PrimitiveExtractor<'a> {
    pub fn new(
        classifier: &'a StructuralClassifier,
        zones: &'a ZoneSet,
        registry: Option<&'a LayerRegistry>,
    ) -> Self {
        Self {
            classifier,
            zones,
            registry,
            skip_hidden_layers: false,
        }
    }

    pub fn skip_hidden_layers(mut self, skip: bool) -> Self {
        self.skip_hidden_layers = skip;
        self
    }

    fn is_hidden(&self, layer: Option<&LayerRef>) -> bool {
        match (layer, self.registry) {
            (Some(layer), Some(registry)) => registry.get(layer).is_some_and(|info| !info.visible),
            _ => false,
        }
    }

    pub fn extract(&self, page: &Page) -> Extraction {
        let mut extraction = Extraction::default();

        for (path_index, path) in page.paths.iter().enumerate() {
            let hidden = self.skip_hidden_layers && self.is_hidden(path.layer.as_ref());
            let class = self.classifier.classify_path(path, self.registry).class;

            for item in &path.items {
                for (kind, points) in normalize_item(item) {
                    extraction.extracted += 1;
                    if hidden {
                        extraction.hidden_layer_excluded += 1;
                        continue;
                    }
                    // 墙体从不因区域被排除。
                    if class != StructuralClass::Wall && inside_zones(kind, &points, self.zones) {
                        extraction.zone_excluded += 1;
                        continue;
                    }
                    extraction.candidates.push(Primitive::new(
                        kind,
                        points,
                        path_index,
                        path.stroke_width,
                        class,
                    ));
                }
            }
        }

        debug!(
            extracted = extraction.extracted,
            candidates = extraction.candidates.len(),
            zone_excluded = extraction.zone_excluded,
            hidden_layer_excluded = extraction.hidden_layer_excluded,
            "图元提取完成"
        );
        extraction
    }
}

#[cfg(test)]
mod tests {
    use planprim_core::document::{DrawPath, LayerInfo};
    use planprim_core::geometry::Rect;

    use super::*;
    use crate::stats::Thresholds;
    use crate::zones::{ExclusionZone, ZoneKind};

    const T: Thresholds = Thresholds {
        wall: 0.5,
        medium: 0.2,
    };

    fn classifier() -> StructuralClassifier {
        StructuralClassifier::new(T, Default::default())
    }

    fn zone(x0: f64, y0: f64, x1: f64, y1: f64) -> ZoneSet {
        ZoneSet::new(vec![ExclusionZone {
            kind: ZoneKind::Text,
            rect: Rect::from_coords(x0, y0, x1, y1),
        }])
    }

    #[test]
    fn rect_and_quad_expand_to_four_edges() {
        let rect = DrawItem::Rect(Rect::from_coords(0.0, 0.0, 10.0, 5.0));
        let edges = normalize_item(&rect);
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|(kind, _)| *kind == PrimitiveKind::Line));
        let total: f64 = edges.iter().map(|(_, cp)| cp.polyline_length()).sum();
        assert!((total - 30.0).abs() < 1e-9);
        assert_eq!(edges[0].1.first(), Point2::new(0.0, 0.0));
        assert_eq!(edges[3].1.last(), Point2::new(0.0, 0.0));

        let quad = DrawItem::Quad {
            points: [
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
                Point2::new(0.0, 3.0),
            ],
        };
        let edges = normalize_item(&quad);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[1].1.first(), Point2::new(4.0, 0.0));
        assert_eq!(edges[1].1.last(), Point2::new(4.0, 3.0));
    }

    #[test]
    fn cubic_keeps_native_control_points() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(3.0, 2.0),
            Point2::new(4.0, 0.0),
        ];
        let shapes = normalize_item(&DrawItem::Cubic { points });
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].0, PrimitiveKind::CubicCurve);
        assert_eq!(shapes[0].1.points(), &points);
    }

    #[test]
    fn zone_exclusion_spares_walls_only() {
        let mut page = Page::new(100.0, 100.0);
        page.add_path(DrawPath::new(0.8).line(Point2::new(1.0, 1.0), Point2::new(9.0, 1.0)));
        page.add_path(DrawPath::new(0.3).line(Point2::new(1.0, 2.0), Point2::new(9.0, 2.0)));
        page.add_path(DrawPath::new(0.1).line(Point2::new(1.0, 3.0), Point2::new(9.0, 3.0)));
        // 只有一个端点在区域内：保留
        page.add_path(DrawPath::new(0.1).line(Point2::new(1.0, 4.0), Point2::new(50.0, 4.0)));

        let classifier = classifier();
        let zones = zone(0.0, 0.0, 10.0, 10.0);
        let extraction = PrimitiveExtractor::new(&classifier, &zones, None).extract(&page);

        assert_eq!(extraction.extracted, 4);
        assert_eq!(extraction.zone_excluded, 2);
        let classes: Vec<_> = extraction
            .candidates
            .iter()
            .map(|p| (p.origin_path_index, p.structural_class))
            .collect();
        assert_eq!(
            classes,
            vec![(0, StructuralClass::Wall), (3, StructuralClass::Detail)]
        );
    }

    #[test]
    fn curve_exclusion_uses_first_control_point() {
        let mut page = Page::new(100.0, 100.0);
        let inside_start = [
            Point2::new(5.0, 5.0),
            Point2::new(30.0, 30.0),
            Point2::new(60.0, 60.0),
            Point2::new(90.0, 90.0),
        ];
        let outside_start = [
            Point2::new(90.0, 90.0),
            Point2::new(60.0, 60.0),
            Point2::new(30.0, 30.0),
            Point2::new(5.0, 5.0),
        ];
        page.add_path(
            DrawPath::new(0.1)
                .with_item(DrawItem::Cubic {
                    points: inside_start,
                })
                .with_item(DrawItem::Cubic {
                    points: outside_start,
                }),
        );
        let classifier = classifier();
        let zones = zone(0.0, 0.0, 10.0, 10.0);
        let extraction = PrimitiveExtractor::new(&classifier, &zones, None).extract(&page);
        assert_eq!(extraction.zone_excluded, 1);
        assert_eq!(extraction.candidates.len(), 1);
        assert_eq!(
            extraction.candidates[0].control_points.first(),
            Point2::new(90.0, 90.0)
        );
    }

    #[test]
    fn hidden_layers_are_skipped_only_when_enabled() {
        let registry: LayerRegistry = [LayerInfo::new(LayerRef::new("h"), "CALQUE MASQUE", false)]
            .into_iter()
            .collect();
        let mut page = Page::new(100.0, 100.0);
        page.add_path(
            DrawPath::new(0.3)
                .on_layer(LayerRef::new("h"))
                .line(Point2::new(20.0, 20.0), Point2::new(80.0, 20.0)),
        );
        page.add_path(DrawPath::new(0.3).line(Point2::new(20.0, 40.0), Point2::new(80.0, 40.0)));

        let classifier = classifier();
        let zones = ZoneSet::default();
        let kept_all = PrimitiveExtractor::new(&classifier, &zones, Some(&registry)).extract(&page);
        assert_eq!(kept_all.candidates.len(), 2);
        assert_eq!(kept_all.hidden_layer_excluded, 0);

        let skipped = PrimitiveExtractor::new(&classifier, &zones, Some(&registry))
            .skip_hidden_layers(true)
            .extract(&page);
        assert_eq!(skipped.candidates.len(), 1);
        assert_eq!(skipped.hidden_layer_excluded, 1);
        assert_eq!(skipped.extracted, 2);
    }
}
