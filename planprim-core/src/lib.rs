pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，坐标系与渲染器输出的页面空间一致（原点左上，y 向下）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        /// 线性插值：`t = 0` 返回自身，`t = 1` 返回 `other`。
        #[inline]
        pub fn lerp(self, other: Point2, t: f64) -> Self {
            Self(self.0.lerp(other.0, t))
        }

        /// 相对原点的均匀缩放。
        #[inline]
        pub fn scale(self, factor: f64) -> Self {
            Self(self.0 * factor)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 轴对齐矩形，用于页面范围、文本块包围盒与排除区域。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Rect {
        min: Point2,
        max: Point2,
    }

    impl Rect {
        /// 由任意两个对角点构造，内部保证 `min <= max`。
        #[inline]
        pub fn new(a: Point2, b: Point2) -> Self {
            Self {
                min: Point2::from_vec(a.as_vec2().min(b.as_vec2())),
                max: Point2::from_vec(a.as_vec2().max(b.as_vec2())),
            }
        }

        #[inline]
        pub fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
            Self::new(Point2::new(x0, y0), Point2::new(x1, y1))
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            self.min.lerp(self.max, 0.5)
        }

        /// 四个角点，按 左上 → 右上 → 右下 → 左下 的周边顺序。
        pub fn corners(&self) -> [Point2; 4] {
            [
                self.min,
                Point2::new(self.max.x(), self.min.y()),
                self.max,
                Point2::new(self.min.x(), self.max.y()),
            ]
        }

        /// 闭区间包含判定，边界上的点视为在内。
        #[inline]
        pub fn contains(&self, point: Point2) -> bool {
            point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }

        /// 向四周外扩 `margin`。
        pub fn expand(&self, margin: f64) -> Self {
            Self::from_coords(
                self.min.x() - margin,
                self.min.y() - margin,
                self.max.x() + margin,
                self.max.y() + margin,
            )
        }
    }

}

pub mod document {
    use std::collections::BTreeMap;
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Point2, Rect};

    /// 图层（OCG）引用，对核心而言是不透明标识。
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LayerRef(String);

    impl LayerRef {
        #[inline]
        pub fn new(raw: impl Into<String>) -> Self {
            Self(raw.into())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for LayerRef {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct LayerInfo {
        pub id: LayerRef,
        pub name: String,
        pub visible: bool,
    }

    impl LayerInfo {
        #[inline]
        pub fn new(id: LayerRef, name: impl Into<String>, visible: bool) -> Self {
            Self {
                id,
                name: name.into(),
                visible,
            }
        }
    }

    /// 文档级图层注册表。构造后只读，迭代顺序按引用排序以保证输出可复现。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct LayerRegistry {
        layers: BTreeMap<LayerRef, LayerInfo>,
    }

    impl LayerRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, layer: LayerInfo) {
            self.layers.insert(layer.id.clone(), layer);
        }

        #[inline]
        pub fn get(&self, id: &LayerRef) -> Option<&LayerInfo> {
            self.layers.get(id)
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.layers.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.layers.is_empty()
        }

        #[inline]
        pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
            self.layers.values()
        }
    }

    impl FromIterator<LayerInfo> for LayerRegistry {
        fn from_iter<I: IntoIterator<Item = LayerInfo>>(iter: I) -> Self {
            let mut registry = Self::new();
            for layer in iter {
                registry.insert(layer);
            }
            registry
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum DrawItemKind {
        Line,
        Cubic,
        Rect,
        Quad,
    }

    impl DrawItemKind {
        pub fn as_str(self) -> &'static str {
            match self {
                DrawItemKind::Line => "line",
                DrawItemKind::Cubic => "cubic",
                DrawItemKind::Rect => "rect",
                DrawItemKind::Quad => "quad",
            }
        }
    }

    /// 渲染器给出的单个绘制指令。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum DrawItem {
        Line { start: Point2, end: Point2 },
        Cubic { points: [Point2; 4] },
        Rect(Rect),
        /// 四个顶点按周边顺序排列。
        Quad { points: [Point2; 4] },
    }

    impl DrawItem {
        pub fn kind(&self) -> DrawItemKind {
            match self {
                DrawItem::Line { .. } => DrawItemKind::Line,
                DrawItem::Cubic { .. } => DrawItemKind::Cubic,
                DrawItem::Rect(_) => DrawItemKind::Rect,
                DrawItem::Quad { .. } => DrawItemKind::Quad,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DrawPath {
        pub layer: Option<LayerRef>,
        /// 原始线宽；渲染器缺省时记为 0。
        pub stroke_width: f64,
        pub items: Vec<DrawItem>,
    }

    impl DrawPath {
        pub fn new(stroke_width: f64) -> Self {
            Self {
                layer: None,
                stroke_width,
                items: Vec::new(),
            }
        }

        pub fn on_layer(mut self, layer: LayerRef) -> Self {
            self.layer = Some(layer);
            self
        }

        pub fn with_item(mut self, item: DrawItem) -> Self {
            self.items.push(item);
            self
        }

        pub fn line(self, start: Point2, end: Point2) -> Self {
            self.with_item(DrawItem::Line { start, end })
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TextBlock {
        pub bbox: Rect,
        pub text: String,
    }

    impl TextBlock {
        pub fn new(bbox: Rect, text: impl Into<String>) -> Self {
            Self {
                bbox,
                text: text.into(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Page {
        pub width: f64,
        pub height: f64,
        pub paths: Vec<DrawPath>,
        pub text_blocks: Vec<TextBlock>,
    }

    impl Page {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                width,
                height,
                paths: Vec::new(),
                text_blocks: Vec::new(),
            }
        }

        pub fn add_path(&mut self, path: DrawPath) {
            self.paths.push(path);
        }

        pub fn add_text_block(&mut self, block: TextBlock) {
            self.text_blocks.push(block);
        }

        /// 页面矩形，原点固定在 (0, 0)。
        #[inline]
        pub fn rect(&self) -> Rect {
            Rect::from_coords(0.0, 0.0, self.width, self.height)
        }

        /// 全页文本，按文本块顺序以换行拼接。
        pub fn full_text(&self) -> String {
            let parts: Vec<&str> = self.text_blocks.iter().map(|b| b.text.as_str()).collect();
            parts.join("\n")
        }

        pub fn item_count(&self) -> usize {
            self.paths.iter().map(|path| path.items.len()).sum()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct SourceDocument {
        source: String,
        registry: Option<LayerRegistry>,
        pages: Vec<Page>,
    }

    impl SourceDocument {
        pub fn new(source: impl Into<String>) -> Self {
            Self {
                source: source.into(),
                registry: None,
                pages: Vec::new(),
            }
        }

        /// 设置图层注册表；空注册表等同于“无注册表”。
        pub fn set_registry(&mut self, registry: Option<LayerRegistry>) {
            self.registry = registry.filter(|registry| !registry.is_empty());
        }

        pub fn with_registry(mut self, registry: LayerRegistry) -> Self {
            self.set_registry(Some(registry));
            self
        }

        pub fn add_page(&mut self, page: Page) -> usize {
            self.pages.push(page);
            self.pages.len() - 1
        }

        pub fn with_page(mut self, page: Page) -> Self {
            self.add_page(page);
            self
        }

        #[inline]
        pub fn source(&self) -> &str {
            &self.source
        }

        #[inline]
        pub fn registry(&self) -> Option<&LayerRegistry> {
            self.registry.as_ref()
        }

        #[inline]
        pub fn has_registry(&self) -> bool {
            self.registry.is_some()
        }

        #[inline]
        pub fn layer(&self, id: &LayerRef) -> Option<&LayerInfo> {
            self.registry.as_ref().and_then(|registry| registry.get(id))
        }

        #[inline]
        pub fn pages(&self) -> &[Page] {
            &self.pages
        }

        #[inline]
        pub fn page(&self, index: usize) -> Option<&Page> {
            self.pages.get(index)
        }

        #[inline]
        pub fn page_count(&self) -> usize {
            self.pages.len()
        }
    }

}

pub mod primitive {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point2;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum PrimitiveKind {
        Line,
        CubicCurve,
    }

    impl PrimitiveKind {
        /// 输出 `commands` 数组中的编码：0 = 直线，1 = 三次曲线。
        #[inline]
        pub fn command_code(self) -> i32 {
            match self {
                PrimitiveKind::Line => 0,
                PrimitiveKind::CubicCurve => 1,
            }
        }
    }

    /// 粗粒度结构分层。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum StructuralClass {
        Wall,
        Medium,
        Detail,
    }

    impl StructuralClass {
        pub const ALL: [StructuralClass; 3] = [
            StructuralClass::Wall,
            StructuralClass::Medium,
            StructuralClass::Detail,
        ];

        /// 输出层号：0 = 墙体，1 = 中等，2 = 细节。
        #[inline]
        pub fn layer_id(self) -> i32 {
            match self {
                StructuralClass::Wall => 0,
                StructuralClass::Medium => 1,
                StructuralClass::Detail => 2,
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                StructuralClass::Wall => "wall",
                StructuralClass::Medium => "medium",
                StructuralClass::Detail => "detail",
            }
        }
    }

    /// 固定 4 个控制点的统一表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct ControlPoints([Point2; 4]);

    impl ControlPoints {
        #[inline]
        pub fn new(points: [Point2; 4]) -> Self {
            Self(points)
        }

        /// 直线按 1/3、2/3 处线性插值补齐为 4 点，仅为形状对齐，不是曲线拟合。
        pub fn from_line(start: Point2, end: Point2) -> Self {
            Self([
                start,
                start.lerp(end, 1.0 / 3.0),
                start.lerp(end, 2.0 / 3.0),
                end,
            ])
        }

        #[inline]
        pub fn points(&self) -> &[Point2; 4] {
            &self.0
        }

        #[inline]
        pub fn first(&self) -> Point2 {
            self.0[0]
        }

        #[inline]
        pub fn last(&self) -> Point2 {
            self.0[3]
        }

        /// 4 个控制点间 3 段折线长度之和。
        pub fn polyline_length(&self) -> f64 {
            self.0
                .windows(2)
                .map(|pair| pair[0].distance(pair[1]))
                .sum()
        }

        pub fn scaled(&self, factor: f64) -> Self {
            Self(self.0.map(|point| point.scale(factor)))
        }

        /// 展平为 `x1,y1,...,x4,y4`。
        pub fn flatten(&self) -> [f64; 8] {
            let mut flat = [0.0; 8];
            for (index, point) in self.0.iter().enumerate() {
                flat[index * 2] = point.x();
                flat[index * 2 + 1] = point.y();
            }
            flat
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Primitive {
        pub kind: PrimitiveKind,
        pub control_points: ControlPoints,
        /// 仅用于溯源调试，不参与任何判定。
        pub origin_path_index: usize,
        /// 缩放前的原始线宽。
        pub stroke_width: f64,
        pub structural_class: StructuralClass,
        pub layer_id: i32,
        /// 缩放后的折线长度；缩放前恒为 0。
        pub length: f64,
    }

    impl Primitive {
        pub fn new(
            kind: PrimitiveKind,
            control_points: ControlPoints,
            origin_path_index: usize,
            stroke_width: f64,
            structural_class: StructuralClass,
        ) -> Self {
            Self {
                kind,
                control_points,
                origin_path_index,
                stroke_width,
                structural_class,
                layer_id: structural_class.layer_id(),
                length: 0.0,
            }
        }

        /// 坐标乘以 `scale` 并重新计算长度，返回新的图元。
        pub fn rescaled(self, scale: f64) -> Self {
            let control_points = self.control_points.scaled(scale);
            let length = control_points.polyline_length();
            Self {
                control_points,
                length,
                ..self
            }
        }
    }

}

pub mod output {
    use serde::{Deserialize, Serialize};

    /// 下游模型要求的统一显示线宽。
    pub const UNIFORM_DISPLAY_WIDTH: f64 = 0.1;
    /// 语义占位：未知 / 背景。
    pub const UNKNOWN_SEMANTIC_ID: i32 = 35;
    /// 实例占位：无实例。
    pub const NO_INSTANCE_ID: i32 = -1;
    pub const PLACEHOLDER_RGB: [u8; 3] = [0, 0, 0];

    /// 最终输出，字段名与下游数据集格式逐一对应，所有数组等长。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PipelineResult {
        pub width: u32,
        pub height: u32,
        pub commands: Vec<i32>,
        pub args: Vec<[f64; 8]>,
        pub lengths: Vec<f64>,
        pub layer_ids: Vec<i32>,
        pub widths: Vec<f64>,
        pub semantic_ids: Vec<i32>,
        pub instance_ids: Vec<i32>,
        pub rgb: Vec<[u8; 3]>,
        #[serde(rename = "_metadata")]
        pub metadata: ResultMetadata,
    }

    impl PipelineResult {
        /// 仅有画布尺寸与元数据、数组全空的结果。
        pub fn empty(width: u32, height: u32, metadata: ResultMetadata) -> Self {
            Self {
                width,
                height,
                commands: Vec::new(),
                args: Vec::new(),
                lengths: Vec::new(),
                layer_ids: Vec::new(),
                widths: Vec::new(),
                semantic_ids: Vec::new(),
                instance_ids: Vec::new(),
                rgb: Vec::new(),
                metadata,
            }
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.commands.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.commands.is_empty()
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResultMetadata {
        pub source: String,
        pub has_layer_registry: bool,
        pub wall_threshold: f64,
        pub medium_threshold: f64,
    }

}
