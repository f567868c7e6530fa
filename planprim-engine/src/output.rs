//! 把保留下来的图元投影成并列数组。

use planprim_core::output::{
    NO_INSTANCE_ID, PLACEHOLDER_RGB, PipelineResult, ResultMetadata, UNIFORM_DISPLAY_WIDTH,
    UNKNOWN_SEMANTIC_ID,
};
use planprim_core::primitive::Primitive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputAssembler {
    uniform_width: f64,
}

impl OutputAssembler {
    pub fn new(uniform_width: f64) -> Self {
        Self { uniform_width }
    }

    pub fn assemble(
        &self,
        canvas: (u32, u32),
        primitives: &[Primitive],
        metadata: ResultMetadata,
    ) -> PipelineResult {
        let mut result = PipelineResult::empty(canvas.0, canvas.1, metadata);
        let count = primitives.len();
        result.commands.reserve(count);
        result.args.reserve(count);
        result.lengths.reserve(count);
        result.layer_ids.reserve(count);

        for primitive in primitives {
            result.commands.push(primitive.kind.command_code());
            result.args.push(primitive.control_points.flatten());
            result.lengths.push(primitive.length);
            result.layer_ids.push(primitive.layer_id);
        }
        result.widths = vec![self.uniform_width; count];
        result.semantic_ids = vec![UNKNOWN_SEMANTIC_ID; count];
        result.instance_ids = vec![NO_INSTANCE_ID; count];
        result.rgb = vec![PLACEHOLDER_RGB; count];
        result
    }
}

impl Default for OutputAssembler {
    fn default() -> Self {
        Self::new(UNIFORM_DISPLAY_WIDTH)
    }
}
