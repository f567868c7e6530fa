//! 控制台输出：转换摘要与文档检查报告。

use planprim_core::document::DrawItemKind;
use planprim_core::primitive::StructuralClass;
use planprim_engine::PipelineOutcome;
use planprim_engine::inspect::DocumentInspection;
use planprim_engine::report::DropReason;

use crate::convert::ConvertSummary;

pub fn print_convert_summary(summary: &ConvertSummary) {
    let run = summary.outcome.run();
    let analysis = &run.analysis;
    let report = &run.report;

    println!("输入：{}", summary.input.display());
    println!(
        "第 {} 页，图层注册表：{}（{} 个图层，{} 个结构图层）",
        run.page_index,
        if analysis.has_registry { "有" } else { "无" },
        analysis.layer_count,
        analysis.structural_layers.len()
    );
    let stats = &analysis.statistics;
    println!(
        "线宽 p50={:.3} p75={:.3} p90={:.3} p95={:.3} max={:.3}{}",
        stats.p50,
        stats.p75,
        stats.p90,
        stats.p95,
        stats.max,
        if stats.synthetic { "（无有效线宽，使用回退值）" } else { "" }
    );
    println!(
        "阈值 wall={:.3} medium={:.3}，缩放 {:.5}，画布 {}x{}",
        analysis.thresholds.wall,
        analysis.thresholds.medium,
        run.scale,
        run.result.width,
        run.result.height
    );
    println!(
        "排除区域：文本 {}，图签 {}，图例 {}",
        run.zones.text, run.zones.title_block, run.zones.legend
    );

    println!("提取 {} 个图元：", report.extracted);
    println!("  - {}: {}", DropReason::HiddenLayer, report.hidden_layer_excluded);
    println!("  - {}: {}", DropReason::ZoneExcluded, report.zone_excluded);
    for class in StructuralClass::ALL {
        println!(
            "  - {}: {}",
            DropReason::BelowMinLength(class),
            report.dropped(DropReason::BelowMinLength(class))
        );
    }
    println!(
        "保留 {} 个（wall {}, medium {}, detail {}），候选 {} 个",
        report.kept_total(),
        report.kept.wall,
        report.kept.medium,
        report.kept.detail,
        report.candidates
    );

    if let Some(lengths) = &run.lengths {
        println!(
            "长度 min={:.2} max={:.2} mean={:.2} median={:.2}",
            lengths.min, lengths.max, lengths.mean, lengths.median
        );
    }
    for warning in &run.warnings {
        println!("警告：{warning}");
    }

    match (&summary.outcome, &summary.output) {
        (PipelineOutcome::Populated(_), Some(path)) => println!("已写出：{}", path.display()),
        (PipelineOutcome::FilteredEmpty(_), _) => {
            println!("所有候选图元均被过滤，未写出结果；可尝试放宽最小长度或关闭区域排除。")
        }
        (PipelineOutcome::Populated(_), None) => {}
    }
}

pub fn print_inspection(inspection: &DocumentInspection) {
    println!("文档：{}", inspection.source);
    println!("页数：{}", inspection.page_count());

    if inspection.layers.is_empty() {
        println!("图层注册表：无");
    } else {
        println!("图层注册表（{} 个）：", inspection.layers.len());
        for layer in &inspection.layers {
            println!("  - [{}] {} (可见: {})", layer.id, layer.name, layer.visible);
        }
    }

    for page in &inspection.pages {
        println!(
            "第 {} 页 {:.1} x {:.1}：{} 条路径，{} 个文本块",
            page.index, page.width, page.height, page.path_count, page.text_block_count
        );
        let kinds: Vec<String> = [
            DrawItemKind::Line,
            DrawItemKind::Cubic,
            DrawItemKind::Rect,
            DrawItemKind::Quad,
        ]
        .into_iter()
        .map(|kind| format!("{}={}", kind.as_str(), page.item_count(kind)))
        .collect();
        println!("  绘制指令：{}", kinds.join(", "));
        println!(
            "  带图层引用的路径 {} 条，不同引用 {} 个",
            page.layered_paths,
            page.layer_refs.len()
        );
    }

    println!(
        "包含图层信息：{}",
        if inspection.has_layer_information() { "是" } else { "否" }
    );
}
