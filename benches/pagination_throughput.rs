//! Pagination and page assembly benchmarks
//!
//! Measures slice planning alone, assembly of a ready capture into a PDF, and a full
//! export through the box rasterizer.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio::{ExportConfig, ExportRequest, ExporterBuilder, LayoutBox, MarginProfile, StyledNode};
use folio_pagination::{PlanInput, plan_slices};
use folio_render_core::PageAssembler;
use folio_render_lopdf::LopdfDocumentWriter;
use folio_traits::InMemoryResourceProvider;
use folio_types::{ContentPadding, PaperSize};
use image::{Rgba, RgbaImage};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

const CSS_WIDTH_PX: f32 = 794.0;

fn plan_input(height: u32, capture_scale: f32) -> PlanInput {
    PlanInput {
        capture_height_px: height,
        capture_scale,
        css_width_px: Some(CSS_WIDTH_PX),
        paper: PaperSize::A4.profile(),
        margins: MarginProfile::all(24.0),
        padding: Some(ContentPadding::new(24.0, 24.0)),
    }
}

/// Alternating grey stripes so page images do not compress to nothing.
fn striped_capture(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        if (y / 16) % 2 == 0 {
            Rgba([40, 40, 40, 255])
        } else {
            Rgba([220, 220, 220, 255])
        }
    })
}

fn resume(height: f32) -> StyledNode {
    StyledNode::element("main")
        .with_layout(LayoutBox::new(0.0, 0.0, CSS_WIDTH_PX, height))
        .with_style("padding-top", "24px")
        .with_style("padding-bottom", "24px")
        .with_style("--accent", "oklch(0.62 0.19 255)")
        .with_style("background-color", "#f8f8f8")
        .with_child(
            StyledNode::element("header")
                .with_layout(LayoutBox::new(0.0, 0.0, CSS_WIDTH_PX, 120.0))
                .with_style("background-color", "var(--accent)"),
        )
}

fn benchmark_slice_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice_planning");

    for pages in [1u32, 10, 100] {
        let input = plan_input(pages * 2200, 2.0);
        group.bench_with_input(BenchmarkId::new("pages", pages), &input, |b, input| {
            b.iter(|| plan_slices(black_box(input)));
        });
    }

    group.finish();
}

fn benchmark_page_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_assembly");
    group.sample_size(10);
    let assembler = PageAssembler::new(PaperSize::A4.profile());

    for pages in [1u32, 3, 6] {
        let capture = striped_capture((CSS_WIDTH_PX * 2.0) as u32, pages * 2200);
        let plan = plan_slices(&plan_input(capture.height(), 2.0));

        group.bench_with_input(BenchmarkId::new("pages", plan.page_count()), &plan, |b, plan| {
            b.iter(|| {
                let mut writer = LopdfDocumentWriter::new();
                assembler
                    .assemble(&capture, plan, &mut writer)
                    .expect("Failed to assemble pages");
                writer.to_bytes().expect("Failed to serialize PDF")
            });
        });
    }

    group.finish();
}

fn benchmark_full_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_export");
    group.sample_size(10);
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut exporter = ExporterBuilder::new()
        .with_config(ExportConfig::default())
        .with_resource_provider(Arc::new(InMemoryResourceProvider::new()))
        .build()
        .expect("Failed to build exporter");

    for height in [1000.0f32, 3000.0, 6000.0] {
        let path = dir.path().join(format!("resume-{}.pdf", height));
        group.bench_with_input(BenchmarkId::new("source_px", height), &height, |b, &height| {
            b.iter(|| {
                rt.block_on(exporter.export(ExportRequest::new(resume(height), &path)))
                    .expect("Failed to export")
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_slice_planning,
    benchmark_page_assembly,
    benchmark_full_export
);
criterion_main!(benches);
