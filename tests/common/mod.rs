pub mod fixtures;
pub mod pdf_assertions;

use folio::{ExportConfig, ExportError, ExportRequest, ExportSummary, ExporterBuilder};
use folio_traits::{
    DocumentWriter, ImagePlacement, InMemoryResourceProvider, RasterError, RasterOptions,
    RasterRequest, Rasterizer, WriterError,
};
use folio_types::{Orientation, PaperProfile};
use image::RgbaImage;
use lopdf::Document as LopdfDocument;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

/// One call made on a [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriterCall {
    NewDocument(&'static str),
    AddPage(&'static str, Orientation),
    AddImage(ImagePlacement),
    Save(PathBuf),
}

/// A `DocumentWriter` that keeps every call and decoded page image in memory.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub calls: Vec<WriterCall>,
    pub images: Vec<RgbaImage>,
}

impl RecordingWriter {
    pub fn placements(&self) -> Vec<ImagePlacement> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                WriterCall::AddImage(placement) => Some(*placement),
                _ => None,
            })
            .collect()
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.calls.iter().rev().find_map(|call| match call {
            WriterCall::Save(path) => Some(path.as_path()),
            _ => None,
        })
    }
}

impl DocumentWriter for RecordingWriter {
    fn new_document(&mut self, paper: &PaperProfile) -> Result<(), WriterError> {
        self.calls.push(WriterCall::NewDocument(paper.format_tag));
        Ok(())
    }

    fn add_page(&mut self, paper: &PaperProfile, orientation: Orientation) -> Result<(), WriterError> {
        self.calls.push(WriterCall::AddPage(paper.format_tag, orientation));
        Ok(())
    }

    fn add_image(&mut self, png: &[u8], placement: ImagePlacement) -> Result<(), WriterError> {
        let image = image::load_from_memory(png)
            .map_err(|e| WriterError::InvalidImage(e.to_string()))?
            .to_rgba8();
        self.images.push(image);
        self.calls.push(WriterCall::AddImage(placement));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), WriterError> {
        self.calls.push(WriterCall::Save(path.to_path_buf()));
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.images.len()
    }
}

/// What a rasterizer was asked to paint.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub node: folio::StyledNode,
    pub options: RasterOptions,
}

/// Delegates to `inner`, failing the first `failures` calls and keeping every request.
pub struct ScriptedRasterizer<R> {
    pub inner: R,
    pub failures: usize,
    pub seen: Mutex<Vec<SeenRequest>>,
}

impl<R: Rasterizer> ScriptedRasterizer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failures: 0,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl<R: Rasterizer> Rasterizer for ScriptedRasterizer<R> {
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage, RasterError> {
        let call = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(SeenRequest {
                node: request.node.clone(),
                options: request.options.clone(),
            });
            seen.len()
        };
        if call <= self.failures {
            return Err(RasterError::Font(format!("scripted failure {}", call)));
        }
        self.inner.rasterize(request).await
    }

    fn name(&self) -> &str {
        "ScriptedRasterizer"
    }
}

/// Builds an exporter around `rasterizer` with no image resources.
pub fn exporter_with<R: Rasterizer>(config: ExportConfig, rasterizer: R) -> folio::Exporter<R> {
    ExporterBuilder::new()
        .with_rasterizer(rasterizer)
        .with_config(config)
        .with_resource_provider(Arc::new(InMemoryResourceProvider::new()))
        .build()
        .unwrap()
}

/// Runs one export into a fresh [`RecordingWriter`].
pub async fn export_recorded<R: Rasterizer>(
    exporter: &mut folio::Exporter<R>,
    request: ExportRequest,
) -> Result<(ExportSummary, RecordingWriter), ExportError> {
    let mut writer = RecordingWriter::default();
    let summary = exporter.export_with_writer(request, &mut writer).await?;
    Ok((summary, writer))
}
