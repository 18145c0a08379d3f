use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::export::Exporter;
use folio_capture::CaptureEngine;
use folio_render_core::BoxRasterizer;
use folio_resource::FilesystemResourceProvider;
use folio_traits::{Rasterizer, ResourceProvider};
use folio_types::{MarginProfile, PaperSize};
use std::path::Path;
use std::sync::Arc;

/// A builder for creating an [`Exporter`].
pub struct ExporterBuilder<R: Rasterizer> {
    config: ExportConfig,
    rasterizer: R,
    resources: Option<Arc<dyn ResourceProvider>>,
}

impl Default for ExporterBuilder<BoxRasterizer> {
    fn default() -> Self {
        Self {
            config: ExportConfig::default(),
            rasterizer: BoxRasterizer::new(),
            resources: None,
        }
    }
}

impl ExporterBuilder<BoxRasterizer> {
    /// Creates a builder with the default configuration and the box rasterizer.
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R: Rasterizer> ExporterBuilder<R> {
    /// Replaces the rasterization primitive.
    pub fn with_rasterizer<T: Rasterizer>(self, rasterizer: T) -> ExporterBuilder<T> {
        ExporterBuilder {
            config: self.config,
            rasterizer,
            resources: self.resources,
        }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a JSON file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ExportError> {
        self.config = ExportConfig::from_file(path)?;
        Ok(self)
    }

    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.config.paper_size = paper_size;
        self
    }

    pub fn with_margins(mut self, margins: MarginProfile) -> Self {
        self.config.margins = margins.clamped();
        self
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(provider);
        self
    }

    /// Resolves image sources against files under `base`.
    pub fn with_resource_dir<P: AsRef<Path>>(self, base: P) -> Self {
        self.with_resource_provider(Arc::new(FilesystemResourceProvider::new(base)))
    }

    /// Consumes the builder and creates the `Exporter`.
    ///
    /// Without a resource provider, image sources resolve against the working directory.
    pub fn build(self) -> Result<Exporter<R>, ExportError> {
        self.config.validate()?;
        let resources = self
            .resources
            .unwrap_or_else(|| Arc::new(FilesystemResourceProvider::new(".")));
        log::debug!(
            "Building exporter with {} and resources from {}",
            self.rasterizer.name(),
            resources.name()
        );
        let engine = CaptureEngine::new(self.rasterizer, resources)
            .with_normalizer(self.config.normalizer())
            .with_stylesheet_filter(Box::new(self.config.at_rule_filter()))
            .with_pixel_ratio(self.config.capture_scale)
            .with_min_height_policy(self.config.min_height_policy);
        Ok(Exporter::new(self.config, engine))
    }
}
