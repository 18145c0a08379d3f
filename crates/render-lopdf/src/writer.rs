use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_render_core::utils::flip_y;
use folio_traits::{DocumentWriter, ImagePlacement, WriterError};
use folio_types::units::mm_to_pt;
use folio_types::{Orientation, PaperProfile};
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn encoding_error(err: lopdf::Error) -> WriterError {
    WriterError::Encoding(err.to_string())
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, WriterError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// The page currently receiving images.
#[derive(Debug)]
struct OpenPage {
    width_pt: f32,
    height_pt: f32,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

impl OpenPage {
    fn new(paper: &PaperProfile, orientation: Orientation) -> Self {
        let (width_pt, height_pt) = (mm_to_pt(paper.width_mm), mm_to_pt(paper.height_mm));
        let (width_pt, height_pt) = match orientation {
            Orientation::Portrait => (width_pt, height_pt),
            Orientation::Landscape => (height_pt, width_pt),
        };
        Self {
            width_pt,
            height_pt,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }
}

/// Builds a PDF in memory, one image-only page at a time.
#[derive(Debug)]
pub struct LopdfDocumentWriter {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    open_page: Option<OpenPage>,
    image_count: usize,
    started: bool,
}

impl Default for LopdfDocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfDocumentWriter {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            open_page: None,
            image_count: 0,
            started: false,
        }
    }

    fn open_page_mut(&mut self) -> Result<&mut OpenPage, WriterError> {
        self.open_page.as_mut().ok_or(WriterError::NoDocument)
    }

    /// Writes the open page's content stream and page object.
    fn close_page(&mut self) -> Result<(), WriterError> {
        let Some(page) = self.open_page.take() else {
            return Ok(());
        };
        let content = Content {
            operations: page.operations,
        };
        let encoded = content.encode().map_err(encoding_error)?;
        let content_stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, deflate(&encoded)?)
            .with_compression(false);
        let content_id = self.document.add_object(content_stream);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width_pt.into(), page.height_pt.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => page.xobjects },
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish_document(&mut self) -> Result<(), WriterError> {
        if !self.started {
            return Err(WriterError::NoDocument);
        }
        self.close_page()?;
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));
        if self.document.trailer.get(b"Root").is_err() {
            let catalog_id = self
                .document
                .add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
            self.document.trailer.set("Root", catalog_id);
        }
        Ok(())
    }

    /// Finishes the document and writes it to `writer`.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<(), WriterError> {
        self.finish_document()?;
        self.document
            .save_to(writer)
            .map_err(|e| WriterError::Encoding(e.to_string()))
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, WriterError> {
        let mut bytes = Vec::new();
        self.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl DocumentWriter for LopdfDocumentWriter {
    fn new_document(&mut self, paper: &PaperProfile) -> Result<(), WriterError> {
        *self = Self::new();
        self.started = true;
        self.open_page = Some(OpenPage::new(paper, Orientation::Portrait));
        debug!("Started {} document", paper.format_tag);
        Ok(())
    }

    fn add_page(&mut self, paper: &PaperProfile, orientation: Orientation) -> Result<(), WriterError> {
        if !self.started {
            return Err(WriterError::NoDocument);
        }
        self.close_page()?;
        self.open_page = Some(OpenPage::new(paper, orientation));
        Ok(())
    }

    fn add_image(&mut self, png: &[u8], placement: ImagePlacement) -> Result<(), WriterError> {
        placement.validate()?;
        let height_pt = self.open_page_mut()?.height_pt;

        let rgb = image::load_from_memory(png)
            .map_err(|e| WriterError::InvalidImage(e.to_string()))?
            .to_rgb8();
        let (width_px, height_px) = rgb.dimensions();
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width_px as i64,
                "Height" => height_px as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(rgb.as_raw())?,
        )
        .with_compression(false);
        let image_id = self.document.add_object(image_stream);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let width = mm_to_pt(placement.width_mm);
        let height = mm_to_pt(placement.height_mm);
        let x = mm_to_pt(placement.x_mm);
        let y = flip_y(mm_to_pt(placement.y_mm) + height, height_pt);

        let page = self.open_page_mut()?;
        page.xobjects.set(name.as_bytes().to_vec(), image_id);
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), WriterError> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_to(&mut file)?;
        file.flush()?;
        debug!("Saved {} page(s) to {}", self.page_ids.len(), path.display());
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.open_page.is_some())
    }
}
