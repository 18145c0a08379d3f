use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

fn page_dict(doc: &LopdfDocument, page_number: u32) -> Option<&Dictionary> {
    let page_id = *doc.get_pages().get(&page_number)?;
    doc.get_object(page_id).ok()?.as_dict().ok()
}

fn resolve<'a>(doc: &'a LopdfDocument, object: &'a Object) -> Option<&'a Object> {
    match object.as_reference() {
        Ok(id) => doc.get_object(id).ok(),
        Err(_) => Some(object),
    }
}

/// MediaBox width and height of a page, in points.
pub fn media_box(doc: &LopdfDocument, page_number: u32) -> Option<(f32, f32)> {
    let media_box = page_dict(doc, page_number)?.get(b"MediaBox").ok()?.as_array().ok()?;
    let width = media_box.get(2)?.as_float().ok()?;
    let height = media_box.get(3)?.as_float().ok()?;
    Some((width, height))
}

/// Pixel size of every image XObject on a page.
pub fn image_sizes(doc: &LopdfDocument, page_number: u32) -> Vec<(i64, i64)> {
    let Some(page) = page_dict(doc, page_number) else {
        return Vec::new();
    };
    let xobjects = page
        .get(b"Resources")
        .ok()
        .and_then(|r| resolve(doc, r))
        .and_then(|r| r.as_dict().ok())
        .and_then(|r| r.get(b"XObject").ok())
        .and_then(|x| resolve(doc, x))
        .and_then(|x| x.as_dict().ok());
    let Some(xobjects) = xobjects else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, reference)| resolve(doc, reference)?.as_stream().ok())
        .filter_map(|stream| {
            let width = stream.dict.get(b"Width").ok()?.as_i64().ok()?;
            let height = stream.dict.get(b"Height").ok()?.as_i64().ok()?;
            Some((width, height))
        })
        .collect()
}

/// The `cm` operands placing each image on a page: `[w, 0, 0, h, x, y]` in points.
pub fn image_matrices(doc: &LopdfDocument, page_number: u32) -> Vec<Vec<f32>> {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return Vec::new();
    };
    let Ok(data) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&data) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "cm")
        .map(|op| {
            op.operands
                .iter()
                .filter_map(|o| o.as_float().ok())
                .collect()
        })
        .collect()
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert every page has the given MediaBox size in points
#[macro_export]
macro_rules! assert_pdf_page_size {
    ($pdf:expr, $width:expr, $height:expr) => {
        for page in 1..=$pdf.page_count() as u32 {
            let (w, h) = $crate::common::pdf_assertions::media_box(&$pdf.doc, page)
                .expect("page has a MediaBox");
            assert!(
                (w - $width).abs() < 0.01 && (h - $height).abs() < 0.01,
                "Page {} is {}x{} pt, expected {}x{} pt",
                page,
                w,
                h,
                $width,
                $height
            );
        }
    };
}
