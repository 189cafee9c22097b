//! Paginated PDF export of a rendered document region.
//!
//! The region SVG is rasterized once at a fixed supersampling factor, sliced
//! top-to-bottom into page-content-height chunks, and each chunk becomes one
//! fixed-size page. Failures here propagate: an export either produces a
//! complete document or reports why it could not.

use crate::render::preview::{DocumentPreview, PrintPaletteGuard};
use crate::render::raster::{self, RasterError};
use crate::render::RenderedDiagram;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("failed to embed page image: {0}")]
    ImageEmbed(String),
    #[error("failed to assemble PDF: {0}")]
    PdfAssembly(String),
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Page geometry in PDF points plus the raster supersampling factor.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub supersample: f32,
}

impl Default for PageOptions {
    fn default() -> Self {
        // A4 portrait.
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 20.0,
            supersample: 2.0,
        }
    }
}

impl PageOptions {
    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }
}

/// Exports the preview as a paginated PDF, optionally appending a standalone
/// diagram as one trailing page.
///
/// The preview's theme is swapped for the print-safe palette for the duration
/// of the export and restored on every exit path.
pub fn export_document_sync(
    preview: &mut DocumentPreview,
    trailing: Option<&RenderedDiagram>,
    options: &PageOptions,
) -> Result<Vec<u8>> {
    let guard = PrintPaletteGuard::apply(preview);
    let region_svg = guard.preview().region_svg();
    assemble_pdf(&region_svg, trailing.map(|d| d.svg.as_str()), options)
}

pub async fn export_document(
    preview: &mut DocumentPreview,
    trailing: Option<&RenderedDiagram>,
    options: &PageOptions,
) -> Result<Vec<u8>> {
    export_document_sync(preview, trailing, options)
}

/// Converts a single rendered diagram SVG to a standalone one-page PDF sized
/// to the diagram.
pub fn diagram_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    // Keep output stable-ish across environments while still using system fonts.
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::PdfConvert)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| ExportError::PdfConvert)
}

/// Derives the output file name from the document title.
pub fn file_name_for(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "document.pdf".to_string();
    }
    let mut name = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_' | '.') {
            name.push(ch);
        } else {
            name.push('_');
        }
    }
    format!("{}.pdf", name.trim())
}

fn assemble_pdf(
    region_svg: &str,
    trailing_svg: Option<&str>,
    options: &PageOptions,
) -> Result<Vec<u8>> {
    let _span = tracing::debug_span!("assemble_pdf").entered();
    let pixmap = raster::svg_to_pixmap(region_svg, options.supersample, Some("white"))?;

    let ratio = pixmap.width() as f32 / options.content_width();
    let page_height_px = (options.content_height() * ratio).floor().max(1.0) as u32;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<ObjectId> = Vec::new();

    let mut top = 0u32;
    while top < pixmap.height() {
        let chunk = page_height_px.min(pixmap.height() - top);
        let png = raster::slice_png(&pixmap, top, chunk)?;
        let display_height = chunk as f32 / ratio;
        let page_id = add_image_page(
            &mut doc,
            pages_id,
            options,
            png,
            (
                options.margin,
                options.page_height - options.margin - display_height,
            ),
            (options.content_width(), display_height),
        )?;
        kids.push(page_id);
        top += chunk;
    }
    tracing::debug!(pages = kids.len(), raster_height = pixmap.height(), "sliced region");

    if let Some(svg) = trailing_svg {
        let diagram = raster::svg_to_pixmap(svg, options.supersample, Some("white"))?;
        let png = diagram
            .encode_png()
            .map_err(|_| RasterError::PngEncode)?;
        // Scale to fit the printable area, preserving aspect ratio, centered.
        let natural_w = diagram.width() as f32 / options.supersample;
        let natural_h = diagram.height() as f32 / options.supersample;
        let scale = (options.content_width() / natural_w)
            .min(options.content_height() / natural_h)
            .min(1.0);
        let (w, h) = (natural_w * scale, natural_h * scale);
        let x = options.margin + (options.content_width() - w) / 2.0;
        let y = options.margin + (options.content_height() - h) / 2.0;
        let page_id = add_image_page(&mut doc, pages_id, options, png, (x, y), (w, h))?;
        kids.push(page_id);
    }

    let kid_refs: Vec<Object> = kids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kid_refs,
            "Count" => kids.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ExportError::PdfAssembly(e.to_string()))?;
    Ok(out)
}

fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    options: &PageOptions,
    png: Vec<u8>,
    position: (f32, f32),
    size: (f32, f32),
) -> Result<ObjectId> {
    let empty_content: Content = Content {
        operations: Vec::new(),
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        empty_content
            .encode()
            .map_err(|e| ExportError::PdfAssembly(e.to_string()))?,
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(options.page_width.into()),
            Object::Real(options.page_height.into()),
        ],
        "Contents" => content_id,
    });
    let image = lopdf::xobject::image_from(png)
        .map_err(|e| ExportError::ImageEmbed(e.to_string()))?;
    doc.insert_image(page_id, image, position, size)
        .map_err(|e| ExportError::PdfAssembly(e.to_string()))?;
    Ok(page_id)
}
