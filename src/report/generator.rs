//! PDF report assembly
//!
//! Lays out a one-page A4 report: title, report id and timestamp, the
//! prediction with wrapped descriptive text, a bulleted symptom list that
//! paginates when vertical space runs out, then the patient MRI next to a
//! reference normal scan. Every layout failure surfaces as
//! [`ScanError::Report`].

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tracing::warn;

use crate::{Result, ScanError};

use super::wrap::wrap_text;

// A4 in points.
const PAGE_WIDTH: f64 = 595.276;
const PAGE_HEIGHT: f64 = 841.89;
const LEFT_MARGIN: f64 = 40.0;
const TOP_Y: f64 = PAGE_HEIGHT - 50.0;
/// Below this cursor position the symptom list breaks to a new page.
const BREAK_Y: f64 = 110.0;
/// Vertical box available to each thumbnail.
const IMAGE_SLOT_HEIGHT: f64 = 260.0;
/// At most this many symptoms fit on one page before a break.
const SYMPTOMS_PER_PAGE: usize = 8;

const BODY_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

fn real(v: f64) -> Object {
    Object::Real(v as _)
}

/// Prediction payload rendered into the report.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub label: String,
    /// Already formatted, e.g. `"97.31%"`.
    pub confidence: String,
    pub description: String,
    pub cause: String,
    pub symptoms: Vec<String>,
}

/// Accumulates page content streams with a moving baseline cursor.
struct PageComposer {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f64,
}

impl PageComposer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: TOP_Y,
        }
    }

    fn text(&mut self, font: &str, size: f64, x: f64, content: impl Into<Vec<u8>>) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), real(size)]));
        self.ops
            .push(Operation::new("Td", vec![real(x), real(self.y)]));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(content)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(ops);
        self.y = TOP_Y;
    }

    /// Draw the XObject named `name` with its top edge at the cursor.
    /// Returns the y of its bottom edge.
    fn image(&mut self, name: &str, x: f64, width: f64, height: f64) -> f64 {
        let bottom = self.y - height;
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                real(width),
                real(0.0),
                real(0.0),
                real(height),
                real(x),
                real(bottom),
            ],
        ));
        self.ops.push(Operation::new("Do", vec![name.into()]));
        self.ops.push(Operation::new("Q", vec![]));
        bottom
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

/// Draw `text` word-wrapped at the current cursor, advancing by `leading`
/// per line.
fn draw_wrapped(page: &mut PageComposer, text: &str, size: f64, leading: f64, max_width: f64) {
    for line in wrap_text(text, max_width, size) {
        page.text(BODY_FONT, size, LEFT_MARGIN, line.as_str());
        page.advance(leading);
    }
}

/// Re-encode a thumbnail as baseline JPEG and wrap it in an image XObject.
fn image_xobject(img: &DynamicImage) -> Result<(Stream, u32, u32)> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .map_err(|e| ScanError::Report(format!("thumbnail encode: {e}")))?;
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => w as i64,
        "Height" => h as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    Ok((Stream::new(dict, jpeg), w, h))
}

/// Generate the PDF report at `output`.
///
/// The patient image must decode; an unreadable or missing reference image
/// only drops the comparison column.
pub fn generate(
    data: &ReportData,
    patient_image: &Path,
    reference_image: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let patient = image::open(patient_image)
        .map_err(|e| ScanError::Report(format!("patient image: {e}")))?;
    let reference = reference_image.filter(|p| p.exists()).and_then(|p| {
        image::open(p)
            .map_err(|e| warn!(path = %p.display(), error = %e, "Reference image unreadable, omitting"))
            .ok()
    });

    let max_width = PAGE_WIDTH - 2.0 * LEFT_MARGIN;
    let mut page = PageComposer::new();

    page.text(
        BOLD_FONT,
        16.0,
        LEFT_MARGIN,
        "Medical AI Report - Brain Tumor Classification",
    );
    page.advance(30.0);

    page.text(
        BODY_FONT,
        10.0,
        LEFT_MARGIN,
        format!("Report ID: {}", uuid::Uuid::new_v4()),
    );
    page.text(
        BODY_FONT,
        10.0,
        LEFT_MARGIN + 300.0,
        format!("Date: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")),
    );
    page.advance(25.0);

    page.text(BOLD_FONT, 12.0, LEFT_MARGIN, "Prediction");
    page.advance(18.0);
    page.text(
        BODY_FONT,
        11.0,
        LEFT_MARGIN,
        format!("Label: {}    Confidence: {}", data.label, data.confidence),
    );
    page.advance(16.0);

    draw_wrapped(
        &mut page,
        &format!("Description: {}", data.description),
        11.0,
        14.0,
        max_width,
    );
    page.advance(2.0);
    draw_wrapped(
        &mut page,
        &format!("Cause: {}", data.cause),
        11.0,
        14.0,
        max_width,
    );
    page.advance(8.0);

    page.text(BOLD_FONT, 12.0, LEFT_MARGIN, "Symptoms");
    page.advance(16.0);
    let mut on_page = 0;
    for (i, symptom) in data.symptoms.iter().enumerate() {
        // 0x95 is the bullet glyph in WinAnsiEncoding.
        let mut line = vec![0x95, b' '];
        line.extend_from_slice(symptom.as_bytes());
        page.text(BODY_FONT, 10.0, LEFT_MARGIN + 12.0, line);
        page.advance(14.0);
        on_page += 1;
        let more_remaining = i + 1 < data.symptoms.len();
        if (on_page == SYMPTOMS_PER_PAGE || page.y < BREAK_Y) && more_remaining {
            page.break_page();
            on_page = 0;
        }
    }
    page.advance(10.0);

    // Side by side: patient MRI vs normal reference. The heading and full
    // image slot must stay on one page.
    if page.y < IMAGE_SLOT_HEIGHT + 40.0 {
        page.break_page();
    }
    let slot_w = (max_width - 20.0) / 2.0;
    let patient_thumb = patient.thumbnail(slot_w as u32, IMAGE_SLOT_HEIGHT as u32);
    let reference_thumb = reference.map(|img| img.thumbnail(slot_w as u32, IMAGE_SLOT_HEIGHT as u32));

    page.text(BOLD_FONT, 12.0, LEFT_MARGIN, "Patient MRI");
    if reference_thumb.is_some() {
        page.text(
            BOLD_FONT,
            12.0,
            LEFT_MARGIN + slot_w + 20.0,
            "Reference: Normal brain (no tumor)",
        );
    }
    page.advance(12.0);

    let (patient_stream, pw, ph) = image_xobject(&patient_thumb)?;
    let mut xobjects: Vec<(&str, Stream)> = vec![("Im1", patient_stream)];
    page.image("Im1", LEFT_MARGIN, pw as f64, ph as f64);
    if let Some(thumb) = &reference_thumb {
        let (stream, rw, rh) = image_xobject(thumb)?;
        xobjects.push(("Im2", stream));
        page.image("Im2", LEFT_MARGIN + slot_w + 20.0, rw as f64, rh as f64);
    }

    write_document(page.finish(), xobjects, output)
}

fn write_document(
    pages: Vec<Vec<Operation>>,
    xobjects: Vec<(&str, Stream)>,
    output: &Path,
) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut xobject_dict = Dictionary::new();
    for (name, stream) in xobjects {
        let id = doc.add_object(stream);
        xobject_dict.set(name, id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { BODY_FONT => body_font, BOLD_FONT => bold_font },
        "XObject" => Object::Dictionary(xobject_dict),
    });

    let mut kids: Vec<Object> = Vec::new();
    for ops in pages {
        let content = Content { operations: ops };
        let encoded = content
            .encode()
            .map_err(|e| ScanError::Report(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(output)
        .map_err(|e| ScanError::Report(format!("save: {e}")))?;
    Ok(())
}
