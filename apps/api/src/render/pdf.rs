//! PDF encoder: writes layout instructions into a paginated PDF using a standard font.
//!
//! Layout coordinates are millimetres from the top-left; PDF user space is points from
//! the bottom-left. This is the only place that conversion happens.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::debug;

use crate::layout::geometry::PT_PER_MM;
use crate::layout::{page_count, LayoutInstruction, PageGeometry};

const FONT_RESOURCE: &str = "F1";
const DOCUMENT_TITLE: &str = "Tailored Resume";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to encode page content stream: {0}")]
    Content(String),

    #[error("failed to serialize PDF document: {0}")]
    Serialize(String),
}

/// Encodes instructions into PDF bytes. Produces at least one (possibly blank) page.
pub fn encode_pdf(
    instructions: &[LayoutInstruction],
    geometry: &PageGeometry,
) -> Result<Vec<u8>, EncodingError> {
    let mut doc = build_document(instructions, geometry)?;

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| EncodingError::Serialize(e.to_string()))?;

    debug!(
        pages = page_count(instructions),
        bytes = buffer.len(),
        "Encoded PDF document"
    );
    Ok(buffer)
}

/// Assembles the in-memory document: one shared font resource, one content stream per page.
fn build_document(
    instructions: &[LayoutInstruction],
    geometry: &PageGeometry,
) -> Result<Document, EncodingError> {
    let page_width_pt = geometry.page_width * PT_PER_MM;
    let page_height_pt = geometry.page_height * PT_PER_MM;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => geometry.font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let total_pages = page_count(instructions);
    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(total_pages);

    for page_index in 0..total_pages {
        let lines = instructions.iter().filter(|i| i.page_index == page_index);
        let content = page_content(lines, geometry, page_height_pt);
        let encoded = content
            .encode()
            .map_err(|e| EncodingError::Content(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
        "Count" => total_pages as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), page_width_pt.into(), page_height_pt.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(DOCUMENT_TITLE),
        "Producer" => Object::string_literal(concat!("resume-api ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    Ok(doc)
}

/// Builds one page's content stream: a single text object, one `Tm` + `Tj` per line.
fn page_content<'a>(
    lines: impl Iterator<Item = &'a LayoutInstruction>,
    geometry: &PageGeometry,
    page_height_pt: f32,
) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                geometry.font_size_pt.into(),
            ],
        ),
    ];

    // Blank lines are vertical space only; nothing to draw.
    for line in lines.filter(|l| !l.text.is_empty()) {
        let x = line.x * PT_PER_MM;
        let y = page_height_pt - line.y * PT_PER_MM;
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&line.text), StringFormat::Literal)],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Encodes text for a WinAnsiEncoding simple font.
///
/// Latin-1 maps straight through; the typographic punctuation common in resumes maps
/// to its cp1252 slot; anything else becomes `?`.
pub(crate) fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2026}' => 0x85, // ellipsis
            '\u{20AC}' => 0x80, // euro
            '\t' => b' ',
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
