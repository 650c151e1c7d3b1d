//! Sample files for tests

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;

/// 16x8 RGBA PNG.
pub fn sample_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 8, Rgba([200, 30, 30, 128]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .expect("encode sample png");
    buffer.into_inner()
}

/// PNG with extra bytes appended after the image end marker.
pub fn sample_png_with_trailer(trailer: &[u8]) -> Vec<u8> {
    let mut data = sample_png();
    data.extend_from_slice(trailer);
    data
}

/// One-page PDF saying "Hello World". Resources and MediaBox live on the page tree
/// root so the page has to inherit them.
pub fn sample_pdf() -> Vec<u8> {
    build_pdf(false)
}

/// Like [`sample_pdf`] with a JavaScript OpenAction and an info dictionary.
pub fn sample_pdf_with_script() -> Vec<u8> {
    build_pdf(true)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn build_pdf(with_script: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", name("Font"));
    font.set("Subtype", name("Type1"));
    font.set("BaseFont", name("Courier"));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![name("F1"), Object::Integer(24)]),
            Operation::new("Td", vec![Object::Integer(100), Object::Integer(600)]),
            Operation::new("Tj", vec![Object::string_literal("Hello World")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Object::Stream(Stream::new(
        Dictionary::new(),
        content.encode().expect("encode sample content"),
    )));

    let mut page = Dictionary::new();
    page.set("Type", name("Page"));
    page.set("Parent", Object::Reference(pages_id));
    page.set("Contents", Object::Reference(content_id));
    let page_id = doc.add_object(Object::Dictionary(page));

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    pages.set("Resources", Object::Reference(resources_id));
    pages.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ]),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", name("Catalog"));
    catalog.set("Pages", Object::Reference(pages_id));

    if with_script {
        let mut action = Dictionary::new();
        action.set("S", name("JavaScript"));
        action.set("JS", Object::string_literal("app.alert('pwned')"));
        catalog.set("OpenAction", Object::Dictionary(action));

        let mut info = Dictionary::new();
        info.set("Author", Object::string_literal("tracking-id-1234"));
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save sample pdf");
    buffer
}
