use std::path::Path;

use docrag_core::traits::TextExtractor;
use docrag_extract::{AutoExtractor, PdfExtractor, PlainTextExtractor};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! { "Font" => dictionary! { "F1" => font_id } });
    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

#[test]
fn pdf_pages_come_back_in_order() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("doc.pdf");
    write_pdf(&path, &["Alpha beta gamma", "Delta epsilon"]);

    let pages = PdfExtractor.extract(&path).expect("extract");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page, 1);
    assert_eq!(pages[1].page, 2);
    assert!(pages[0].text.contains("Alpha beta gamma"), "{:?}", pages[0].text);
    assert!(pages[1].text.contains("Delta epsilon"), "{:?}", pages[1].text);
}

#[test]
fn broken_pdf_is_an_extraction_error() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("broken.pdf");
    std::fs::write(&path, b"not a pdf at all").expect("write");
    let err = AutoExtractor.extract(&path).expect_err("broken pdf");
    assert!(matches!(err, docrag_core::Error::Extraction(_)), "{err}");
}

#[test]
fn form_feeds_split_plain_text_pages() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("notes.txt");
    std::fs::write(&path, "first page\x0csecond page\x0c").expect("write");

    let pages = PlainTextExtractor.extract(&path).expect("extract");
    let numbered: Vec<(u32, &str)> = pages.iter().map(|p| (p.page, p.text.as_str())).collect();
    assert_eq!(numbered, vec![(1, "first page"), (2, "second page"), (3, "")]);
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("latin1.txt");
    std::fs::write(&path, b"caf\xe9 au lait").expect("write");
    let pages = AutoExtractor.extract(&path).expect("extract");
    assert_eq!(pages.len(), 1);
    assert!(pages[0].text.starts_with("caf"));
    assert!(pages[0].text.ends_with("au lait"));
}

#[test]
fn unknown_extension_and_missing_file_are_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let docx = tmp.path().join("report.docx");
    std::fs::write(&docx, b"PK").expect("write");
    assert!(matches!(AutoExtractor.extract(&docx), Err(docrag_core::Error::Extraction(_))));

    let missing = tmp.path().join("missing.txt");
    assert!(matches!(AutoExtractor.extract(&missing), Err(docrag_core::Error::Extraction(_))));
}
