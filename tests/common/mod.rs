#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

/// A content control whose content holds one run per entry of `runs`.
pub fn control(key: &str, runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!("<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>", text))
        .collect();
    format!(
        "<w:sdt><w:sdtPr><w:alias w:val=\"{key}\"/><w:tag w:val=\"{key}\"/><w:id w:val=\"1\"/></w:sdtPr><w:sdtContent>{runs}</w:sdtContent></w:sdt>",
        key = key,
        runs = runs
    )
}

pub fn paragraph(inner: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">Dear </w:t></w:r>{}</w:p>", inner)
}

pub fn document_xml(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}<w:sectPr/></w:body></w:document>",
        body
    )
}

pub fn header_xml(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:hdr xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">{}</w:hdr>",
        inner
    )
}

/// Package with the usual boilerplate entries followed by `parts`.
pub fn build_package(parts: &[(&str, String)]) -> Vec<u8> {
    build_package_with_types(CONTENT_TYPES, parts)
}

/// `[Content_Types].xml` declaring each `(part name, content type)` as an override.
pub fn content_types(overrides: &[(&str, &str)]) -> String {
    let overrides: String = overrides
        .iter()
        .map(|(part, kind)| format!("<Override PartName=\"/{}\" ContentType=\"{}\"/>", part, kind))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/><Default Extension=\"xml\" ContentType=\"application/xml\"/>{}</Types>",
        overrides
    )
}

pub fn build_package_with_types(types: &str, parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = || SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", deflated()).unwrap();
    zip.write_all(types.as_bytes()).unwrap();
    zip.start_file("_rels/.rels", deflated()).unwrap();
    zip.write_all(RELS.as_bytes()).unwrap();
    zip.start_file("word/styles.xml", stored()).unwrap();
    zip.write_all(STYLES.as_bytes()).unwrap();

    for (name, content) in parts {
        zip.start_file(*name, deflated()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// The letter template used across tests: name and raise in the body.
pub fn raise_letter() -> Vec<u8> {
    let body = format!(
        "{}<w:p><w:r><w:t xml:space=\"preserve\">Your raise: </w:t></w:r>{}</w:p>",
        paragraph(&control("EmployeeName", &["Employee", " Name"])),
        control("SalaryRaise", &["$0.00"])
    );
    build_package(&[("word/document.xml", document_xml(&body))])
}

pub fn footer_xml(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:ftr xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">{}</w:ftr>",
        inner
    )
}

/// Word's page-number footer: a gallery content control with no alias or tag.
pub fn page_number_control() -> String {
    "<w:sdt><w:sdtPr><w:id w:val=\"98\"/><w:docPartObj><w:docPartGallery w:val=\"Page Numbers (Bottom of Page)\"/><w:docPartUnique/></w:docPartObj></w:sdtPr><w:sdtContent><w:p><w:r><w:fldChar w:fldCharType=\"begin\"/></w:r><w:r><w:instrText xml:space=\"preserve\"> PAGE </w:instrText></w:r><w:r><w:fldChar w:fldCharType=\"separate\"/></w:r><w:r><w:t>1</w:t></w:r><w:r><w:fldChar w:fldCharType=\"end\"/></w:r></w:p></w:sdtContent></w:sdt>".to_string()
}

pub fn read_entry(package: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

pub fn entry_names(package: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
