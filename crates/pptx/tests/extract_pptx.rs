//! End-to-end extraction over a minimal in-memory PPTX archive.

use std::io::{Cursor, Write};

use deckcheck_core::Error;
use deckcheck_pptx::{OcrEngine, OcrError, PptxExtractor};
use zip::write::FileOptions;
use zip::ZipWriter;

/// OCR stub that recognizes every image as the same text.
struct FixedTextOcr(&'static str);

impl OcrEngine for FixedTextOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

/// OCR stub that fails on every image.
struct BrokenOcr;

impl OcrEngine for BrokenOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Engine("no text detected".to_string()))
    }
}

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide3.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#;

const SLIDE_1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:txBody><a:p><a:r><a:t>Q1 Results</a:t></a:r></a:p></p:txBody></p:sp>
    <p:sp><p:txBody>
      <a:p><a:r><a:t>Revenue up 12%</a:t></a:r></a:p>
      <a:p><a:r><a:t>Headcount flat</a:t></a:r></a:p>
    </p:txBody></p:sp>
    <p:graphicFrame><a:graphic><a:graphicData><a:tbl>
      <a:tr><a:tc><a:txBody><a:p><a:r><a:t>A</a:t></a:r></a:p></a:txBody></a:tc>
            <a:tc><a:txBody><a:p><a:r><a:t>B</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
      <a:tr><a:tc><a:txBody><a:p><a:r><a:t>1</a:t></a:r></a:p></a:txBody></a:tc>
            <a:tc><a:txBody><a:p><a:r><a:t>2</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
    </a:tbl></a:graphicData></a:graphic></p:graphicFrame>
  </p:spTree></p:cSld>
</p:sld>"#;

const SLIDE_2: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
       xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:cSld><p:spTree>
    <p:pic><p:blipFill><a:blip r:embed="rId2"/></p:blipFill></p:pic>
  </p:spTree></p:cSld>
</p:sld>"#;

const SLIDE_2_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
</Relationships>"#;

const SLIDE_3: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree/></p:cSld>
</p:sld>"#;

// No ppt/presentation.xml here: slide ordering falls back to
// relationship numbers
fn build_archive() -> Cursor<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    let parts: &[(&str, &[u8])] = &[
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS.as_bytes()),
        ("ppt/slides/slide1.xml", SLIDE_1.as_bytes()),
        ("ppt/slides/slide2.xml", SLIDE_2.as_bytes()),
        ("ppt/slides/_rels/slide2.xml.rels", SLIDE_2_RELS.as_bytes()),
        ("ppt/slides/slide3.xml", SLIDE_3.as_bytes()),
        ("ppt/media/image1.png", b"not really a png"),
    ];

    for (name, bytes) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }

    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);
    cursor
}

#[test]
fn extracts_all_slides_in_presentation_order() {
    let extractor = PptxExtractor::new(Box::new(FixedTextOcr("Scanned: 42% uptime")));
    let deck = extractor.extract_from_reader(build_archive()).unwrap();

    assert_eq!(deck.len(), 3);

    assert_eq!(
        deck.get(1).unwrap(),
        "TITLE: Q1 Results\nRevenue up 12% | Headcount flat\nTABLE: A | B\n1 | 2"
    );
    assert_eq!(deck.get(2).unwrap(), "IMAGE: Scanned: 42% uptime");
    // Content-free slide keeps its slot so numbering stays contiguous
    assert_eq!(deck.get(3).unwrap(), "");
}

#[test]
fn ocr_failure_never_aborts_extraction() {
    let extractor = PptxExtractor::new(Box::new(BrokenOcr));
    let deck = extractor.extract_from_reader(build_archive()).unwrap();

    assert_eq!(deck.len(), 3);
    assert_eq!(deck.get(2).unwrap(), "");
    assert!(deck.get(1).unwrap().starts_with("TITLE: Q1 Results"));
}

#[test]
fn slide_id_list_defines_presentation_order() {
    // Slides were reordered in the editor: the id list puts rId3 first
    // even though rId2 has the lower relationship number
    let presentation_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst>
    <p:sldId id="257" r:id="rId3"/>
    <p:sldId id="256" r:id="rId2"/>
  </p:sldIdLst>
</p:presentation>"#;

    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;

    let appendix = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:txBody><a:p><a:r><a:t>Appendix</a:t></a:r></a:p></p:txBody></p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let parts: &[(&str, &[u8])] = &[
        ("ppt/presentation.xml", presentation_xml.as_bytes()),
        ("ppt/_rels/presentation.xml.rels", rels.as_bytes()),
        ("ppt/slides/slide1.xml", SLIDE_1.as_bytes()),
        ("ppt/slides/slide2.xml", appendix.as_bytes()),
    ];
    for (name, bytes) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);

    let extractor = PptxExtractor::new(Box::new(BrokenOcr));
    let deck = extractor.extract_from_reader(cursor).unwrap();

    assert_eq!(deck.len(), 2);
    assert_eq!(deck.get(1).unwrap(), "TITLE: Appendix");
    assert!(deck.get(2).unwrap().starts_with("TITLE: Q1 Results"));
}

#[test]
fn non_zip_input_is_an_unsupported_format() {
    let extractor = PptxExtractor::new(Box::new(BrokenOcr));
    let result = extractor.extract_from_reader(Cursor::new(b"plain text".to_vec()));
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn archive_without_presentation_rels_fails_extraction() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("unrelated.txt", FileOptions::default()).unwrap();
    writer.write_all(b"hello").unwrap();
    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);

    let extractor = PptxExtractor::new(Box::new(BrokenOcr));
    assert!(extractor.extract_from_reader(cursor).is_err());
}
