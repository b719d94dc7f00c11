//! PPTX slide-deck content extraction.
//!
//! A .pptx file is a ZIP archive of XML parts. Extraction walks the slides
//! in presentation order and flattens each one into a text blob:
//!
//! - the title placeholder becomes a `TITLE: ...` line,
//! - every other text frame becomes one fragment with its paragraphs
//!   joined by `" | "`,
//! - tables become `TABLE: ...` with `" | "`-joined cells and
//!   newline-joined rows,
//! - pictures are resolved through the slide's relationships, OCR'd, and
//!   become `IMAGE: ...` lines when recognition yields text.
//!
//! A slide with nothing extractable still occupies its slot as an empty
//! string, so slide numbering stays contiguous and 1-based.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use deckcheck_core::{Error, Result, SlideContent};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::ocr::OcrEngine;

/// Delimiter between paragraphs of a text frame and between table cells.
const FRAGMENT_DELIMITER: &str = " | ";

/// ZIP local-file magic (every valid PPTX starts with it).
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Extractor for PPTX (Office Open XML) slide decks.
pub struct PptxExtractor {
    ocr: Box<dyn OcrEngine>,
}

impl PptxExtractor {
    /// Create an extractor that runs the given OCR engine on image shapes.
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Extract per-slide content from a .pptx file on disk.
    pub fn extract(&self, path: &Path) -> Result<SlideContent> {
        log::info!("Opening presentation: {}", path.display());
        let file = File::open(path)?;
        self.extract_from_reader(BufReader::new(file))
    }

    /// Extract per-slide content from any seekable reader over PPTX bytes.
    pub fn extract_from_reader<R: Read + Seek>(&self, mut reader: R) -> Result<SlideContent> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;
        if magic != ZIP_MAGIC {
            return Err(Error::UnsupportedFormat(
                "not a PPTX (ZIP) archive".to_string(),
            ));
        }

        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("failed to open archive: {}", e)))?;

        let slide_paths = self.slide_order(&mut archive)?;
        log::info!("Presentation contains {} slides", slide_paths.len());

        let mut deck = SlideContent::new();
        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let content = self.extract_slide(&mut archive, slide_path, idx + 1)?;
            deck.push_slide(content);
        }

        Ok(deck)
    }

    /// Ordered slide part paths for the deck.
    ///
    /// Presentation order is the `p:sldIdLst` sequence in
    /// `ppt/presentation.xml`, mapped through the presentation
    /// relationships. Relationship ids keep their creation-time numbers
    /// when slides are reordered, so sorting by trailing rId number is
    /// only a fallback for archives without a usable slide id list.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let mut slides = self.slide_relationships(archive)?;
        if slides.is_empty() {
            return Err(Error::Extraction(
                "presentation declares no slides".to_string(),
            ));
        }

        let sequence = self.slide_id_sequence(archive);
        if !sequence.is_empty() {
            let by_id: HashMap<&str, &str> = slides
                .iter()
                .map(|rel| (rel.id.as_str(), rel.path.as_str()))
                .collect();
            let ordered: Vec<String> = sequence
                .iter()
                .filter_map(|rid| match by_id.get(rid.as_str()) {
                    Some(path) => Some(path.to_string()),
                    None => {
                        log::warn!("Slide id list references unknown relationship {}", rid);
                        None
                    }
                })
                .collect();
            if !ordered.is_empty() {
                return Ok(ordered);
            }
        }

        log::debug!("No usable slide id list; ordering slides by relationship number");
        slides.sort_by(|a, b| match (a.order, b.order) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.path.cmp(&b.path),
        });
        Ok(slides.into_iter().map(|rel| rel.path).collect())
    }

    /// Slide relationships declared in `ppt/_rels/presentation.xml.rels`.
    fn slide_relationships<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<SlideRel>> {
        let rels_content =
            self.read_string_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;

        let mut slides: Vec<SlideRel> = Vec::new();
        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    // Slide relationships only; layouts and masters also match "/slide"
                    if rel_type.contains("/slide")
                        && !rel_type.contains("slideLayout")
                        && !rel_type.contains("slideMaster")
                    {
                        let order = trailing_number(&id).or_else(|| trailing_number(&target));
                        slides.push(SlideRel {
                            id,
                            path: normalize_part_path(&target, "ppt"),
                            order,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing presentation relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(slides)
    }

    /// `r:id` sequence of the `p:sldIdLst` element in `ppt/presentation.xml`.
    ///
    /// Empty when the part is missing or its XML is unreadable; the caller
    /// falls back to relationship-number ordering.
    fn slide_id_sequence<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Vec<String> {
        let xml = match self.read_string_from_archive(archive, "ppt/presentation.xml") {
            Ok(xml) => xml,
            Err(_) => return Vec::new(),
        };

        let mut ids = Vec::new();
        let mut in_list = false;
        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                    in_list = true;
                }
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                    in_list = false;
                }
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if in_list && local_name(e.name().as_ref()) == b"sldId" =>
                {
                    // sldId carries a numeric slide id and an r:id pointer;
                    // only the relationship id locates the slide part
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"r:id" {
                            ids.push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!(
                        "XML error in presentation part (ignoring slide id list): {}",
                        e
                    );
                    return Vec::new();
                }
                _ => {}
            }
        }

        ids
    }

    /// Flatten one slide part into its content blob.
    fn extract_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<String> {
        log::debug!("Processing slide {}", slide_number);
        let xml = self.read_string_from_archive(archive, slide_path)?;
        let shapes = scan_shapes(&xml);
        let media = self.slide_media(archive, slide_path)?;

        let mut resolve_image = |embed_id: &str| -> Option<String> {
            let target = match media.get(embed_id) {
                Some(t) => t,
                None => {
                    log::warn!(
                        "Slide {}: no relationship for image {}",
                        slide_number,
                        embed_id
                    );
                    return None;
                }
            };
            let bytes = match self.read_bytes_from_archive(archive, target) {
                Ok(b) => b,
                Err(e) => {
                    log::warn!("Slide {}: could not read image {}: {}", slide_number, target, e);
                    return None;
                }
            };
            match self.ocr.recognize(&bytes) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("OCR error on slide {}: {}", slide_number, e);
                    None
                }
            }
        };

        let content = compose_slide_content(&shapes, &mut resolve_image);
        log::debug!(
            "Slide {}: {} shapes, {} content bytes",
            slide_number,
            shapes.len(),
            content.len()
        );
        Ok(content)
    }

    /// Relationship id -> archive path of embedded media, for one slide.
    ///
    /// A slide without a .rels part simply has no embedded media.
    fn slide_media<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<HashMap<String, String>> {
        let rels_path = rels_path_for(slide_path);
        let rels_content = match self.read_string_from_archive(archive, &rels_path) {
            Ok(content) => content,
            Err(_) => return Ok(HashMap::new()),
        };

        let base_dir = slide_path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        let mut media = HashMap::new();
        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut target = String::new();
                    let mut id = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if !id.is_empty() && !target.is_empty() {
                        media.insert(id, normalize_part_path(&target, base_dir));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing relationships for '{}': {}",
                        slide_path, e
                    )));
                }
                _ => {}
            }
        }

        Ok(media)
    }

    fn read_string_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::Zip(format!("part not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::Zip(format!("failed to read '{}': {}", path, e)))?;

        Ok(content)
    }

    fn read_bytes_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Vec<u8>> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::Zip(format!("part not found in archive '{}': {}", path, e)))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::Zip(format!("failed to read '{}': {}", path, e)))?;

        Ok(bytes)
    }
}

/// One slide relationship from the presentation rels part.
#[derive(Debug)]
struct SlideRel {
    id: String,
    path: String,
    order: Option<usize>,
}

/// A shape scanned from slide XML, in document order.
#[derive(Debug)]
enum Shape {
    /// A text frame (`p:sp`) with its paragraphs and placeholder type.
    Text(TextShape),
    /// A table (`a:tbl`) as rows of trimmed cell texts.
    Table(Vec<Vec<String>>),
    /// A picture (`p:pic`) with the relationship id of its embedded image.
    Picture(Option<String>),
}

#[derive(Debug, Default)]
struct TextShape {
    paragraphs: Vec<String>,
    placeholder: Option<String>,
}

impl TextShape {
    fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title") | Some("ctrTitle"))
    }
}

/// Scan slide XML into shapes, preserving document order.
///
/// Malformed XML never aborts extraction: the scan keeps whatever shapes
/// it collected up to the error.
fn scan_shapes(xml: &str) -> Vec<Shape> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut current_text: Option<TextShape> = None;
    let mut current_picture: Option<Option<String>> = None;
    let mut in_text_body = false;
    let mut current_paragraph: Option<String> = None;

    let mut in_table = false;
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut row_cells: Vec<String> = Vec::new();
    let mut in_cell = false;
    let mut cell_text = String::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                log::warn!("XML error while scanning slide (stopping scan): {}", e);
                break;
            }
        };

        match event {
            Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => current_text = Some(TextShape::default()),
                b"pic" => current_picture = Some(None),
                b"ph" => {
                    if let Some(shape) = current_text.as_mut() {
                        shape.placeholder = attr_value(e, b"type");
                    }
                }
                b"txBody" if current_text.is_some() => in_text_body = true,
                b"p" => {
                    if in_cell {
                        if !cell_text.is_empty() {
                            cell_text.push('\n');
                        }
                    } else if in_text_body {
                        current_paragraph = Some(String::new());
                    }
                }
                b"tbl" => {
                    in_table = true;
                    table_rows.clear();
                }
                b"tr" if in_table => row_cells.clear(),
                b"tc" if in_table => {
                    in_cell = true;
                    cell_text.clear();
                }
                b"blip" => {
                    if let Some(embed) = current_picture.as_mut() {
                        *embed = attr_value(e, b"embed");
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match local_name(e.name().as_ref()) {
                b"ph" => {
                    if let Some(shape) = current_text.as_mut() {
                        shape.placeholder = attr_value(e, b"type");
                    }
                }
                b"blip" => {
                    if let Some(embed) = current_picture.as_mut() {
                        *embed = attr_value(e, b"embed");
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape().unwrap_or_default();
                if in_cell {
                    cell_text.push_str(&text);
                } else if let Some(paragraph) = current_paragraph.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(shape) = current_text.take() {
                        shapes.push(Shape::Text(shape));
                    }
                    in_text_body = false;
                    current_paragraph = None;
                }
                b"pic" => {
                    if let Some(embed) = current_picture.take() {
                        shapes.push(Shape::Picture(embed));
                    }
                }
                b"txBody" => in_text_body = false,
                b"p" => {
                    if let Some(paragraph) = current_paragraph.take() {
                        if !paragraph.is_empty() {
                            if let Some(shape) = current_text.as_mut() {
                                shape.paragraphs.push(paragraph);
                            }
                        }
                    }
                }
                b"tc" => {
                    if in_cell {
                        row_cells.push(cell_text.trim().to_string());
                        in_cell = false;
                    }
                }
                b"tr" if in_table => table_rows.push(std::mem::take(&mut row_cells)),
                b"tbl" => {
                    if in_table {
                        shapes.push(Shape::Table(std::mem::take(&mut table_rows)));
                        in_table = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    shapes
}

/// Assemble a slide's content blob from its scanned shapes.
///
/// `resolve_image` maps an embed relationship id to OCR'd text; returning
/// `None` (missing media, OCR failure) skips that image only.
fn compose_slide_content(
    shapes: &[Shape],
    resolve_image: &mut dyn FnMut(&str) -> Option<String>,
) -> String {
    let title_index = shapes.iter().position(|s| match s {
        Shape::Text(t) => t.is_title(),
        _ => false,
    });

    let mut fragments: Vec<String> = Vec::new();

    // Title first, regardless of where the placeholder sits on the slide
    if let Some(idx) = title_index {
        if let Shape::Text(title) = &shapes[idx] {
            let text = title.paragraphs.join("\n");
            let text = text.trim();
            if !text.is_empty() {
                fragments.push(format!("TITLE: {}", text));
            }
        }
    }

    for (idx, shape) in shapes.iter().enumerate() {
        if Some(idx) == title_index {
            continue;
        }
        match shape {
            Shape::Text(text) => {
                let joined = text.paragraphs.join(FRAGMENT_DELIMITER);
                if !joined.is_empty() {
                    fragments.push(joined);
                }
            }
            Shape::Table(rows) => {
                let body: Vec<String> = rows
                    .iter()
                    .map(|cells| cells.join(FRAGMENT_DELIMITER))
                    .collect();
                fragments.push(format!("TABLE: {}", body.join("\n")));
            }
            Shape::Picture(embed) => {
                if let Some(id) = embed {
                    if let Some(text) = resolve_image(id) {
                        let text = text.trim();
                        if !text.is_empty() {
                            fragments.push(format!("IMAGE: {}", text));
                        }
                    }
                }
            }
        }
    }

    fragments.join("\n")
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Value of the attribute whose local name matches, if present.
fn attr_value(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == local_name(name))
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Trailing number of a string like "rId2" or "slide3.xml".
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

/// Path of the .rels part describing the given slide part.
fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target against the part's directory.
///
/// Targets are either package-absolute (`/ppt/media/x.png`) or relative to
/// the directory of the part that declares them (`../media/x.png`,
/// `slides/slide1.xml`).
fn normalize_part_path(target: &str, base_dir: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
