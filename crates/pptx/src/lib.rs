//! PPTX (OOXML) content extractor for slide-deck analysis.
//!
//! Walks a .pptx archive slide by slide, producing the per-slide text blobs
//! the analysis stage consumes: title lines, text-frame fragments,
//! serialized tables, and OCR'd image text.

pub mod ocr;
pub mod parser;

pub use ocr::{DisabledOcr, OcrEngine, OcrError, TesseractOcr};
pub use parser::PptxExtractor;
