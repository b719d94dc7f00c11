//! CLI driver for slide-deck inconsistency analysis.
//!
//! The run is a strict line: extract the deck, assemble and send the
//! prompt, parse the reply, write the report. Only extraction failures
//! abort with a non-zero exit; everything downstream degrades to a report
//! with an empty findings list.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deckcheck_analysis::{Analyzer, GeminiClient, ModelConfig};
use deckcheck_core::AnalysisReport;
use deckcheck_pptx::{DisabledOcr, OcrEngine, PptxExtractor, TesseractOcr};

/// Environment variable supplying the model-service credential.
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Analyze a PPTX slide deck for factual and logical inconsistencies.
#[derive(Parser, Debug)]
#[command(name = "deckcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PPTX file
    input: PathBuf,

    /// Output JSON file (default: print to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip OCR of embedded images
    #[arg(long)]
    no_ocr: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let api_key = std::env::var(API_KEY_VAR)
        .with_context(|| format!("{} environment variable not set", API_KEY_VAR))?;
    let client = GeminiClient::new(ModelConfig::new(api_key));

    log::info!("Starting analysis of: {}", args.input.display());

    let ocr: Box<dyn OcrEngine> = if args.no_ocr {
        Box::new(DisabledOcr::new())
    } else {
        Box::new(TesseractOcr::new())
    };
    let extractor = PptxExtractor::new(ocr);

    log::info!("Extracting content from slides...");
    let deck = extractor
        .extract(&args.input)
        .with_context(|| format!("failed to extract {}", args.input.display()))?;
    log::info!("Extracted content from {} slides", deck.len());

    log::info!("Analyzing for inconsistencies...");
    let findings = Analyzer::new(&client).analyze(&deck);
    log::info!("Found {} potential inconsistencies", findings.len());

    let report = AnalysisReport::new(deck.len(), findings);
    let json = report
        .to_json_pretty()
        .context("failed to serialize report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Results saved to {}", path.display());
        }
        None => println!("{}", json),
    }

    log::info!("Analysis complete");
    Ok(())
}
