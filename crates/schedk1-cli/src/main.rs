//! schedk1: Schedule K-1 field extraction with a hosted vision model.

mod batch;
mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use schedk1_ai::client::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_PDF_MB, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
use schedk1_ai::{ExtractionClient, ExtractorConfig};
use schedk1_eval::{DEFAULT_EVAL_SET, EvalTable, ScoringMode};
use schedk1_pdf::{PdfEncoder, PdfiumRasterizer};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "schedk1")]
#[command(about = "Extract Schedule K-1 (Form 1065) fields from PDFs and score them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every PDF in a directory and compare with the ground truth
    Run {
        /// Directory containing K-1 PDFs
        #[arg(long, default_value = "pdfs")]
        pdfs_dir: PathBuf,

        /// Ground-truth CSV (documents as columns)
        #[arg(long, default_value = DEFAULT_EVAL_SET)]
        eval_set: PathBuf,

        /// Also write one evaluation report per document into this directory
        #[arg(long)]
        reports_dir: Option<PathBuf>,

        /// Score every integer field, not only non-zero ones
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },

    /// Extract a single PDF and print its fields
    Extract {
        /// Path to the K-1 PDF
        pdf: PathBuf,

        /// Print the records as JSON instead of a card
        #[arg(long)]
        json: bool,

        /// List fields left at their defaults as well
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },

    /// List the field schema with value kinds
    Fields,
}

#[derive(Args)]
struct ExtractorArgs {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, env = "SCHEDK1_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model identifier
    #[arg(long, env = "SCHEDK1_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Attempts per document before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Completion token limit
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    /// Encoded document budget for the first attempt, in MB
    #[arg(long, default_value_t = DEFAULT_MAX_PDF_MB)]
    max_pdf_mb: u64,

    /// Directory holding the pdfium shared library (system lookup if unset)
    #[arg(long, env = "PDFIUM_LIB_DIR")]
    pdfium_dir: Option<PathBuf>,
}

impl ExtractorArgs {
    /// Fails when no API key was given, before any document is read.
    fn config(&self) -> Result<ExtractorConfig> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            bail!("OPENROUTER_API_KEY is not set; export it or pass --api-key");
        };
        Ok(ExtractorConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            max_attempts: self.max_attempts,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            max_pdf_mb: self.max_pdf_mb,
            ..ExtractorConfig::new(api_key)
        })
    }

    fn client(&self) -> Result<ExtractionClient> {
        let config = self.config()?;
        let rasterizer = match &self.pdfium_dir {
            Some(dir) => PdfiumRasterizer::with_library_dir(dir),
            None => PdfiumRasterizer::new(),
        };
        info!(model = %config.model, endpoint = %config.endpoint, "extraction client ready");
        Ok(ExtractionClient::openrouter(config, PdfEncoder::new(rasterizer)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            pdfs_dir,
            eval_set,
            reports_dir,
            strict,
            extractor,
        } => {
            let mode = if strict {
                ScoringMode::Strict
            } else {
                ScoringMode::NonZero
            };
            run(&pdfs_dir, &eval_set, reports_dir.as_deref(), mode, &extractor).await
        }
        Command::Extract {
            pdf,
            json,
            all,
            extractor,
        } => extract(&pdf, json, all, &extractor).await,
        Command::Fields => {
            print!("{}", display::schema_listing());
            Ok(())
        }
    }
}

async fn run(
    pdfs_dir: &Path,
    eval_set: &Path,
    reports_dir: Option<&Path>,
    mode: ScoringMode,
    extractor: &ExtractorArgs,
) -> Result<()> {
    let client = extractor.client()?;
    let pdfs = batch::find_pdfs(pdfs_dir)?;
    info!(dir = %pdfs_dir.display(), count = pdfs.len(), "found PDFs");

    let results = batch::extract_all(&client, &pdfs).await;
    if results.is_empty() {
        warn!("no documents extracted; skipping comparison");
    } else {
        match EvalTable::from_path(eval_set) {
            Ok(table) => {
                let report = schedk1_eval::compare(&results, &table, mode);
                print!("{}", schedk1_eval::render_console(&report));
                if let Some(dir) = reports_dir {
                    schedk1_eval::write_document_reports(&report, dir, chrono::Utc::now())
                        .with_context(|| format!("writing reports to {}", dir.display()))?;
                }
            }
            Err(e) => warn!(error = %e, "ground truth unavailable; skipping comparison"),
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("EXTRACTION COMPLETE");
    println!("{}", "=".repeat(80));
    Ok(())
}

async fn extract(pdf: &Path, json: bool, all: bool, extractor: &ExtractorArgs) -> Result<()> {
    let client = extractor.client()?;
    let k1 = client
        .extract_k1(pdf)
        .await
        .with_context(|| format!("extracting {}", pdf.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&k1)?);
    } else {
        print!(
            "{}",
            display::extraction_card(&batch::document_name(pdf), &k1, all)
        );
    }
    Ok(())
}
