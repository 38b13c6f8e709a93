//! CLI binary for edgequake-pdf-ingest.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionPipeline` and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf_ingest::{
    CleanupPolicy, ConversionOptions, ConversionPipeline, ExtractionStrategy, IngestError,
    IngestProgressCallback, JsonFileStore, OcrConfig, Outcome, ProgressCallback,
    SUPPORTED_OCR_LANGUAGES,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner showing the current stage and how many pages have been read.
struct CliProgressCallback {
    bar: ProgressBar,
    pages: AtomicUsize,
    chars: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            pages: AtomicUsize::new(0),
            chars: AtomicUsize::new(0),
        })
    }
}

impl IngestProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, display_name: &str, strategy: ExtractionStrategy) {
        self.bar.set_prefix(display_name.to_string());
        self.bar.set_message(match strategy {
            ExtractionStrategy::ForceOcr => "running OCR…",
            ExtractionStrategy::DirectThenFallback => "reading text layer…",
        });
    }

    fn on_ocr_fallback(&self, _display_name: &str) {
        self.bar
            .println(format!("  {} no text layer, falling back to OCR", dim("·")));
        self.bar.set_message("running OCR…");
    }

    fn on_page_parsed(&self, page_number: Option<usize>, chars: usize) {
        let pages = self.pages.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.chars.fetch_add(chars, Ordering::SeqCst) + chars;
        let label = page_number.map_or_else(|| "?".to_string(), |n| n.to_string());
        self.bar
            .set_message(format!("page {label}  ({pages} pages, {total} chars)"));
    }

    fn on_conversion_complete(&self, _display_name: &str, _success: bool) {
        self.bar.finish_and_clear();
    }

    fn on_conversion_failed(&self, _display_name: &str, _error: &IngestError) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ingest a PDF (a working copy is made; the original is kept)
  pdf-ingest report.pdf

  # Scanned Japanese/English document, skip the text layer entirely
  pdf-ingest --force-ocr --ocr-lang jpn,eng scan.pdf

  # Upload-directory mode: consume the file in place, JSON outcome on stdout
  pdf-ingest --consume --json --name "Q3 report.pdf" /srv/hotdir/upload-8f2a.pdf

  # List OCR language codes
  pdf-ingest --list-languages

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (OCR)
  ANTHROPIC_API_KEY       Anthropic API key (OCR)
  GEMINI_API_KEY          Google Gemini API key (OCR)
  EDGEQUAKE_LLM_PROVIDER  Override OCR provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override OCR model ID
  PDFIUM_LIB_PATH         Directory containing libpdfium
"#;

/// Ingest a PDF into a normalised text artifact, with OCR fallback.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-ingest",
    version,
    about = "Ingest a PDF into a normalised text artifact, with OCR fallback",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Display name recorded as the artifact title. Default: the file name.
    #[arg(short, long)]
    name: Option<String>,

    /// Skip the text layer and OCR every page.
    #[arg(long, env = "PDF_INGEST_FORCE_OCR")]
    force_ocr: bool,

    /// OCR language codes, comma separated (e.g. jpn,eng).
    #[arg(long = "ocr-lang", env = "PDF_INGEST_OCR_LANGS", value_delimiter = ',')]
    ocr_languages: Vec<String>,

    /// Root directory of the artifact store.
    #[arg(long, env = "PDF_INGEST_STORAGE_DIR", default_value = "./storage/documents")]
    storage_dir: PathBuf,

    /// Folder under the store root that artifacts are written to.
    #[arg(long, env = "PDF_INGEST_FOLDER", default_value = "custom-documents")]
    folder: String,

    /// Process the input in place; it is deleted afterwards.
    #[arg(long)]
    consume: bool,

    /// Leave the input in place when extraction or storage fails.
    #[arg(long)]
    keep_on_error: bool,

    /// OCR model ID (e.g. gpt-4.1-nano, gpt-4.1).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// OCR provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// OCR rendering DPI (72–400).
    #[arg(long, env = "PDF_INGEST_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of concurrent OCR calls.
    #[arg(short, long, env = "PDF_INGEST_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_INGEST_PASSWORD")]
    password: Option<String>,

    /// Retries per page on OCR failure (0–10).
    #[arg(long, env = "PDF_INGEST_MAX_RETRIES", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(0..=10))]
    max_retries: u32,

    /// Per-page OCR call timeout in seconds.
    #[arg(long, env = "PDF_INGEST_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF_INGEST_NO_PROGRESS")]
    no_progress: bool,

    /// Print the supported OCR language codes and exit.
    #[arg(long)]
    list_languages: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_INGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_INGEST_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_languages {
        for (code, name) in SUPPORTED_OCR_LANGUAGES {
            println!("{code:<8} {name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli
        .input
        .clone()
        .context("An input PDF path is required")?;
    let display_name = match cli.name.clone() {
        Some(n) => n,
        None => file_name(&input)?,
    };

    // ── Working copy ─────────────────────────────────────────────────────
    // The pipeline deletes its input. Unless --consume is given, hand it a
    // copy inside a temp dir that is itself removed when this guard drops.
    let (work_path, _work_dir) = if cli.consume {
        (input.clone(), None)
    } else {
        let dir = tempfile::Builder::new()
            .prefix("pdf-ingest-")
            .tempdir()
            .context("Failed to create working directory")?;
        let copy = dir.path().join(file_name(&input)?);
        tokio::fs::copy(&input, &copy)
            .await
            .with_context(|| format!("Failed to copy {}", input.display()))?;
        (copy, Some(dir))
    };

    // ── Build pipeline ───────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let pipeline = build_pipeline(&cli, progress)?;
    let options = ConversionOptions::default()
        .with_force_ocr(cli.force_ocr)
        .with_ocr_languages(cli.ocr_languages.iter().cloned());

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = pipeline
        .convert(&work_path, &display_name, &options)
        .await
        .context("Conversion failed")?;

    report(&cli, &outcome)?;

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Map CLI args to a `ConversionPipeline`.
fn build_pipeline(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionPipeline> {
    let mut ocr = OcrConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);
    if let Some(ref model) = cli.model {
        ocr = ocr.model(model);
    }
    if let Some(ref provider) = cli.provider {
        ocr = ocr.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        ocr = ocr.password(password);
    }
    let ocr = ocr.build().context("Invalid OCR configuration")?;

    let mut text = edgequake_pdf_ingest::PdfiumTextExtractor::new();
    if let Some(ref password) = cli.password {
        text = text.with_password(password);
    }

    let store = JsonFileStore::new(&cli.storage_dir).with_folder(cli.folder.clone());
    let cleanup = if cli.keep_on_error {
        CleanupPolicy::OnOutcome
    } else {
        CleanupPolicy::Always
    };

    let mut builder = ConversionPipeline::builder()
        .text_extractor(Arc::new(text))
        .ocr_config(ocr)
        .store(Arc::new(store))
        .cleanup(cleanup);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Failed to build pipeline")
}

/// Print the outcome: JSON on stdout, or a one-line summary on stderr.
fn report(cli: &Cli, outcome: &Outcome) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(outcome).context("Failed to serialise outcome")?;
        println!("{json}");
        return Ok(());
    }

    match outcome.documents.first() {
        Some(doc) => {
            if !cli.quiet {
                eprintln!(
                    "{} {}  →  {}",
                    green("✔"),
                    bold(&doc.artifact.title),
                    cli.storage_dir.join(&doc.location).display()
                );
                eprintln!(
                    "   {} words  /  {} tokens",
                    dim(&doc.artifact.word_count.to_string()),
                    dim(&doc.artifact.token_estimate.to_string()),
                );
            }
        }
        None => {
            let reason = outcome.reason.as_deref().unwrap_or("Unknown failure");
            eprintln!("{} {}", red("✘"), reason);
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))
}
