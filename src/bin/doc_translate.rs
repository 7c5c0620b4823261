//! Translate a DOCX, PPTX or PDF file.
//!
//! Usage:
//!   doc-translate report.pdf --lang zh
//!   doc-translate deck.pptx --lang de --output-dir out --retries 2
//!
//! Needs `OPENAI_API_KEY`; `OPENAI_BASE_URL` and `OPENAI_MODEL` are optional.
//! Set `RUST_LOG=debug` to follow every run, paragraph and shape.

use clap::Parser;
use doc_oxide::translator::{OpenAiTranslator, RetryingTranslator, Translator};
use doc_oxide::{translate_file, Color, DocumentFormat, Result, TargetLanguage, TranslateConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "doc-translate", version, about = "Translate documents while keeping their layout")]
struct Args {
    /// Input file (.docx, .pptx or .pdf)
    input: PathBuf,

    /// Target language code or name (zh, en, de, ja, ko, 中文, ...)
    #[arg(short, long, default_value = "zh")]
    lang: String,

    /// Directory for translated_<name>
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON file with translation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cover color for PDF runs, as #RRGGBB
    #[arg(long)]
    cover_color: Option<String>,

    /// Retry failed translation calls this many times
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn run(args: Args) -> Result<PathBuf> {
    // Before the backend, so an unsupported file never needs an API key
    DocumentFormat::from_path(&args.input)?;
    let target: TargetLanguage = args.lang.parse()?;

    let mut config = match &args.config {
        Some(path) => TranslateConfig::from_json_file(path)?,
        None => TranslateConfig::default(),
    };
    if let Some(color) = &args.cover_color {
        config = config.with_cover_color(color.parse::<Color>()?);
    }

    let backend = OpenAiTranslator::from_env()?;
    let translator: Box<dyn Translator> = if args.retries > 0 {
        Box::new(RetryingTranslator::new(backend, args.retries))
    } else {
        Box::new(backend)
    };

    translate_file(&args.input, &args.output_dir, &target, translator.as_ref(), &config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            log::error!("{} ({})", e, e.kind());
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
