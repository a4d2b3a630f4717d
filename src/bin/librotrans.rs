//! CLI binary for librotrans.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslationConfig`, submits a job, and renders its progress.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use librotrans::{BookTranslator, OutputFormat, TranslationConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "librotrans",
    version,
    about = "Translate book PDFs chapter by chapter through an LLM API"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a PDF and write a DOCX or PDF output document.
    Translate {
        /// Input PDF file.
        input: PathBuf,

        /// Target language, e.g. "Portuguese".
        #[arg(long, short = 't')]
        to: String,

        /// Output document format.
        #[arg(long, default_value = "docx")]
        format: OutputFormat,

        /// Directory for the assembled document.
        #[arg(long, short = 'o', default_value = "output")]
        output_dir: PathBuf,

        /// Chat model identifier.
        #[arg(long, default_value = "gpt-4o-mini")]
        model: String,

        /// API key (falls back to OPENAI_API_KEY).
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Maximum characters per translation request.
        #[arg(long, default_value_t = 1500)]
        chunk_size: usize,

        /// Total attempts per segment before giving up.
        #[arg(long, default_value_t = 5)]
        max_retries: u32,
    },

    /// Print the chapters a PDF would be split into, without translating.
    Inspect {
        /// Input PDF file.
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Translate {
            input,
            to,
            format,
            output_dir,
            model,
            api_key,
            chunk_size,
            max_retries,
        } => {
            translate(
                input, to, format, output_dir, model, api_key, chunk_size, max_retries,
            )
            .await
        }
        Command::Inspect { input } => inspect(input),
    }
}

#[allow(clippy::too_many_arguments)]
async fn translate(
    input: PathBuf,
    to: String,
    format: OutputFormat,
    output_dir: PathBuf,
    model: String,
    api_key: Option<String>,
    chunk_size: usize,
    max_retries: u32,
) -> Result<()> {
    let bytes = std::fs::read(&input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;

    let mut builder = TranslationConfig::builder()
        .model(model)
        .output_dir(output_dir)
        .chunk_size(chunk_size)
        .single_request_threshold(chunk_size)
        .max_retries(max_retries);
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build()?;

    let translator = BookTranslator::new(config)?;
    let job_id = translator.submit_pdf(bytes, to.as_str(), format).await?;

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );

    loop {
        let state = translator.status(job_id)?;
        bar.set_position((state.progress * 100.0) as u64);
        bar.set_message(state.message.clone());
        if state.status.is_terminal() {
            bar.finish_and_clear();
            if state.status == librotrans::JobStatus::Error {
                bail!("{}", state.message);
            }
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    let path = translator.result(job_id)?;
    println!("{}", path.display());
    Ok(())
}

fn inspect(input: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    let chapters = librotrans::pipeline::extract::extract_chapters(&bytes)?;

    println!("{} chapters", chapters.len());
    for chapter in &chapters {
        println!(
            "  chapter {:>4}: {:>7} chars",
            chapter.id,
            chapter.content.chars().count()
        );
    }
    Ok(())
}
