use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use climasense::{Pipeline, PipelineConfig};

/// Classify climate-related text for sentiment, misinformation and emotion.
#[derive(Parser, Debug)]
#[command(name = "climasense")]
#[command(version)]
struct Args {
    /// Configuration file (TOML, YAML or JSON). Defaults to `climasense.*`
    /// in the working directory when present.
    #[arg(short, long, env = "CLIMASENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json: bool,

    /// Texts to classify. Read one per line from stdin when omitted.
    texts: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::load().context("loading configuration")?,
    };
    init_tracing(&cfg.log_level, args.json || cfg.log_json);

    let pipeline = Pipeline::from_config(&cfg).context("failed to load models")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.texts.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("reading stdin")?;
            emit(&pipeline, &line, &mut out)?;
        }
    } else {
        for text in &args.texts {
            emit(&pipeline, text, &mut out)?;
        }
    }
    Ok(())
}

/// Prints one response line. Validation and per-request failures are logged
/// and skipped; a configuration failure aborts the run.
fn emit(pipeline: &Pipeline, text: &str, out: &mut impl Write) -> Result<()> {
    match pipeline.infer(text) {
        Ok(result) => {
            serde_json::to_writer(&mut *out, &result.to_response())?;
            writeln!(out)?;
        }
        Err(err) if err.is_configuration() => return Err(err.into()),
        Err(err) => tracing::error!(input = text, error = %err, "input skipped"),
    }
    Ok(())
}

fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
