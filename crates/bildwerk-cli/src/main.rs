// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — batch image-to-PDF converter.
//
// Entry point. Initialises logging, turns flags and an optional JSON file into
// a `ConversionRequest`, runs the batch, and prints one status line per image.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bildwerk_core::human_errors::humanize_error;
use bildwerk_core::{BildwerkError, ConversionOutcome, ConversionRequest, PageSizeSpec};
use bildwerk_document::BatchConverter;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Exit status when the run could not start or was aborted.
const EXIT_FATAL: u8 = 2;
/// Exit status for `--strict` runs with at least one failed image.
const EXIT_FILES_FAILED: u8 = 1;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every image in scans/ onto A4 pages
  bildwerk scans/ pdfs/

  # Letter paper, 600 dpi intermediate raster
  bildwerk --page-size letter --dpi 600 scans/ pdfs/

  # Custom 100x150 mm postcards, fail the shell step if any image is bad
  bildwerk -p 100x150 --strict photos/ postcards/

  # Settings from a file: {"input_dir": "...", "output_dir": "...", "page_size": [100, 150]}
  bildwerk --config bildwerk.json
"#;

/// Convert a folder of images into one single-page PDF per image.
#[derive(Debug, Parser)]
#[command(name = "bildwerk", version, about, after_help = AFTER_HELP)]
struct Cli {
    /// Folder containing the images (jpg, jpeg, png, bmp, tiff, gif).
    input_dir: Option<PathBuf>,

    /// Folder receiving the PDFs; created when missing.
    output_dir: Option<PathBuf>,

    /// A3, A4, A5, letter, legal, or WIDTHxHEIGHT in millimetres [default: A4].
    #[arg(short, long, env = "BILDWERK_PAGE_SIZE")]
    page_size: Option<String>,

    /// Density recorded in the intermediate raster [default: 300].
    #[arg(short, long, env = "BILDWERK_DPI")]
    dpi: Option<u32>,

    /// JSON file with a conversion request; flags given here override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Re-open every produced PDF and check its page count and size.
    #[arg(long)]
    verify: bool,

    /// Exit with status 1 when any image fails.
    #[arg(long)]
    strict: bool,

    /// Debug logging (otherwise RUST_LOG, or info).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(failed) if failed > 0 && cli.strict => ExitCode::from(EXIT_FILES_FAILED),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(cause) = err.downcast_ref::<BildwerkError>() {
                let human = humanize_error(cause);
                eprintln!("{}", human.message);
                eprintln!("hint: {}", human.suggestion);
            }
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Run the batch and return how many images failed (conversion or verify).
fn run(cli: &Cli) -> Result<usize> {
    let request = build_request(cli)?;
    let converter = BatchConverter::new(request).context("invalid conversion settings")?;

    let mut verify_failures = 0usize;
    let report = converter
        .run_with(|outcome| {
            println!("{outcome}");
            if let ConversionOutcome::Success { output, .. } = outcome {
                if cli.verify {
                    if let Err(err) = converter.verify(output) {
                        verify_failures += 1;
                        println!("verify failed: {err}");
                    }
                }
            }
        })
        .context("batch conversion aborted")?;

    println!(
        "{} of {} images converted, {} failed",
        report.succeeded(),
        report.total(),
        report.failed()
    );
    if cli.verify {
        println!("{} produced PDFs failed verification", verify_failures);
    }

    Ok(report.failed() + verify_failures)
}

/// Merge the optional config file with command-line flags.
fn build_request(cli: &Cli) -> Result<ConversionRequest> {
    let mut request = match &cli.config {
        Some(path) => ConversionRequest::from_json_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => {
            let (Some(input), Some(output)) = (&cli.input_dir, &cli.output_dir) else {
                return Err(BildwerkError::InvalidConfiguration(
                    "INPUT_DIR and OUTPUT_DIR are required unless --config is given".into(),
                )
                .into());
            };
            ConversionRequest::new(input, output)
        }
    };

    if let Some(input) = &cli.input_dir {
        request.input_dir = input.clone();
    }
    if let Some(output) = &cli.output_dir {
        request.output_dir = output.clone();
    }
    if let Some(page_size) = &cli.page_size {
        request.page_size = PageSizeSpec::parse(page_size)?;
    }
    if let Some(dpi) = cli.dpi {
        request.dpi = dpi;
    }
    Ok(request)
}
