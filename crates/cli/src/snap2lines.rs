//! snap2lines - Correct vertical drift in eye-tracking recordings
//!
//! A command line tool that reads trials (fixations plus the y-positions of
//! the text lines) from JSON, snaps every fixation to a line with one of the
//! seven correction methods and writes the corrected trials as JSON Lines.
//!
//! Input format, one trial per file:
//!
//! ```json
//! {"lines": [500, 560, 620],
//!  "words": [{"x": 120, "y": 500, "line": 0}],
//!  "fixations": [{"x": 118, "y": 507, "duration": 210}]}
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use linesnap_core::tools::discard_out_of_bounds;
use linesnap_core::{
    DriftError, FixationSequence, LineGeometry, Method, MethodParams, WordCenter, correct,
};

/// Errors surfaced by the command line front end.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error("{}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{}: invalid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid line position {0:?}")]
    LineList(String),

    #[error("{}: no line positions; add \"lines\" to the trial or pass --lines", .0.display())]
    MissingLines(PathBuf),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

type Result<T> = std::result::Result<T, CliError>;

/// Snap eye-tracking fixations to the lines of text they were aimed at.
#[derive(Parser, Debug)]
#[command(name = "snap2lines")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more trial files, or "-" for stdin
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Correction method: chain, cluster, merge, regress, segment, split or warp
    #[arg(short = 'm', long, default_value = "warp")]
    method: Method,

    /// Comma-separated line y-positions, overriding those in each trial
    #[arg(short = 'l', long)]
    lines: Option<String>,

    /// JSON file with per-method parameters (missing fields use defaults)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Drop fixations farther than this many pixels from the text before
    /// correcting
    #[arg(long = "discard-threshold")]
    discard_threshold: Option<f64>,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Pretty-print each output record
    #[arg(short = 'p', long, action = ArgAction::SetTrue)]
    pretty: bool,
}

/// One trial as read from disk.
#[derive(Debug, Deserialize)]
struct Trial {
    #[serde(default)]
    lines: Vec<f64>,
    #[serde(default)]
    words: Vec<WordCenter>,
    fixations: FixationSequence,
}

#[derive(Debug, Serialize, PartialEq)]
struct FallbackRecord {
    reason: String,
    affected: usize,
}

/// One corrected trial as written out.
#[derive(Debug, Serialize)]
struct CorrectedTrial {
    source: String,
    method: Method,
    lines: Vec<f64>,
    discarded: usize,
    fixations: FixationSequence,
    line_indices: Vec<usize>,
    fallback: Option<FallbackRecord>,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("LINESNAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Parse a comma-separated list of line positions.
fn parse_lines(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>().map_err(|_| CliError::LineList(p.to_string())))
        .collect()
}

fn read_source(path: &Path) -> Result<String> {
    let mut text = String::new();
    let read = if path == Path::new("-") {
        io::stdin().read_to_string(&mut text).map(|_| ())
    } else {
        File::open(path).and_then(|mut f| f.read_to_string(&mut text).map(|_| ()))
    };
    read.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text)
}

fn load_params(path: Option<&Path>) -> Result<MethodParams> {
    let Some(path) = path else {
        return Ok(MethodParams::default());
    };
    let text = read_source(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds the geometry for one trial. Line overrides drop the trial's word
/// centres, which refer to the trial's own line numbering.
fn build_geometry(
    trial: &mut Trial,
    overrides: Option<&[f64]>,
    source: &Path,
) -> Result<LineGeometry> {
    let geometry = match overrides {
        Some(lines) => LineGeometry::new(lines.to_vec())?,
        None if trial.lines.is_empty() => {
            return Err(CliError::MissingLines(source.to_path_buf()));
        }
        None => LineGeometry::with_words(
            std::mem::take(&mut trial.lines),
            std::mem::take(&mut trial.words),
        )?,
    };
    Ok(geometry)
}

fn process_trial(
    mut trial: Trial,
    source: &Path,
    args: &Args,
    overrides: Option<&[f64]>,
    params: &MethodParams,
) -> Result<CorrectedTrial> {
    let geometry = build_geometry(&mut trial, overrides, source)?;

    let mut fixations = trial.fixations;
    let mut discarded = 0;
    if let Some(threshold) = args.discard_threshold {
        let kept = discard_out_of_bounds(&fixations, &geometry, threshold);
        discarded = fixations.len() - kept.len();
        fixations = kept;
    }

    let result = correct(&fixations, &geometry, &params.strategy(args.method))?;
    tracing::debug!(
        source = %source.display(),
        method = %result.method,
        fixations = result.fixations.len(),
        degraded = result.is_degraded(),
        "trial corrected"
    );

    Ok(CorrectedTrial {
        source: source.display().to_string(),
        method: result.method,
        lines: geometry.lines().to_vec(),
        discarded,
        fixations: result.fixations,
        line_indices: result.line_indices,
        fallback: result.fallback.map(|f| FallbackRecord {
            reason: f.reason.to_string(),
            affected: f.affected,
        }),
    })
}

fn process_file(
    path: &Path,
    args: &Args,
    overrides: Option<&[f64]>,
    params: &MethodParams,
) -> Result<CorrectedTrial> {
    let text = read_source(path)?;
    let trial: Trial = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    process_trial(trial, path, args, overrides, params)
}

fn write_record<W: Write>(writer: &mut W, record: &CorrectedTrial, pretty: bool) -> Result<()> {
    let encoded = if pretty {
        serde_json::to_string_pretty(record)
    } else {
        serde_json::to_string(record)
    };
    let encoded = encoded.map_err(io::Error::other)?;
    writeln!(writer, "{encoded}")?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let overrides = args.lines.as_deref().map(parse_lines).transpose()?;
    let params = load_params(args.config.as_deref())?;
    params.strategy(args.method).validate()?;

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&args.outfile)?))
    };

    for path in &args.files {
        let record = process_file(path, args, overrides.as_deref(), &params)?;
        write_record(&mut output, &record, args.pretty)?;
    }

    output.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("snap2lines: {e}");
            ExitCode::FAILURE
        }
    }
}
