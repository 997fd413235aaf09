//! BeMore CLI - Command-line interface for the affect fusion engine
//!
//! Commands:
//! - transform: Replay capture records into tick outputs (batch mode)
//! - run: Process streaming capture records from stdin (streaming mode)
//! - tips: Print the coaching tip catalog
//! - doctor: Diagnose engine configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bemore_core::engine::{AffectEngine, EngineConfig, FUSION_INTERVAL_MS};
use bemore_core::face::BlendshapeScores;
use bemore_core::session::TipEvent;
use bemore_core::sources::{
    select_audio_source, select_face_source, CapturedAudioSource, CapturedFaceSource,
};
use bemore_core::tips::tips_for_bucket;
use bemore_core::{Bucket, FusionWeights, Speaker, Vad, ENGINE_VERSION, PRODUCER_NAME};

/// BeMore - On-device multimodal affect fusion engine
#[derive(Parser)]
#[command(name = "bemore")]
#[command(author = "BeMore Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Fuse behavioral signals into VAD affect estimates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay capture records into tick outputs (batch mode)
    Transform {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Audio sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Fusion weights JSON file (defaults apply when omitted)
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Force the synthetic audio fallback
        #[arg(long)]
        synthetic_audio: bool,

        /// Force the synthetic face fallback
        #[arg(long)]
        synthetic_face: bool,

        /// Synthesize fusion ticks at a fixed interval instead of
        /// requiring explicit tick records
        #[arg(long)]
        auto_tick: bool,

        /// Interval for --auto-tick (ms)
        #[arg(long, default_value_t = FUSION_INTERVAL_MS)]
        tick_interval_ms: i64,

        /// Write the closed session record to this path
        #[arg(long)]
        session: Option<PathBuf>,
    },

    /// Process streaming capture records from stdin (streaming mode)
    Run {
        /// Audio sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Fusion weights JSON file
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Force the synthetic audio fallback
        #[arg(long)]
        synthetic_audio: bool,

        /// Force the synthetic face fallback
        #[arg(long)]
        synthetic_face: bool,

        /// Write the session record here on end of input
        #[arg(long)]
        session: Option<PathBuf>,

        /// Do not flush output after each tick
        #[arg(long)]
        no_flush: bool,
    },

    /// Print the coaching tip catalog
    Tips {
        /// Restrict to one bucket (lowV_highA, lowV_lowA, highV_highD, neutral)
        #[arg(long)]
        bucket: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine configuration and environment
    Doctor {
        /// Check a fusion weights file
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one tick per line)
    Ndjson,
    /// JSON array of ticks
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// One capture record from the replay/stream input.
#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum CaptureRecord {
    /// Raw audio block, floats in [-1,1]
    Audio { t: i64, samples: Vec<f32> },
    /// Named blendshape scores for one video frame
    Face { t: i64, scores: BlendshapeScores },
    /// One transcript turn
    Text {
        t: i64,
        speaker: Speaker,
        text: String,
    },
    /// Explicit fusion tick
    Tick { t: i64 },
}

impl CaptureRecord {
    fn timestamp(&self) -> i64 {
        match self {
            CaptureRecord::Audio { t, .. }
            | CaptureRecord::Face { t, .. }
            | CaptureRecord::Text { t, .. }
            | CaptureRecord::Tick { t } => *t,
        }
    }
}

/// One tick output line.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TickRecord {
    t: i64,
    #[serde(flatten)]
    vad: Vad,
    bucket: Bucket,
    #[serde(skip_serializing_if = "Option::is_none")]
    tip: Option<TipEvent>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), BemoreCliError> {
    match cli.command {
        Commands::Transform {
            input,
            output,
            output_format,
            sample_rate,
            weights,
            synthetic_audio,
            synthetic_face,
            auto_tick,
            tick_interval_ms,
            session,
        } => cmd_transform(
            &input,
            &output,
            output_format,
            sample_rate,
            weights.as_deref(),
            synthetic_audio,
            synthetic_face,
            auto_tick,
            tick_interval_ms,
            session.as_deref(),
        ),

        Commands::Run {
            sample_rate,
            weights,
            synthetic_audio,
            synthetic_face,
            session,
            no_flush,
        } => cmd_run(
            sample_rate,
            weights.as_deref(),
            synthetic_audio,
            synthetic_face,
            session.as_deref(),
            !no_flush,
        ),

        Commands::Tips { bucket, json } => cmd_tips(bucket.as_deref(), json),

        Commands::Doctor { weights, json } => cmd_doctor(weights.as_deref(), json),
    }
}

fn build_engine(
    sample_rate: u32,
    weights_path: Option<&Path>,
    synthetic_audio: bool,
    synthetic_face: bool,
) -> Result<AffectEngine, BemoreCliError> {
    let weights = match weights_path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            serde_json::from_str::<FusionWeights>(&json)?
        }
        None => FusionWeights::default(),
    };

    let audio = select_audio_source(if synthetic_audio {
        None
    } else {
        Some(CapturedAudioSource::new(sample_rate))
    });
    let face = select_face_source(if synthetic_face {
        None
    } else {
        Some(CapturedFaceSource::new())
    });

    let config = EngineConfig {
        weights,
        ..Default::default()
    };
    AffectEngine::new(config, audio, face).map_err(BemoreCliError::Engine)
}

fn feed_record(engine: &mut AffectEngine, record: CaptureRecord) -> Option<TickRecord> {
    match record {
        CaptureRecord::Audio { samples, .. } => {
            engine.push_audio_block(samples);
            None
        }
        CaptureRecord::Face { scores, .. } => {
            engine.push_face_scores(scores);
            None
        }
        CaptureRecord::Text { t, speaker, text } => {
            engine.push_text_turn(speaker, &text, t);
            None
        }
        CaptureRecord::Tick { t } => {
            let out = engine.tick(t);
            Some(TickRecord {
                t: out.t,
                vad: out.vad,
                bucket: out.bucket,
                tip: out.tip,
            })
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_transform(
    input: &PathBuf,
    output: &PathBuf,
    output_format: OutputFormat,
    sample_rate: u32,
    weights: Option<&Path>,
    synthetic_audio: bool,
    synthetic_face: bool,
    auto_tick: bool,
    tick_interval_ms: i64,
    session: Option<&Path>,
) -> Result<(), BemoreCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = parse_ndjson(&input_data)?;
    if records.is_empty() {
        return Err(BemoreCliError::NoRecords);
    }
    if tick_interval_ms <= 0 {
        return Err(BemoreCliError::BadTickInterval(tick_interval_ms));
    }

    let mut engine = build_engine(sample_rate, weights, synthetic_audio, synthetic_face)?;
    let mut ticks: Vec<TickRecord> = Vec::new();

    if auto_tick {
        let mut next_tick = records[0].timestamp();
        let last_t = records[records.len() - 1].timestamp();
        for record in records {
            while next_tick < record.timestamp() {
                let out = engine.tick(next_tick);
                ticks.push(TickRecord {
                    t: out.t,
                    vad: out.vad,
                    bucket: out.bucket,
                    tip: out.tip,
                });
                next_tick += tick_interval_ms;
            }
            if let Some(tick) = feed_record(&mut engine, record) {
                ticks.push(tick);
            }
        }
        let out = engine.tick(last_t.max(next_tick));
        ticks.push(TickRecord {
            t: out.t,
            vad: out.vad,
            bucket: out.bucket,
            tip: out.tip,
        });
    } else {
        for record in records {
            if let Some(tick) = feed_record(&mut engine, record) {
                ticks.push(tick);
            }
        }
    }

    if ticks.is_empty() {
        return Err(BemoreCliError::NoTicks);
    }

    let output_data = format_output(&ticks, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    if let Some(session_path) = session {
        let record = engine.finish();
        fs::write(session_path, record.to_json().map_err(BemoreCliError::Engine)?)?;
    }

    Ok(())
}

fn cmd_run(
    sample_rate: u32,
    weights: Option<&Path>,
    synthetic_audio: bool,
    synthetic_face: bool,
    session: Option<&Path>,
    flush: bool,
) -> Result<(), BemoreCliError> {
    if atty::is(atty::Stream::Stdin) {
        eprintln!("bemore run reads NDJSON capture records from stdin; pipe input or press Ctrl-D to end");
    }

    let mut engine = build_engine(sample_rate, weights, synthetic_audio, synthetic_face)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: CaptureRecord = serde_json::from_str(trimmed)
            .map_err(|e| BemoreCliError::ParseError(format!("Failed to parse record: {}", e)))?;

        if let Some(tick) = feed_record(&mut engine, record) {
            writeln!(stdout, "{}", serde_json::to_string(&tick)?)?;
            if flush {
                stdout.flush()?;
            }
        }
    }

    if let Some(session_path) = session {
        let record = engine.finish();
        fs::write(session_path, record.to_json().map_err(BemoreCliError::Engine)?)?;
    }

    Ok(())
}

fn cmd_tips(bucket: Option<&str>, json: bool) -> Result<(), BemoreCliError> {
    let buckets: Vec<Bucket> = match bucket {
        Some(name) => {
            let parsed: Bucket = serde_json::from_str(&format!("\"{}\"", name))
                .map_err(|_| BemoreCliError::UnknownBucket(name.to_string()))?;
            vec![parsed]
        }
        None => Bucket::ALL.to_vec(),
    };

    if json {
        let catalog: Vec<_> = buckets
            .iter()
            .flat_map(|b| tips_for_bucket(*b).iter())
            .collect();
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        for bucket in buckets {
            println!("{}", bucket.as_str());
            for tip in tips_for_bucket(bucket) {
                println!("  - {} {}", tip.insight, tip.action);
            }
        }
    }

    Ok(())
}

fn cmd_doctor(weights: Option<&Path>, json: bool) -> Result<(), BemoreCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("BeMore Core version {}", ENGINE_VERSION),
    });

    if let Some(weights_path) = weights {
        if weights_path.exists() {
            match fs::read_to_string(weights_path) {
                Ok(content) => match serde_json::from_str::<FusionWeights>(&content) {
                    Ok(parsed) => match parsed.validate() {
                        Ok(()) => checks.push(DoctorCheck {
                            name: "weights".to_string(),
                            status: CheckStatus::Ok,
                            message: "Fusion weights file valid".to_string(),
                        }),
                        Err(e) => checks.push(DoctorCheck {
                            name: "weights".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid fusion weights: {}", e),
                        }),
                    },
                    Err(e) => checks.push(DoctorCheck {
                        name: "weights".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid weights JSON: {}", e),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "weights".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read weights file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "weights".to_string(),
                status: CheckStatus::Warning,
                message: "Weights file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("BeMore Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BemoreCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn parse_ndjson(data: &str) -> Result<Vec<CaptureRecord>, BemoreCliError> {
    let mut records = Vec::new();
    for (index, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: CaptureRecord = serde_json::from_str(trimmed).map_err(|e| {
            BemoreCliError::ParseError(format!("line {}: {}", index + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

fn format_output(ticks: &[TickRecord], format: &OutputFormat) -> Result<String, BemoreCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for tick in ticks {
                lines.push(serde_json::to_string(tick)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(ticks)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(ticks)?),
    }
}

// Error types

#[derive(Debug)]
enum BemoreCliError {
    Io(io::Error),
    Engine(bemore_core::EngineError),
    Json(serde_json::Error),
    ParseError(String),
    NoRecords,
    NoTicks,
    BadTickInterval(i64),
    UnknownBucket(String),
    DoctorFailed,
}

impl From<io::Error> for BemoreCliError {
    fn from(e: io::Error) -> Self {
        BemoreCliError::Io(e)
    }
}

impl From<serde_json::Error> for BemoreCliError {
    fn from(e: serde_json::Error) -> Self {
        BemoreCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BemoreCliError> for CliError {
    fn from(e: BemoreCliError) -> Self {
        match e {
            BemoreCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BemoreCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check engine configuration".to_string()),
            },
            BemoreCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BemoreCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Records need a 'kind' of audio, face, text, or tick".to_string()),
            },
            BemoreCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No capture records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            BemoreCliError::NoTicks => CliError {
                code: "NO_TICKS".to_string(),
                message: "Input produced no fusion ticks".to_string(),
                hint: Some("Add tick records or pass --auto-tick".to_string()),
            },
            BemoreCliError::BadTickInterval(value) => CliError {
                code: "BAD_TICK_INTERVAL".to_string(),
                message: format!("Tick interval must be positive, got {}", value),
                hint: Some("Pass a positive --tick-interval-ms".to_string()),
            },
            BemoreCliError::UnknownBucket(name) => CliError {
                code: "UNKNOWN_BUCKET".to_string(),
                message: format!("Unknown bucket '{}'", name),
                hint: Some("Use lowV_highA, lowV_lowA, highV_highD, or neutral".to_string()),
            },
            BemoreCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
