//! authcheck - classifies a product photo as AUTHENTIC, SUSPICIOUS or FAKE.
//!
//! Usage:
//!   authcheck photo.jpg
//!   authcheck photo.jpg --model cosmetic_fake_real_model.onnx --scheme wide
//!   authcheck photo.jpg --suspicious-at 0.4 --fake-at 0.8 --format text
//!   authcheck --check
//!
//! Always writes exactly one JSON object to stdout (unless `--format text`);
//! logs go to stderr. Exit code is 0 only when the result carries no error.

use std::any::Any;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use authcheck_core::model::{probe_runtime, ModelLocator};
use authcheck_core::pipeline::{
    model_status, run_analysis, AnalyzerConfig, ModelStatus, DEFAULT_INTRA_THREADS,
};
use authcheck_core::report::{print_result, AnalysisResult, OutputFormat};
use authcheck_core::{AnalysisError, ErrorKind, Thresholds};

const USAGE: &str = "Usage: authcheck <image_path>";

/// Keeps ONNX Runtime quiet unless RUST_LOG asks otherwise.
const DEFAULT_LOG_FILTER: &str = "error,authcheck=info,authcheck_core=info";

#[derive(Parser)]
#[command(name = "authcheck", version)]
#[command(about = "ONNX-based product photo authenticity checker")]
struct Cli {
    /// Product photo to analyze
    image_path: Option<PathBuf>,

    /// Path to the ONNX model file [default: next to the executable, then its parent directory]
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Threshold preset
    #[arg(long, value_enum, default_value_t = Scheme::Standard)]
    scheme: Scheme,

    /// Override the lower edge of the SUSPICIOUS band (0.0-1.0)
    #[arg(long)]
    suspicious_at: Option<f32>,

    /// Override the lower edge of the FAKE band (0.0-1.0)
    #[arg(long)]
    fake_at: Option<f32>,

    /// ONNX Runtime intra-op threads
    #[arg(long, default_value_t = DEFAULT_INTRA_THREADS)]
    threads: usize,

    /// Output format
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Report whether the model and runtime are available, then exit
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scheme {
    /// 0.35 / 0.65
    Standard,
    /// 0.30 / 0.70
    Wide,
}

impl Cli {
    fn thresholds(&self) -> Result<Thresholds, AnalysisError> {
        let preset = match self.scheme {
            Scheme::Standard => Thresholds::STANDARD,
            Scheme::Wide => Thresholds::WIDE,
        };
        Thresholds::new(
            self.suspicious_at.unwrap_or(preset.suspicious_from),
            self.fake_at.unwrap_or(preset.fake_from),
        )
    }

    fn locator(&self) -> Result<ModelLocator, AnalysisError> {
        match &self.model {
            Some(path) => Ok(ModelLocator::explicit(path)),
            None => ModelLocator::beside_executable(),
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// What a single invocation prints.
enum Reply {
    Result(AnalysisResult, OutputFormat),
    Status(ModelStatus),
    /// `--help` / `--version` text.
    Info(clap::Error),
}

impl Reply {
    fn succeeded(&self) -> bool {
        match self {
            Reply::Result(result, _) => result.is_success(),
            Reply::Status(status) => status.ready,
            Reply::Info(_) => true,
        }
    }

    fn print(&self) {
        match self {
            Reply::Result(result, format) => print_result(result, *format),
            Reply::Status(status) => match serde_json::to_string(status) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("[!] failed to serialize status: {e}"),
            },
            Reply::Info(e) => {
                let _ = e.print();
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `analysis`, turning a panic into a `fatal` failure record.
fn guarded(analysis: impl FnOnce() -> AnalysisResult) -> AnalysisResult {
    panic::catch_unwind(AssertUnwindSafe(analysis)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(error = %message, "analysis panicked");
        AnalysisResult::failure(
            ErrorKind::Fatal,
            message.clone(),
            vec![format!("Fatal error: {message}")],
        )
    })
}

fn usage_failure(message: &str) -> AnalysisResult {
    AnalysisResult::failure(ErrorKind::Usage, message, vec![USAGE.to_string()])
}

/// The runtime check comes first; nothing else is looked at when it fails.
fn run<I, T>(args: I, runtime_check: impl FnOnce() -> Result<(), AnalysisError>) -> Reply
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    if let Err(e) = runtime_check() {
        tracing::error!(error = %e, "runtime unavailable");
        return Reply::Result(AnalysisResult::from_error(&e), OutputFormat::Json);
    }

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            return Reply::Info(e);
        }
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered.lines().next().unwrap_or("invalid arguments");
            let result = usage_failure(message.trim_start_matches("error: "));
            return Reply::Result(result, OutputFormat::Json);
        }
    };

    let locator = match cli.locator() {
        Ok(locator) => locator,
        Err(e) => return Reply::Result(AnalysisResult::from_error(&e), cli.format),
    };

    if cli.check {
        return Reply::Status(model_status(&locator));
    }

    let Some(image_path) = cli.image_path.clone() else {
        return Reply::Result(usage_failure("No image path provided"), cli.format);
    };

    let thresholds = match cli.thresholds() {
        Ok(thresholds) => thresholds,
        Err(e) => return Reply::Result(AnalysisResult::from_error(&e), cli.format),
    };

    let config = AnalyzerConfig {
        model: locator,
        thresholds,
        intra_threads: cli.threads,
    };

    tracing::info!(
        image = %image_path.display(),
        model = %config.model.primary().display(),
        suspicious_from = thresholds.suspicious_from,
        fake_from = thresholds.fake_from,
        "analyzing"
    );

    let result = guarded(|| run_analysis(&config, &image_path));
    Reply::Result(result, cli.format)
}

fn main() -> ExitCode {
    init_logging();

    let reply = run(std::env::args_os(), probe_runtime);
    reply.print();
    if reply.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
