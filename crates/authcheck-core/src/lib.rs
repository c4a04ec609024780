//! authcheck-core — shared library for product photo authenticity checks.
//!
//! Provides image preprocessing, ONNX inference, verdict mapping,
//! and result reporting used by the `authcheck` command-line front end.

pub mod error;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod sample;
pub mod verdict;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{AnalysisError, ErrorKind};
pub use pipeline::{run_analysis, Analyzer, AnalyzerConfig};
pub use report::AnalysisResult;
pub use verdict::{Status, Thresholds};
