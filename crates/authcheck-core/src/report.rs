//! Analysis result record and its output formatting.

use serde::Serialize;

use crate::error::{AnalysisError, ErrorKind};
use crate::verdict::{Assessment, Status};

const PRODUCT_NAME: &str = "Cosmetic Product";
const BRAND: &str = "ML Visual Analysis";

/// One analysis outcome, shaped for the JSON consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub status: Status,
    pub confidence_score: u8,
    pub reasoning: Vec<String>,
    pub product_name: String,
    pub brand: String,
    pub extracted_text: Vec<String>,
    pub batch_code: String,
    pub official_website: String,
    pub reporting_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl AnalysisResult {
    pub fn from_assessment(assessment: &Assessment, probability: f32) -> Self {
        let p = f64::from(probability);
        Self {
            status: assessment.status,
            confidence_score: assessment.confidence.min(100),
            reasoning: assessment.reasoning.clone(),
            product_name: PRODUCT_NAME.to_string(),
            brand: BRAND.to_string(),
            extracted_text: vec![
                format!("ML Confidence: {}%", assessment.confidence),
                format!("Probability Score: {p:.3}"),
            ],
            batch_code: String::new(),
            official_website: String::new(),
            reporting_url: String::new(),
            ml_probability: Some((p * 10_000.0).round() / 10_000.0),
            error: None,
            error_kind: None,
        }
    }

    /// Failure record. Status is always UNKNOWN and confidence zero.
    pub fn failure(kind: ErrorKind, message: impl Into<String>, reasoning: Vec<String>) -> Self {
        let product_name = match kind {
            ErrorKind::Setup => "Setup Error",
            _ => "Error",
        };
        Self {
            status: Status::Unknown,
            confidence_score: 0,
            reasoning,
            product_name: product_name.to_string(),
            brand: "System".to_string(),
            extracted_text: Vec::new(),
            batch_code: String::new(),
            official_website: String::new(),
            reporting_url: String::new(),
            ml_probability: None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    pub fn from_error(err: &AnalysisError) -> Self {
        let reasoning = match err {
            AnalysisError::Setup(_) => {
                "ONNX Runtime could not be initialised; check the installation".to_string()
            }
            AnalysisError::InputNotFound(_) => "File does not exist".to_string(),
            other => format!("Analysis error: {other}"),
        };
        Self::failure(err.kind(), err.to_string(), vec![reasoning])
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

pub fn render(result: &AnalysisResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result),
    }
}

pub fn print_result(result: &AnalysisResult, format: OutputFormat) {
    println!("{}", render(result, format));
}

fn render_json(result: &AnalysisResult) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| {
        format!(r#"{{"error":"failed to serialize result: {e}","status":"UNKNOWN","confidenceScore":0}}"#)
    })
}

fn render_text(result: &AnalysisResult) -> String {
    let rule = "=".repeat(70);
    let mut out = vec![rule.clone()];

    match &result.error {
        Some(err) => {
            out.push(format!("VERDICT: {} ({})", result.status, err));
        }
        None => {
            out.push(format!(
                "VERDICT: {}  [confidence {}%]",
                result.status, result.confidence_score
            ));
            if let Some(p) = result.ml_probability {
                out.push(format!("  Fake probability: {p:.4}"));
            }
        }
    }
    out.push(rule.clone());

    if !result.reasoning.is_empty() {
        out.push("REASONING:".to_string());
        out.extend(result.reasoning.iter().map(|r| format!("  - {r}")));
    }
    out.push(rule);
    out.join("\n")
}
