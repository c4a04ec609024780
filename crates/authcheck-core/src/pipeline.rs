//! Single-image analysis orchestrator shared by the CLI entry points.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::model::{probe_runtime, AuthenticityModel, ModelLocator};
use crate::preprocess::preprocess_image;
use crate::report::AnalysisResult;
use crate::verdict::{assess, Assessment, Thresholds};

pub const DEFAULT_INTRA_THREADS: usize = 4;

/// Configuration for an analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub model: ModelLocator,
    pub thresholds: Thresholds,
    pub intra_threads: usize,
}

impl AnalyzerConfig {
    pub fn new(model: ModelLocator) -> Self {
        Self {
            model,
            thresholds: Thresholds::default(),
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

/// Probability plus the verdict derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub probability: f32,
    pub assessment: Assessment,
}

impl Analysis {
    pub fn to_result(&self) -> AnalysisResult {
        AnalysisResult::from_assessment(&self.assessment, self.probability)
    }
}

/// Holds the loaded model for the lifetime of the process. Construct once
/// and pass by reference; every call reuses the same session.
#[derive(Debug)]
pub struct Analyzer {
    model: AuthenticityModel,
    thresholds: Thresholds,
}

impl Analyzer {
    /// Probe the runtime, resolve the artifact and load it.
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        probe_runtime()?;
        Self::open(config)
    }

    fn open(config: &AnalyzerConfig) -> Result<Self> {
        let path = config.model.resolve()?;
        let model = AuthenticityModel::load(&path, config.intra_threads)?;
        Ok(Self::with_model(model, config.thresholds))
    }

    pub fn with_model(model: AuthenticityModel, thresholds: Thresholds) -> Self {
        Self { model, thresholds }
    }

    pub fn model(&self) -> &AuthenticityModel {
        &self.model
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn predict_probability(&self, image_path: &Path) -> Result<f32> {
        let tensor = preprocess_image(image_path)?;
        self.model.predict(&tensor)
    }

    pub fn analyze(&self, image_path: &Path) -> Result<Analysis> {
        if !image_path.exists() {
            return Err(AnalysisError::InputNotFound(image_path.to_path_buf()));
        }

        let probability = self.predict_probability(image_path)?;
        let assessment = assess(probability, &self.thresholds);

        tracing::info!(
            image = %image_path.display(),
            probability,
            status = %assessment.status,
            confidence = assessment.confidence,
            "analysis complete"
        );

        Ok(Analysis {
            probability,
            assessment,
        })
    }
}

/// Full per-invocation pipeline: runtime check, then the input path, then
/// the model. Every failure is folded into an UNKNOWN result.
pub fn run_analysis(config: &AnalyzerConfig, image_path: &Path) -> AnalysisResult {
    if let Err(err) = probe_runtime() {
        tracing::error!(error = %err, "runtime unavailable");
        return AnalysisResult::from_error(&err);
    }

    if !image_path.exists() {
        let err = AnalysisError::InputNotFound(image_path.to_path_buf());
        tracing::warn!(error = %err, "input rejected");
        return AnalysisResult::from_error(&err);
    }

    match Analyzer::open(config).and_then(|analyzer| analyzer.analyze(image_path)) {
        Ok(analysis) => analysis.to_result(),
        Err(err) => {
            tracing::error!(kind = %err.kind(), error = %err, "analysis failed");
            AnalysisResult::from_error(&err)
        }
    }
}

/// Readiness report for an installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub model_path: PathBuf,
    pub model_exists: bool,
    pub runtime_ready: bool,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn model_status(locator: &ModelLocator) -> ModelStatus {
    let resolved = locator.resolve();
    let runtime = probe_runtime();

    let model_exists = resolved.is_ok();
    let runtime_ready = runtime.is_ok();
    let error = resolved
        .as_ref()
        .err()
        .or(runtime.as_ref().err())
        .map(|e| e.to_string());

    ModelStatus {
        model_path: resolved.unwrap_or_else(|_| locator.primary().to_path_buf()),
        model_exists,
        runtime_ready,
        ready: model_exists && runtime_ready,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures;
    use crate::model::MODEL_FILE_NAME;
    use crate::verdict::Status;
    use image::{Rgb, RgbImage};

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn with_model() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fixtures::write_mean_pixel_model(&dir.path().join(MODEL_FILE_NAME)).unwrap();
            Self { dir }
        }

        fn without_model() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn config(&self) -> AnalyzerConfig {
            let mut config = AnalyzerConfig::new(ModelLocator::in_dir(self.dir.path()));
            config.intra_threads = 1;
            config
        }

        fn image(&self, name: &str, value: u8, w: u32, h: u32) -> PathBuf {
            let path = self.dir.path().join(name);
            RgbImage::from_pixel(w, h, Rgb([value, value, value]))
                .save(&path)
                .unwrap();
            path
        }
    }

    #[test]
    fn black_photo_is_authentic() {
        let ws = Workspace::with_model();
        let img = ws.image("black.png", 0, 320, 240);

        let result = run_analysis(&ws.config(), &img);
        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.status, Status::Authentic);
        assert_eq!(result.confidence_score, 100);
        assert_eq!(result.ml_probability, Some(0.0));
    }

    #[test]
    fn white_photo_is_fake() {
        let ws = Workspace::with_model();
        let img = ws.image("white.png", 255, 100, 400);

        let result = run_analysis(&ws.config(), &img);
        assert_eq!(result.status, Status::Fake);
        assert_eq!(result.confidence_score, 100);
    }

    #[test]
    fn mid_gray_photo_is_suspicious() {
        let ws = Workspace::with_model();
        let img = ws.image("gray.png", 128, 224, 224);

        let analyzer = Analyzer::new(&ws.config()).unwrap();
        let analysis = analyzer.analyze(&img).unwrap();
        assert_eq!(analysis.assessment.status, Status::Suspicious);
        assert!((analysis.probability - 128.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn analyzer_is_reusable() {
        let ws = Workspace::with_model();
        let black = ws.image("black.png", 0, 10, 10);
        let white = ws.image("white.png", 255, 10, 10);

        let analyzer = Analyzer::new(&ws.config()).unwrap();
        assert_eq!(analyzer.analyze(&black).unwrap().assessment.status, Status::Authentic);
        assert_eq!(analyzer.analyze(&white).unwrap().assessment.status, Status::Fake);
        assert_eq!(analyzer.thresholds(), &Thresholds::STANDARD);
    }

    #[test]
    fn thresholds_come_from_config() {
        let ws = Workspace::with_model();
        // 77/255 ≈ 0.302: authentic under the standard bands, suspicious under wide.
        let img = ws.image("dim.png", 77, 50, 50);

        let mut config = ws.config();
        assert_eq!(run_analysis(&config, &img).status, Status::Authentic);

        config.thresholds = Thresholds::WIDE;
        assert_eq!(run_analysis(&config, &img).status, Status::Suspicious);
    }

    #[test]
    fn missing_input_is_reported_before_model_lookup() {
        let ws = Workspace::without_model();
        let result = run_analysis(&ws.config(), &ws.dir.path().join("nope.jpg"));

        assert_eq!(result.status, Status::Unknown);
        assert_eq!(result.error_kind, Some(ErrorKind::InputNotFound));
    }

    #[test]
    fn missing_model_is_reported() {
        let ws = Workspace::without_model();
        let img = ws.image("black.png", 0, 8, 8);

        let result = run_analysis(&ws.config(), &img);
        assert_eq!(result.status, Status::Unknown);
        assert_eq!(result.confidence_score, 0);
        assert_eq!(result.error_kind, Some(ErrorKind::ModelNotFound));
    }

    #[test]
    fn undecodable_input_is_a_preprocess_failure() {
        let ws = Workspace::with_model();
        let path = ws.dir.path().join("broken.jpg");
        std::fs::write(&path, b"\xff\xd8\xff garbage").unwrap();

        let result = run_analysis(&ws.config(), &path);
        assert_eq!(result.error_kind, Some(ErrorKind::Preprocess));
        assert!(result.error.unwrap().starts_with("preprocessing failed"));
    }

    #[test]
    fn analyze_checks_input_existence() {
        let ws = Workspace::with_model();
        let analyzer = Analyzer::new(&ws.config()).unwrap();
        let err = analyzer.analyze(Path::new("/nonexistent/x.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputNotFound);
    }

    #[test]
    fn status_reports_ready_installation() {
        let ws = Workspace::with_model();
        let status = model_status(&ModelLocator::in_dir(ws.dir.path()));

        assert!(status.model_exists);
        assert!(status.runtime_ready);
        assert!(status.ready);
        assert!(status.error.is_none());
        assert_eq!(status.model_path, ws.dir.path().join(MODEL_FILE_NAME));
    }

    #[test]
    fn status_reports_missing_model() {
        let ws = Workspace::without_model();
        let status = model_status(&ModelLocator::explicit(ws.dir.path().join("m.onnx")));

        assert!(!status.model_exists);
        assert!(!status.ready);
        assert!(status.error.unwrap().starts_with("model not found"));

        let json = serde_json::to_value(
            model_status(&ModelLocator::explicit(ws.dir.path().join("m.onnx"))),
        )
        .unwrap();
        assert_eq!(json["modelExists"], false);
        assert_eq!(json["ready"], false);
    }
}
