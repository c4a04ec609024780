//! ONNX model location, loading and inference via the `ort` crate.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use crate::error::{AnalysisError, BoxError, Result};
use crate::preprocess::INPUT_SHAPE;

/// File name of the exported binary classifier.
pub const MODEL_FILE_NAME: &str = "cosmetic_fake_real_model.onnx";

/// Where to look for the model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocator {
    primary: PathBuf,
    fallback: Option<PathBuf>,
}

impl ModelLocator {
    /// `<dir>/MODEL_FILE_NAME`, falling back to the same name in `<dir>/..`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            primary: dir.join(MODEL_FILE_NAME),
            fallback: dir.parent().map(|parent| parent.join(MODEL_FILE_NAME)),
        }
    }

    /// Default location: next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| AnalysisError::Setup(format!("cannot locate executable: {e}")))?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::in_dir(dir))
    }

    /// A single user-supplied path, no fallback.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            primary: path.into(),
            fallback: None,
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&Path> {
        self.fallback.as_deref()
    }

    /// First candidate that exists on disk.
    pub fn resolve(&self) -> Result<PathBuf> {
        if self.primary.exists() {
            return Ok(self.primary.clone());
        }
        if let Some(fallback) = self.fallback.as_ref().filter(|p| p.exists()) {
            tracing::debug!(
                primary = %self.primary.display(),
                fallback = %fallback.display(),
                "model missing at primary path, using fallback"
            );
            return Ok(fallback.clone());
        }
        Err(AnalysisError::ModelNotFound {
            primary: self.primary.clone(),
            fallback: self.fallback.clone(),
        })
    }
}

/// Check that ONNX Runtime can be initialised at all.
pub fn probe_runtime() -> Result<()> {
    Session::builder()
        .map(drop)
        .map_err(|e| AnalysisError::Setup(format!("ONNX Runtime unavailable: {e}")))
}

pub struct AuthenticityModel {
    path: PathBuf,
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for AuthenticityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticityModel")
            .field("path", &self.path)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl AuthenticityModel {
    /// Load an ONNX model from the given path.
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self> {
        let load_err = |source: BoxError| AnalysisError::ModelLoad {
            path: path.to_path_buf(),
            source,
        };

        let session = Session::builder()
            .map_err(|e| AnalysisError::Setup(format!("ONNX Runtime unavailable: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_err(ort::Error::from(e).into()))?
            .with_intra_threads(intra_threads.max(1))
            .map_err(|e| load_err(ort::Error::from(e).into()))?
            .commit_from_file(path)
            .map_err(|e| load_err(ort::Error::from(e).into()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| load_err("model declares no inputs".into()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| load_err("model declares no outputs".into()))?;

        tracing::info!(
            model = %path.display(),
            input = %input_name,
            output = %output_name,
            "model loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run one forward pass and return the fake-class probability, i.e. the
    /// output value at index `[0][0]`.
    pub fn predict(&self, tensor: &Array4<f32>) -> Result<f32> {
        if tensor.shape() != INPUT_SHAPE {
            return Err(AnalysisError::Predict(
                format!("expected input shape {:?}, got {:?}", INPUT_SHAPE, tensor.shape()).into(),
            ));
        }

        let input_tensor = TensorRef::from_array_view(tensor)
            .map_err(|e| AnalysisError::Predict(e.into()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| AnalysisError::Predict(format!("lock error: {e}").into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| AnalysisError::Predict(e.into()))?;

        let output_array = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(|e| AnalysisError::Predict(e.into()))?;
        let score = output_array
            .iter()
            .next()
            .copied()
            .ok_or_else(|| AnalysisError::Predict("model returned an empty output".into()))?;

        if !score.is_finite() {
            return Err(AnalysisError::Predict(
                format!("model returned a non-finite probability ({score})").into(),
            ));
        }

        tracing::debug!(score, "inference complete");
        Ok(score)
    }
}
