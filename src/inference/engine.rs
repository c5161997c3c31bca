//! Classifier engine
//!
//! Wraps the ONNX plan behind a small [`ModelBackend`] trait so the rest of
//! the service only sees "tensor in, probabilities out". Load failure leaves
//! the engine in a not-loaded state; every subsequent predict returns
//! [`ScanError::ModelUnavailable`] instead of crashing the process.

use std::path::Path;

use tract_onnx::prelude::*;
use tract_onnx::prelude::tract_ndarray::Array4;
use tracing::{info, warn};

use crate::labels::LabelMap;
use crate::{Result, ScanError};

use super::{preprocess, ModelConfig, OutputLayer};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Raw inference seam: preprocessed tensor in, probability values out.
pub trait ModelBackend: Send + Sync {
    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>>;
}

struct OnnxBackend {
    plan: OnnxPlan,
}

impl OnnxBackend {
    fn load(config: &ModelConfig) -> Result<Self> {
        let size = config.input_size as i64;
        let plan = tract_onnx::onnx()
            .model_for_path(&config.model_path)
            .map_err(|e| ScanError::Inference(e.to_string()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .map_err(|e| ScanError::Inference(e.to_string()))?
            .into_optimized()
            .map_err(|e| ScanError::Inference(e.to_string()))?
            .into_runnable()
            .map_err(|e| ScanError::Inference(e.to_string()))?;
        Ok(Self { plan })
    }
}

impl ModelBackend for OnnxBackend {
    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(|e| ScanError::Inference(e.to_string()))?;
        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| ScanError::Inference(e.to_string()))?;
        Ok(view.iter().copied().collect())
    }
}

/// One classification outcome.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Human-readable class name.
    pub label: String,
    /// Predicted class index.
    pub index: usize,
    /// Arg-max probability as a percentage in (0, 100].
    pub confidence: f64,
}

impl Classification {
    /// Confidence formatted the way the UI and report show it.
    pub fn confidence_text(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}

/// Classifier loaded once at process start.
pub struct ClassifierEngine {
    config: ModelConfig,
    labels: LabelMap,
    backend: Option<Box<dyn ModelBackend>>,
}

impl std::fmt::Debug for ClassifierEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierEngine")
            .field("config", &self.config)
            .field("is_loaded", &self.is_loaded())
            .finish()
    }
}

impl ClassifierEngine {
    /// Load the ONNX model described by `config`. On failure the engine is
    /// still constructed, but not loaded.
    pub fn load(config: ModelConfig, labels: LabelMap) -> Self {
        let backend = match OnnxBackend::load(&config) {
            Ok(backend) => {
                info!(
                    model = %config.model_path.display(),
                    input_size = config.input_size,
                    output = ?config.output,
                    "Classifier loaded"
                );
                Some(Box::new(backend) as Box<dyn ModelBackend>)
            }
            Err(e) => {
                warn!(
                    model = %config.model_path.display(),
                    error = %e,
                    "Classifier failed to load, predictions will be unavailable"
                );
                None
            }
        };
        Self {
            config,
            labels,
            backend,
        }
    }

    /// Construct with an explicit backend, bypassing ONNX loading. Used by
    /// tests and alternative runtimes.
    pub fn with_backend(
        config: ModelConfig,
        labels: LabelMap,
        backend: Box<dyn ModelBackend>,
    ) -> Self {
        Self {
            config,
            labels,
            backend: Some(backend),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Classify an image file on disk.
    pub fn predict_path(&self, path: &Path) -> Result<Classification> {
        let bytes = std::fs::read(path)?;
        self.predict_bytes(&bytes)
    }

    /// Classify raw image bytes. Decode runs before the model check so a
    /// corrupt upload is reported as such even when the model is absent.
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Classification> {
        let img = preprocess::decode_image(bytes)?;
        let backend = self.backend.as_deref().ok_or(ScanError::ModelUnavailable)?;
        let tensor =
            preprocess::preprocess_image(&img, self.config.input_size, self.config.normalization);
        let probs = backend.infer(tensor)?;
        self.interpret(&probs)
    }

    /// Map a raw probability vector to a labeled classification according
    /// to the configured output head.
    fn interpret(&self, probs: &[f32]) -> Result<Classification> {
        if probs.is_empty() {
            return Err(ScanError::Inference("model produced no output".into()));
        }
        let (index, confidence) = match self.config.output {
            OutputLayer::Softmax => {
                let (idx, p) = probs
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .expect("non-empty probabilities");
                (idx, *p as f64)
            }
            OutputLayer::Sigmoid => {
                let p = probs[0] as f64;
                if p >= 0.5 {
                    (1, p)
                } else {
                    (0, 1.0 - p)
                }
            }
        };
        Ok(Classification {
            label: self.labels.name(index),
            index,
            confidence: confidence * 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(Vec<f32>);

    impl ModelBackend for FixedBackend {
        fn infer(&self, _input: Array4<f32>) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([90, 90, 90]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn missing_model_reports_unavailable() {
        let config = ModelConfig::for_model("/nonexistent/classifier.onnx");
        let engine = ClassifierEngine::load(config, LabelMap::fallback());
        assert!(!engine.is_loaded());
        assert!(matches!(
            engine.predict_bytes(&png_bytes()),
            Err(ScanError::ModelUnavailable)
        ));
    }

    #[test]
    fn corrupt_image_reported_before_model_state() {
        let config = ModelConfig::for_model("/nonexistent/classifier.onnx");
        let engine = ClassifierEngine::load(config, LabelMap::fallback());
        assert!(matches!(
            engine.predict_bytes(b"garbage"),
            Err(ScanError::ImageDecode(_))
        ));
    }

    #[test]
    fn softmax_argmax_and_confidence() {
        let engine = ClassifierEngine::with_backend(
            ModelConfig::default(),
            LabelMap::fallback(),
            Box::new(FixedBackend(vec![0.05, 0.1, 0.8, 0.05])),
        );
        let result = engine.predict_bytes(&png_bytes()).unwrap();
        assert_eq!(result.label, "No Tumor");
        assert_eq!(result.index, 2);
        // Probabilities come back as f32, so allow for the widening error.
        assert!((result.confidence - 80.0).abs() < 1e-4);
        assert_eq!(result.confidence_text(), "80.00%");
    }

    #[test]
    fn sigmoid_thresholds_at_half() {
        let mut config = ModelConfig::default();
        config.output = OutputLayer::Sigmoid;
        let engine = ClassifierEngine::with_backend(
            config.clone(),
            LabelMap::fallback(),
            Box::new(FixedBackend(vec![0.2])),
        );
        let result = engine.predict_bytes(&png_bytes()).unwrap();
        assert_eq!(result.index, 0);
        assert!((result.confidence - 80.0).abs() < 1e-4);

        let engine = ClassifierEngine::with_backend(
            config,
            LabelMap::fallback(),
            Box::new(FixedBackend(vec![0.9])),
        );
        let result = engine.predict_bytes(&png_bytes()).unwrap();
        assert_eq!(result.index, 1);
        assert!((result.confidence - 90.0).abs() < 1e-4);
    }

    #[test]
    fn unmapped_index_gets_synthesized_label() {
        let engine = ClassifierEngine::with_backend(
            ModelConfig::default(),
            LabelMap::fallback(),
            Box::new(FixedBackend(vec![0.1, 0.1, 0.1, 0.1, 0.6])),
        );
        let result = engine.predict_bytes(&png_bytes()).unwrap();
        assert_eq!(result.label, "Class_4");
    }
}
