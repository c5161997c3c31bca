//! Inference configuration
//!
//! The preprocessing and output-head strategy is selected by a sidecar
//! manifest written next to the model file (`<model>.json`), so a single
//! code path handles both the softmax multi-class export and the sigmoid
//! binary export.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Pixel normalization applied after resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelNorm {
    /// Divide raw byte values by 255.
    Scale,
    /// Scale to [0,1] then normalize with ImageNet channel mean/std.
    ImageNet,
}

/// Shape of the model's output head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayer {
    /// Probability vector over all classes; prediction is the arg-max.
    Softmax,
    /// Single probability for class 1; thresholded at 0.5.
    Sigmoid,
}

/// Configuration for model inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized ONNX model.
    pub model_path: PathBuf,

    /// Square input dimension the image is resized to.
    pub input_size: u32,

    /// Pixel normalization strategy.
    pub normalization: PixelNorm,

    /// Output head interpretation.
    pub output: OutputLayer,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/classifier.onnx"),
            input_size: 240,
            normalization: PixelNorm::ImageNet,
            output: OutputLayer::Softmax,
        }
    }
}

/// Subset of fields the sidecar manifest may override.
#[derive(Debug, Deserialize)]
struct Manifest {
    input_size: Option<u32>,
    normalization: Option<PixelNorm>,
    output: Option<OutputLayer>,
}

impl ModelConfig {
    /// Build a config for `model_path`, applying the `<model>.json` sidecar
    /// manifest when present. A missing manifest keeps the defaults; an
    /// unparsable one is logged and ignored.
    pub fn for_model(model_path: impl Into<PathBuf>) -> Self {
        let mut config = Self {
            model_path: model_path.into(),
            ..Self::default()
        };
        let manifest_path = config.manifest_path();
        if manifest_path.exists() {
            match std::fs::read_to_string(&manifest_path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<Manifest>(&s).map_err(|e| e.to_string()))
            {
                Ok(manifest) => {
                    if let Some(size) = manifest.input_size {
                        config.input_size = size;
                    }
                    if let Some(norm) = manifest.normalization {
                        config.normalization = norm;
                    }
                    if let Some(output) = manifest.output {
                        config.output = output;
                    }
                }
                Err(e) => {
                    warn!(path = %manifest_path.display(), error = %e, "Ignoring invalid model manifest");
                }
            }
        }
        config
    }

    /// Path of the sidecar manifest for this model.
    pub fn manifest_path(&self) -> PathBuf {
        let mut name = self
            .model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".json");
        self.model_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_primary_export() {
        let config = ModelConfig::default();
        assert_eq!(config.input_size, 240);
        assert_eq!(config.normalization, PixelNorm::ImageNet);
        assert_eq!(config.output, OutputLayer::Softmax);
    }

    #[test]
    fn manifest_overrides_strategy() {
        let dir = std::env::temp_dir().join("neuroscan-manifest-test");
        std::fs::create_dir_all(&dir).unwrap();
        let model = dir.join("binary.onnx");
        std::fs::write(
            dir.join("binary.onnx.json"),
            r#"{"input_size": 224, "normalization": "scale", "output": "sigmoid"}"#,
        )
        .unwrap();
        let config = ModelConfig::for_model(&model);
        assert_eq!(config.input_size, 224);
        assert_eq!(config.normalization, PixelNorm::Scale);
        assert_eq!(config.output, OutputLayer::Sigmoid);
    }

    #[test]
    fn missing_manifest_keeps_defaults() {
        let config = ModelConfig::for_model("/nonexistent/model.onnx");
        assert_eq!(config.input_size, 240);
        assert_eq!(config.output, OutputLayer::Softmax);
    }
}
