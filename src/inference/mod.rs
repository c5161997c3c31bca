//! Image classification
//!
//! Loads a pretrained ONNX classifier once at startup and exposes a single
//! synchronous predict operation. A failed load degrades to a "not loaded"
//! state instead of aborting the process.

mod config;
mod engine;
mod preprocess;

pub use config::{ModelConfig, OutputLayer, PixelNorm};
pub use engine::{Classification, ClassifierEngine, ModelBackend};
pub use preprocess::preprocess_image;
