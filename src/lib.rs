//! Neuroscan - Brain MRI tumor classification service
//!
//! Serves MRI images to a pretrained ONNX classifier through a web form,
//! shows the predicted tumor class with descriptive text, and optionally
//! renders a one-page PDF report.
//!
//! # Modules
//!
//! - [`inference`] - Model loading and image classification
//! - [`labels`] - Class-name to index mapping with fallback labels
//! - [`disease`] - Static per-class descriptive text
//! - [`storage`] - Upload persistence with a retention policy
//! - [`report`] - PDF report generation
//! - [`server`] - HTTP server with web form and health endpoint
//! - [`notebook`] - Jupyter notebook Colab patcher
//! - [`cli`] - Command-line interface

pub mod error;

pub mod disease;
pub mod inference;
pub mod labels;
pub mod notebook;
pub mod report;
pub mod storage;

pub mod cli;
pub mod server;

pub use error::{Result, ScanError};
