//! Neuroscan CLI
//!
//! Command-line interface for serving the web form, one-off predictions,
//! report generation, and notebook patching.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::disease;
use crate::inference::{ClassifierEngine, ModelConfig};
use crate::labels::LabelMap;
use crate::notebook;
use crate::report::{self, ReportData};
use crate::server::{run_server, ServerConfig};

fn step_ok(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

fn kv(key: &str, val: &str) {
    println!("  {} {}", key.dimmed(), val.white());
}

#[derive(Parser)]
#[command(name = "neuroscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Brain MRI tumor classification service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },

    /// Classify a single image and print the result
    Predict {
        /// Image file (png, jpg, jpeg)
        #[arg(short, long)]
        image: PathBuf,

        /// ONNX model file
        #[arg(short, long, default_value = "models/classifier.onnx")]
        model: PathBuf,

        /// Label map JSON file
        #[arg(short, long, default_value = "models/label_map.json")]
        labels: PathBuf,
    },

    /// Classify an image and render a PDF report
    Report {
        /// Image file (png, jpg, jpeg)
        #[arg(short, long)]
        image: PathBuf,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// ONNX model file
        #[arg(short, long, default_value = "models/classifier.onnx")]
        model: PathBuf,

        /// Label map JSON file
        #[arg(short, long, default_value = "models/label_map.json")]
        labels: PathBuf,

        /// Reference normal-brain image to show beside the scan
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Rewrite a training notebook so it runs on Google Colab
    PatchNotebook {
        /// Original notebook
        #[arg(short, long)]
        input: PathBuf,

        /// Patched notebook to write
        #[arg(short, long)]
        output: PathBuf,

        /// Archive location in Google Drive
        #[arg(
            long,
            default_value = "/content/drive/MyDrive/BrainTumorProject/archive_1.zip"
        )]
        drive_path: String,
    },
}

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..ServerConfig::default()
    };
    run_server(config).await
}

fn load_engine(model: &PathBuf, labels: &PathBuf) -> anyhow::Result<ClassifierEngine> {
    let engine = ClassifierEngine::load(ModelConfig::for_model(model), LabelMap::load(labels));
    if !engine.is_loaded() {
        anyhow::bail!("model could not be loaded from {}", model.display());
    }
    Ok(engine)
}

pub fn cmd_predict(image: &PathBuf, model: &PathBuf, labels: &PathBuf) -> anyhow::Result<()> {
    let engine = load_engine(model, labels)?;
    let result = engine.predict_path(image)?;
    let info = disease::lookup(&result.label);

    step_ok(&format!("Classified {}", image.display()));
    kv("label:", &result.label);
    kv("confidence:", &result.confidence_text());
    if !info.description.is_empty() {
        kv("description:", info.description);
    }
    Ok(())
}

pub fn cmd_report(
    image: &PathBuf,
    output: &PathBuf,
    model: &PathBuf,
    labels: &PathBuf,
    reference: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let engine = load_engine(model, labels)?;
    let result = engine.predict_path(image)?;
    let info = disease::lookup(&result.label);

    let data = ReportData {
        label: result.label.clone(),
        confidence: result.confidence_text(),
        description: info.description.to_string(),
        cause: info.cause.to_string(),
        symptoms: info.symptoms.iter().map(|s| s.to_string()).collect(),
    };
    report::generate(&data, image, reference.map(PathBuf::as_path), output)?;

    step_ok(&format!(
        "Report for {} ({}) written to {}",
        result.label,
        result.confidence_text(),
        output.display()
    ));
    Ok(())
}

pub fn cmd_patch_notebook(
    input: &PathBuf,
    output: &PathBuf,
    drive_path: &str,
) -> anyhow::Result<()> {
    notebook::patch_notebook(input, output, drive_path)?;
    step_ok(&format!("Patched notebook written to {}", output.display()));
    Ok(())
}
