//! Neuroscan HTTP server
//!
//! Web form for uploading MRI scans, a health endpoint, and static serving
//! of uploads, reports, and example images.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::{AppState, BatchRow, ResultStore, ResultView, ViewPayload};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::inference::{ClassifierEngine, ModelConfig};
use crate::labels::LabelMap;
use crate::storage::RetentionPolicy;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub label_map_path: PathBuf,
    pub upload_dir: PathBuf,
    pub examples_dir: PathBuf,
    pub max_upload_size: usize,
    pub retention: RetentionPolicy,
    /// How long an unread result token stays valid.
    pub result_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/classifier.onnx".to_string())
                .into(),
            label_map_path: std::env::var("LABEL_MAP_PATH")
                .unwrap_or_else(|_| "models/label_map.json".to_string())
                .into(),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".to_string())
                .into(),
            examples_dir: std::env::var("EXAMPLES_DIR")
                .unwrap_or_else(|_| "static/disease_examples".to_string())
                .into(),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20 * 1024 * 1024), // 20MB
            retention: RetentionPolicy::default(),
            result_ttl_secs: 600,
        }
    }
}

impl ServerConfig {
    /// Load the classifier and label map described by this config. Both
    /// degrade softly: a missing model leaves the engine not-loaded, a
    /// missing label map falls back to the builtin labels.
    pub fn load_engine(&self) -> ClassifierEngine {
        let labels = LabelMap::load(&self.label_map_path);
        let model_config = ModelConfig::for_model(&self.model_path);
        ClassifierEngine::load(model_config, labels)
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        upload_dir = %config.upload_dir.display(),
        model = %config.model_path.display(),
        started_at = %start_time.to_rfc3339(),
        "Initializing server"
    );

    let state = Arc::new(AppState::new(config.clone())?);
    if !state.engine.is_loaded() {
        warn!("Serving without a loaded model; predictions will report as unavailable");
    }
    let app = create_router(Arc::clone(&state), &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        model_loaded = state.engine.is_loaded(),
        "Neuroscan server listening"
    );
    info!(url = %format!("http://{}", addr), "Web form available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_size, 20 * 1024 * 1024);
        assert_eq!(config.result_ttl_secs, 600);
    }
}
