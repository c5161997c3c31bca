//! Application state management
//!
//! Shared state is read-only after startup except for the one-shot result
//! store, which carries a payload across the POST -> redirect -> GET hop and
//! hands it out exactly once.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::inference::ClassifierEngine;
use crate::storage::UploadStore;

use super::ServerConfig;

/// Result payload for a single-image prediction.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub label: String,
    pub confidence: String,
    pub description: String,
    pub cause: String,
    pub treatment: String,
    pub symptoms: Vec<String>,
    pub image_url: String,
    pub example_url: Option<String>,
    pub pdf_url: Option<String>,
    /// Set when PDF generation was requested but failed; rendered as a
    /// warning instead of being silently dropped.
    pub report_error: Option<String>,
}

/// One row of a batch prediction table.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a consumed result token renders as.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewPayload {
    Single(ResultView),
    Batch { rows: Vec<BatchRow> },
    Flash { message: String },
}

struct PendingResult {
    payload: ViewPayload,
    created_at: Instant,
}

/// Server-side map of one-time result tokens. An entry is removed on first
/// read; unread entries are purged after `ttl`.
pub struct ResultStore {
    entries: RwLock<HashMap<String, PendingResult>>,
    ttl: Duration,
}

impl ResultStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    /// Store a payload and return its one-time token.
    pub async fn put(&self, payload: ViewPayload) -> String {
        let id = Self::generate_id();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.created_at.elapsed() < self.ttl);
        entries.insert(
            id.clone(),
            PendingResult {
                payload,
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Consume a token: the payload is returned at most once.
    pub async fn take(&self, id: &str) -> Option<ViewPayload> {
        let mut entries = self.entries.write().await;
        entries
            .remove(id)
            .filter(|e| e.created_at.elapsed() < self.ttl)
            .map(|e| e.payload)
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: ClassifierEngine,
    pub uploads: UploadStore,
    pub results: ResultStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> crate::Result<Self> {
        let engine = config.load_engine();
        Self::with_engine(config, engine)
    }

    /// Build state around an already-constructed engine. Lets tests inject
    /// a stub backend.
    pub fn with_engine(config: ServerConfig, engine: ClassifierEngine) -> crate::Result<Self> {
        let uploads = UploadStore::new(&config.upload_dir, config.retention)?;
        std::fs::create_dir_all(&config.examples_dir)?;
        Ok(Self {
            uploads,
            engine,
            results: ResultStore::new(Duration::from_secs(config.result_ttl_secs)),
            config,
        })
    }

    /// Reference image shown beside the patient scan in reports, when one
    /// exists on disk.
    pub fn reference_image(&self) -> Option<PathBuf> {
        let primary = self.config.examples_dir.join("normal_brain_mri.jpg");
        if primary.exists() {
            return Some(primary);
        }
        let fallback = self.config.examples_dir.join("no_tumor.jpg");
        fallback.exists().then_some(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_is_consumed_on_first_take() {
        let store = ResultStore::new(Duration::from_secs(60));
        let id = store
            .put(ViewPayload::Flash {
                message: "hi".into(),
            })
            .await;
        assert!(store.take(&id).await.is_some());
        assert!(store.take(&id).await.is_none());
    }

    #[tokio::test]
    async fn unknown_token_yields_nothing() {
        let store = ResultStore::new(Duration::from_secs(60));
        assert!(store.take("deadbeef").await.is_none());
    }

    #[tokio::test]
    async fn expired_token_is_not_served() {
        let store = ResultStore::new(Duration::from_secs(0));
        let id = store
            .put(ViewPayload::Flash {
                message: "stale".into(),
            })
            .await;
        assert!(store.take(&id).await.is_none());
    }
}
