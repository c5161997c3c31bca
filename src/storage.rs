//! Upload storage
//!
//! Persists uploaded images under a fixed directory with a timestamp prefix
//! to avoid name collisions, and enforces a retention policy so uploads do
//! not accumulate without bound.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::{Result, ScanError};

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Returns true if the filename carries an allowed image extension.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Strip path components and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(['.', '_']).to_string();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed
    }
}

/// Limits on how long and how many uploads are kept.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_age: Option<Duration>,
    pub max_count: Option<usize>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            // One day, 500 files: generous for a single-operator tool.
            max_age: Some(Duration::from_secs(24 * 60 * 60)),
            max_count: Some(500),
        }
    }
}

/// A file persisted by [`UploadStore::save`].
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Final on-disk filename, timestamp-prefixed.
    pub file_name: String,
    pub path: PathBuf,
}

/// Writes uploads into one directory and sweeps expired entries.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    policy: RetentionPolicy,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, policy: RetentionPolicy) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, policy })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `bytes` under a sanitized, timestamp-prefixed name and apply
    /// the retention policy.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        if !allowed_file(original_name) {
            return Err(ScanError::Validation(format!(
                "unsupported file type: {original_name}"
            )));
        }
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let file_name = format!("{}_{}", ts, sanitize_filename(original_name));
        let path = self.dir.join(&file_name);
        std::fs::write(&path, bytes)?;
        debug!(file = %file_name, size = bytes.len(), "Stored upload");

        if let Err(e) = self.sweep() {
            warn!(error = %e, "Upload retention sweep failed");
        }
        Ok(StoredUpload { file_name, path })
    }

    /// Join a generated filename (e.g. a report PDF) into the store
    /// directory without writing it.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Delete uploads past `max_age` and, oldest first, anything beyond
    /// `max_count`. Returns the number of files removed.
    pub fn sweep(&self) -> Result<usize> {
        let mut entries: Vec<(PathBuf, SystemTime)> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                Some((e.path(), modified))
            })
            .collect();
        entries.sort_by_key(|(_, t)| *t);

        let now = SystemTime::now();
        let mut removed = 0;

        if let Some(max_age) = self.policy.max_age {
            entries.retain(|(path, modified)| {
                let expired = now
                    .duration_since(*modified)
                    .map(|age| age > max_age)
                    .unwrap_or(false);
                if expired && std::fs::remove_file(path).is_ok() {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }

        if let Some(max_count) = self.policy.max_count {
            while entries.len() > max_count {
                let (path, _) = entries.remove(0);
                if std::fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            debug!(removed, "Swept expired uploads");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_any_case() {
        assert!(allowed_file("scan.png"));
        assert!(allowed_file("scan.JPG"));
        assert!(allowed_file("scan.Jpeg"));
        assert!(allowed_file("a.b.jpeg"));
    }

    #[test]
    fn rejected_extensions_and_dotless() {
        assert!(!allowed_file("scan.gif"));
        assert!(!allowed_file("scan.pdf"));
        assert!(!allowed_file("scan"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn sanitize_strips_paths_and_odd_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my scan (1).png"), "my_scan__1_.png");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    fn scratch_store(name: &str, policy: RetentionPolicy) -> UploadStore {
        let dir = std::env::temp_dir().join(format!("neuroscan-store-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        UploadStore::new(dir, policy).unwrap()
    }

    #[test]
    fn save_prefixes_timestamp() {
        let store = scratch_store("save", RetentionPolicy::default());
        let stored = store.save("brain.png", b"fake").unwrap();
        assert!(stored.path.exists());
        assert!(stored.file_name.ends_with("_brain.png"));
        let prefix = stored.file_name.split('_').next().unwrap();
        assert!(prefix.parse::<u64>().is_ok());
    }

    #[test]
    fn save_rejects_bad_extension() {
        let store = scratch_store("reject", RetentionPolicy::default());
        assert!(matches!(
            store.save("notes.txt", b"x"),
            Err(ScanError::Validation(_))
        ));
    }

    #[test]
    fn sweep_enforces_max_count() {
        let store = scratch_store(
            "count",
            RetentionPolicy {
                max_age: None,
                max_count: Some(2),
            },
        );
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            std::fs::write(store.path_for(name), b"x").unwrap();
        }
        store.sweep().unwrap();
        let remaining = std::fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(remaining, 2);
    }
}
