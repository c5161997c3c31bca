//! Class label mapping
//!
//! Loads a `{name: index}` JSON file produced by the training pipeline and
//! inverts it into an index -> display-name table. When the file is missing
//! or unparsable the map degrades to the four known tumor classes rather
//! than failing startup.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

/// Read-only mapping from class index to human-readable label.
#[derive(Debug, Clone)]
pub struct LabelMap {
    names: HashMap<usize, String>,
}

impl LabelMap {
    /// Load from a `{name: index}` JSON file, falling back to the builtin
    /// four-class mapping if the file is absent or invalid.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Label map unavailable, using fallback labels");
                Self::fallback()
            }
        }
    }

    fn try_load(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: HashMap<String, usize> = serde_json::from_str(&raw)?;
        if parsed.is_empty() {
            return Err(crate::ScanError::LabelMap("empty label map".into()));
        }
        let names = parsed
            .into_iter()
            .map(|(name, idx)| (idx, name.replace('_', " ")))
            .collect();
        Ok(Self { names })
    }

    /// The hardcoded mapping used when no label map file is available.
    pub fn fallback() -> Self {
        let names = [
            (0, "Glioma".to_string()),
            (1, "Meningioma".to_string()),
            (2, "No Tumor".to_string()),
            (3, "Pituitary".to_string()),
        ]
        .into_iter()
        .collect();
        Self { names }
    }

    /// Resolve an output index to a display name. Unmapped indices get a
    /// synthesized `Class_<idx>` name so a mismatched model still reports
    /// something actionable.
    pub fn name(&self, idx: usize) -> String {
        self.names
            .get(&idx)
            .cloned()
            .unwrap_or_else(|| format!("Class_{idx}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_four_classes() {
        let map = LabelMap::fallback();
        assert_eq!(map.len(), 4);
        assert_eq!(map.name(0), "Glioma");
        assert_eq!(map.name(2), "No Tumor");
    }

    #[test]
    fn missing_file_degrades_to_fallback() {
        let map = LabelMap::load(Path::new("/nonexistent/label_map.json"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn unmapped_index_synthesizes_name() {
        let map = LabelMap::fallback();
        assert_eq!(map.name(7), "Class_7");
    }

    #[test]
    fn loads_and_inverts_json() {
        let dir = std::env::temp_dir().join("neuroscan-label-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("label_map.json");
        std::fs::write(&path, r#"{"no_tumor": 0, "glioma": 1}"#).unwrap();
        let map = LabelMap::load(&path);
        assert_eq!(map.name(0), "no tumor");
        assert_eq!(map.name(1), "glioma");
    }
}
