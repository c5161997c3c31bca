//! Jupyter notebook Colab patcher
//!
//! Rewrites the training notebook so it runs on Google Colab: a Drive-mount
//! setup cell is inserted at the top, and directory creation is injected
//! before the augmentation call that assumes the directories exist.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::{Result, ScanError};

/// Marker locating the cell that needs directory creation injected.
const AUGMENT_MARKER: &str = "augmented_data(file_dir=yes_path";

fn colab_setup_cell(drive_path: &str) -> Value {
    json!({
        "cell_type": "code",
        "execution_count": null,
        "metadata": {},
        "outputs": [],
        "source": [
            "# Mount Google Drive\n",
            "from google.colab import drive\n",
            "drive.mount('/content/drive')\n",
            "\n",
            "import shutil\n",
            "import os\n",
            "\n",
            "# Define source path in Drive (User needs to upload archive_1.zip here)\n",
            format!("drive_path = '{drive_path}'\n"),
            "\n",
            "# Copy to local Colab environment\n",
            "if os.path.exists(drive_path):\n",
            "    print(f\"Copying {drive_path} to local runtime...\")\n",
            "    shutil.copy(drive_path, 'archive_1.zip')\n",
            "    print(\"Copy complete.\")\n",
            "else:\n",
            "    print(f\"File not found at {drive_path}. Please check the path.\")\n"
        ]
    })
}

const MKDIR_LINES: &[&str] = &[
    "import os\n",
    "os.makedirs('augmented_data/yes', exist_ok=True)\n",
    "os.makedirs('augmented_data/no', exist_ok=True)\n",
    "print(\"Created augmented_data directories.\")\n",
    "\n",
];

/// Patch the notebook at `input` and write the Colab variant to `output`.
pub fn patch_notebook(input: &Path, output: &Path, drive_path: &str) -> Result<()> {
    let raw = std::fs::read_to_string(input)?;
    let mut notebook: Value = serde_json::from_str(&raw)?;

    let cells = notebook
        .get_mut("cells")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| ScanError::Validation("notebook has no cells array".into()))?;

    cells.insert(0, colab_setup_cell(drive_path));

    // Inject directory creation before the first augmentation call.
    let mut patched_augment = false;
    for cell in cells.iter_mut() {
        if cell.get("cell_type").and_then(Value::as_str) != Some("code") {
            continue;
        }
        let Some(source) = cell.get("source").and_then(Value::as_array) else {
            continue;
        };
        let joined: String = source
            .iter()
            .filter_map(Value::as_str)
            .collect();
        if joined.contains(AUGMENT_MARKER) {
            let mut new_source: Vec<Value> =
                MKDIR_LINES.iter().map(|l| json!(l)).collect();
            new_source.extend(source.iter().cloned());
            cell["source"] = Value::Array(new_source);
            patched_augment = true;
            break;
        }
    }

    std::fs::write(output, serde_json::to_string_pretty(&notebook)?)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        patched_augment,
        "Wrote Colab notebook"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notebook() -> Value {
        json!({
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": ["# Training\n"]},
                {
                    "cell_type": "code",
                    "execution_count": null,
                    "metadata": {},
                    "outputs": [],
                    "source": ["augmented_data(file_dir=yes_path, n_generated_samples=6)\n"]
                }
            ],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        })
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("neuroscan-notebook-test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn inserts_mount_cell_first() {
        let input = scratch("in.ipynb");
        let output = scratch("out.ipynb");
        std::fs::write(&input, sample_notebook().to_string()).unwrap();

        patch_notebook(&input, &output, "/content/drive/MyDrive/archive_1.zip").unwrap();

        let patched: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let cells = patched["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 3);
        let first = cells[0]["source"].as_array().unwrap();
        assert!(first
            .iter()
            .any(|l| l.as_str().unwrap().contains("drive.mount")));
    }

    #[test]
    fn injects_mkdir_before_augmentation() {
        let input = scratch("in2.ipynb");
        let output = scratch("out2.ipynb");
        std::fs::write(&input, sample_notebook().to_string()).unwrap();

        patch_notebook(&input, &output, "/content/drive/MyDrive/archive_1.zip").unwrap();

        let patched: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let augment = patched["cells"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["source"].to_string().contains(AUGMENT_MARKER))
            .unwrap();
        let source = augment["source"].as_array().unwrap();
        assert!(source[0].as_str().unwrap().starts_with("import os"));
        assert!(source
            .iter()
            .any(|l| l.as_str().unwrap().contains("os.makedirs")));
    }

    #[test]
    fn missing_cells_is_validation_error() {
        let input = scratch("bad.ipynb");
        std::fs::write(&input, "{}").unwrap();
        assert!(matches!(
            patch_notebook(&input, &scratch("bad_out.ipynb"), "/x"),
            Err(ScanError::Validation(_))
        ));
    }
}
