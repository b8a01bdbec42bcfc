//! Model directory layout

use std::path::{Path, PathBuf};

/// Default name of the folder holding the model artifact
pub const MODEL_FOLDER: &str = "model";

/// Default name of the persisted schema document
pub const SCHEMA_FILE: &str = "model.json";

/// Where a model and its schema live inside a model directory
///
/// ```text
/// <root>/
///   model.json      schema document
///   model/
///     <artifact>    exactly one file
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLayout {
    /// Subfolder holding the single model artifact
    pub model_folder: String,

    /// Schema document file name, directly under the root
    pub schema_file: String,
}

impl Default for ModelLayout {
    fn default() -> Self {
        Self {
            model_folder: MODEL_FOLDER.to_string(),
            schema_file: SCHEMA_FILE.to_string(),
        }
    }
}

impl ModelLayout {
    /// Folder holding the model artifact
    pub fn model_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.model_folder)
    }

    /// Path of the schema document
    pub fn schema_path(&self, root: &Path) -> PathBuf {
        root.join(&self.schema_file)
    }
}
