//! Locating model artifacts and loading or saving their schema document

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use openml_core::{DatasetSchema, JsonWriteOptions, ValueSchema};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::layout::ModelLayout;

impl ModelLayout {
    /// Locate the single model artifact under `root`
    ///
    /// Every problem with the layout is reported in one pass: a missing or
    /// unreadable model folder, a folder not holding exactly one entry,
    /// entries that are directories and files that cannot be opened.
    pub fn inspect(&self, root: &Path) -> std::result::Result<PathBuf, Vec<String>> {
        if !root.is_dir() {
            return Err(vec![format!("The path [{}] should be a directory", root.display())]);
        }

        let model_dir = self.model_dir(root);
        if !model_dir.is_dir() {
            return Err(vec![format!("The path [{}] should be a directory", model_dir.display())]);
        }

        let mut entries = match list_dir(&model_dir) {
            Ok(entries) => entries,
            Err(err) => {
                return Err(vec![format!(
                    "Cannot read the contents of the directory [{}]: {err}",
                    model_dir.display()
                )])
            }
        };
        entries.sort();

        let mut problems = Vec::new();
        if entries.len() != 1 {
            problems.push(format!(
                "There should be exactly one file inside [{}], found {}",
                model_dir.display(),
                entries.len()
            ));
        }
        for entry in &entries {
            if entry.is_dir() {
                problems.push(format!("The path [{}] should be a file", entry.display()));
            } else if let Err(err) = File::open(entry) {
                problems.push(format!(
                    "Cannot open the model file for reading [{}]: {err}",
                    entry.display()
                ));
            }
        }

        match entries.pop() {
            Some(model_file) if problems.is_empty() => Ok(model_file),
            _ => Err(problems),
        }
    }

    /// Path of the single model artifact under `root`
    pub fn model_file_path(&self, root: &Path) -> Result<PathBuf> {
        self.inspect(root).map_err(|problems| {
            let message = problems.join("; ");
            error!(path = %root.display(), "{message}");
            Error::ModelLoading(message)
        })
    }

    /// Read the schema document persisted under `root`
    pub fn load_schema(&self, root: &Path) -> Result<DatasetSchema> {
        if !root.is_dir() {
            return Err(Error::ModelLoading(format!(
                "The path [{}] should be a directory",
                root.display()
            )));
        }

        let path = self.schema_path(root);
        if !path.is_file() {
            return Err(Error::ModelLoading(format!(
                "There is no {} file on the model path [{}]",
                self.schema_file,
                root.display()
            )));
        }

        let reader = BufReader::new(File::open(&path)?);
        let schema = DatasetSchema::read_json(reader).map_err(|err| {
            error!(path = %path.display(), error = %err, "could not load schema for model");
            Error::Core(err)
        })?;

        info!(path = %path.display(), fields = schema.len(), "loaded schema");
        Ok(schema)
    }

    /// Write `schema` as the schema document under `root`, creating `root` if needed
    pub fn save_schema(&self, root: &Path, schema: &DatasetSchema, options: &JsonWriteOptions) -> Result<PathBuf> {
        fs::create_dir_all(root)?;

        let path = self.schema_path(root);
        let mut writer = BufWriter::new(File::create(&path)?);
        schema.write_json(&mut writer, options)?;
        writer.flush()?;

        info!(path = %path.display(), fields = schema.len(), "saved schema");
        Ok(path)
    }
}

fn list_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect()
}

/// Path of the single model artifact under `root`, using the default layout
pub fn model_file_path(root: &Path) -> Result<PathBuf> {
    ModelLayout::default().model_file_path(root)
}

/// Read `model.json` from a model directory
pub fn load_schema(root: &Path) -> Result<DatasetSchema> {
    ModelLayout::default().load_schema(root)
}

/// Write `model.json` into a model directory
pub fn save_schema(root: &Path, schema: &DatasetSchema) -> Result<PathBuf> {
    ModelLayout::default().save_schema(root, schema, &JsonWriteOptions::default())
}

/// Type tag of a value schema, as used in schema documents and messages
pub fn value_schema_type_name(value_schema: &ValueSchema) -> &'static str {
    value_schema.kind().as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn schema() -> DatasetSchema {
        DatasetSchema::builder()
            .numeric("amount", false)
            .categorical("label", false, ["fraud", "genuine"])
            .target(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_model_file_path() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("model")).unwrap();
        fs::write(dir.path().join("model").join("weights.bin"), b"weights").unwrap();

        let path = model_file_path(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("model").join("weights.bin"));
    }

    #[test]
    fn test_missing_model_folder() {
        let dir = tempdir().unwrap();

        let problems = ModelLayout::default().inspect(dir.path()).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("should be a directory"));
    }

    #[test]
    fn test_root_is_a_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("model.bin");
        fs::write(&file, b"").unwrap();

        assert!(matches!(model_file_path(&file), Err(Error::ModelLoading(_))));
    }

    #[test]
    fn test_empty_model_folder() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("model")).unwrap();

        let problems = ModelLayout::default().inspect(dir.path()).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("exactly one file"));
    }

    #[test]
    fn test_all_problems_reported() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("model");
        fs::create_dir_all(model_dir.join("nested")).unwrap();
        fs::write(model_dir.join("weights.bin"), b"weights").unwrap();

        let problems = ModelLayout::default().inspect(dir.path()).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("exactly one file"));
        assert!(problems[1].contains("should be a file"));

        let Err(Error::ModelLoading(message)) = model_file_path(dir.path()) else {
            panic!("expected a model loading error");
        };
        assert!(message.contains("exactly one file") && message.contains("should be a file"));
    }

    #[test]
    fn test_single_nested_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("model").join("nested")).unwrap();

        let problems = ModelLayout::default().inspect(dir.path()).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("should be a file"));
    }

    #[test]
    fn test_schema_round_trip() {
        let dir = tempdir().unwrap();

        let path = save_schema(dir.path(), &schema()).unwrap();
        assert_eq!(path, dir.path().join("model.json"));
        assert_eq!(load_schema(dir.path()).unwrap(), schema());
    }

    #[test]
    fn test_custom_schema_file() {
        let dir = tempdir().unwrap();
        let layout = ModelLayout {
            schema_file: "schema.json".into(),
            ..ModelLayout::default()
        };

        layout.save_schema(dir.path(), &schema(), &JsonWriteOptions::pretty()).unwrap();
        assert!(dir.path().join("schema.json").is_file());
        assert_eq!(layout.load_schema(dir.path()).unwrap(), schema());
        assert!(matches!(load_schema(dir.path()), Err(Error::ModelLoading(_))));
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = tempdir().unwrap();

        let Err(Error::ModelLoading(message)) = load_schema(dir.path()) else {
            panic!("expected a model loading error");
        };
        assert!(message.contains("model.json"));
    }

    #[test]
    fn test_malformed_schema_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("model.json"), "{\"fieldSchemas\": [").unwrap();

        assert!(matches!(
            load_schema(dir.path()),
            Err(Error::Core(openml_core::Error::Serialization(_)))
        ));
    }

    #[test]
    fn test_value_schema_type_name() {
        assert_eq!(value_schema_type_name(&ValueSchema::numeric(true)), "numeric");
        assert_eq!(value_schema_type_name(&ValueSchema::string(true)), "string");
        assert_eq!(value_schema_type_name(&ValueSchema::categorical(true, ["a"])), "categorical");
    }
}
