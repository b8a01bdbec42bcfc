//! Model directory, schema document and validation utilities for ML providers
//!
//! This crate builds on `openml-core` with the file system side of the
//! contract: locating the model artifact inside a model directory, reading
//! and writing the `model.json` schema document next to it, and the
//! validations providers run before loading or training a model.

#![warn(missing_docs)]

mod error;

pub mod classification;
pub mod layout;
pub mod load;
pub mod validate;

pub use classification::{num_class_values, num_class_values_of, with_categorical};
pub use error::{Error, Result};
pub use layout::{ModelLayout, MODEL_FOLDER, SCHEMA_FILE};
pub use load::{load_schema, model_file_path, save_schema, value_schema_type_name};
pub use validate::{
    check_no_fields_of_type, check_params, probe_instance, validate_categorical_schema,
    validate_classification_model, validate_model_in_dir, validate_model_path_to_train,
    validate_params_model_to_load,
};
