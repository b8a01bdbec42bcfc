//! Error types for the schema model, encoding and document protocol

use std::io;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a schema cannot be constructed
///
/// Dataset schema checks run in a fixed order (null or empty input, index
/// contiguity, name uniqueness, target bounds), so the same malformed input
/// always reports the same kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The list of field schemas was absent
    #[error("field schemas should not be null")]
    NullFields,

    /// A field was given a blank name
    #[error("field name should not be null nor empty (field index {index})")]
    EmptyFieldName {
        /// Index the field was declared with
        index: usize,
    },

    /// A field was given a negative index
    #[error("field index should be non negative, found {index} for field [{name}]")]
    NegativeFieldIndex {
        /// Name of the offending field
        name: String,
        /// The declared index
        index: i64,
    },

    /// Field indices are not exactly `0..len`, in order
    #[error("field schemas must be sorted by increasing index with no duplicated nor missing elements: position {position} holds index {found}")]
    NonContiguousIndices {
        /// Position in the field list where the sequence breaks
        position: usize,
        /// Index found at that position
        found: usize,
    },

    /// Two fields share a name
    #[error("field schemas should have unique names, [{name}] is repeated")]
    DuplicateNames {
        /// The repeated name
        name: String,
    },

    /// The target index does not point at a field
    #[error("target index should be a valid index: {index} is out of bounds for {len} fields")]
    TargetIndexOutOfBounds {
        /// The requested target index
        index: i64,
        /// Number of fields in the schema
        len: usize,
    },
}

/// Error type for schema, encoding and document operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while reading or writing a schema document
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Schema construction failed
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// The document is not valid JSON or does not have the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document names a value schema type outside the supported set
    #[error("A unknown field type [{0}] was found")]
    UnsupportedValueSchemaType(String),

    /// The document is well-formed JSON but misses required content
    #[error("Malformed schema document: {0}")]
    MalformedDocument(String),

    /// An index does not address an element of the target collection
    #[error("Index out of range: {index} is not in [0, {len})")]
    IndexOutOfRange {
        /// The requested index
        index: i64,
        /// Number of addressable elements
        len: usize,
    },

    /// A value was read through the wrong accessor for its field type
    #[error("Data type mismatch: {0}")]
    TypeMismatch(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A model could not be loaded
    #[error("Model loading failed: {0}")]
    ModelLoading(String),

    /// A model could not be trained
    #[error("Model training failed: {0}")]
    ModelTraining(String),
}

impl Error {
    /// Returns the schema construction failure behind this error, if any
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            Error::Schema(err) => Some(err),
            _ => None,
        }
    }
}
