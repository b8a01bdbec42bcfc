//! Core schema model, encoding and model contracts for exchanging tabular data
//!
//! This crate defines the contract shared by data producers and machine
//! learning model providers that do not share a runtime: the
//! [`DatasetSchema`] graph with its construction-time invariants, the
//! canonical numeric encoding of field values, and the self-describing JSON
//! document a schema is persisted as.

#![warn(missing_docs)]

pub mod dataset;
pub mod document;
pub mod encoding;
pub mod error;
pub mod instance;
pub mod model;
pub mod params;
pub mod schema;

// Re-export key types for convenience
pub use dataset::{Dataset, DatasetBuilder, FeatureValues, InMemoryDataset, PartitionedDataset};
pub use document::JsonWriteOptions;
pub use encoding::{ClassIndex, EncodedValue, EncodingHelper, FieldEncoder, RawValue};
pub use error::{Error, Result, SchemaError};
pub use instance::{EncodedInstance, Instance};
pub use model::{
    ClassificationModel, MachineLearningModel, MachineLearningProvider, ModelExplainer, ModelLoader, ModelTrainer,
    Params,
};
pub use params::{
    AlgorithmDescriptor, AlgorithmType, ChoiceParameter, ModelParameter, NumericKind, NumericParameter,
    ParamValidationError, ParameterKind,
};
pub use schema::{
    CategoricalValueSchema, DatasetSchema, DatasetSchemaBuilder, FieldSchema, ValueSchema, ValueSchemaKind,
};
