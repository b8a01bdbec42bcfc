//! Helpers for schemas with a categorical target

use openml_core::{CategoricalValueSchema, DatasetSchema, ValueSchema};

use crate::error::{Error, Result};

/// Apply `block` to the value schema if it is categorical
pub fn with_categorical<T>(value_schema: &ValueSchema, block: impl FnOnce(&CategoricalValueSchema) -> T) -> Option<T> {
    value_schema.as_categorical().map(block)
}

/// Number of classes of a categorical target value schema
pub fn num_class_values_of(target: &ValueSchema) -> Result<usize> {
    with_categorical(target, CategoricalValueSchema::len).ok_or_else(|| Error::NotCategorical(target.to_string()))
}

/// Number of classes of the schema's target, `None` when there is no target
pub fn num_class_values(schema: &DatasetSchema) -> Result<Option<usize>> {
    schema
        .target_field()
        .map(|target| num_class_values_of(target.value_schema()))
        .transpose()
}
