//! Instance accessor contract and the encoded row type

use crate::encoding::EncodedValue;
use crate::error::{Error, Result};
use crate::schema::DatasetSchema;

/// A single row of a dataset
///
/// Numeric and categorical fields are read with [`Instance::value`]
/// (categorical fields yield the category position as `f64`), string fields
/// with [`Instance::string_value`]. Reading a field through the other
/// accessor is a [`Error::TypeMismatch`].
pub trait Instance: Send + Sync {
    /// Numeric view of the field at `index`, `NaN` when missing
    fn value(&self, index: usize) -> Result<f64>;

    /// Text of the string field at `index`, `None` when missing
    fn string_value(&self, index: usize) -> Result<Option<&str>>;
}

/// A row of encoded values, one per field in index order
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInstance {
    values: Vec<EncodedValue>,
}

impl EncodedInstance {
    /// Create an instance from encoded values
    pub fn new(values: Vec<EncodedValue>) -> Self {
        Self { values }
    }

    /// Create an instance holding only numeric values
    pub fn from_numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(EncodedValue::Numeric).collect())
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the instance holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The encoded values
    pub fn values(&self) -> &[EncodedValue] {
        &self.values
    }

    fn get(&self, index: usize) -> Result<&EncodedValue> {
        self.values.get(index).ok_or(Error::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len: self.values.len(),
        })
    }
}

impl Instance for EncodedInstance {
    fn value(&self, index: usize) -> Result<f64> {
        match self.get(index)? {
            EncodedValue::Numeric(value) => Ok(*value),
            EncodedValue::Text(_) => Err(Error::TypeMismatch(format!(
                "field {index} holds a string, read it with string_value"
            ))),
        }
    }

    fn string_value(&self, index: usize) -> Result<Option<&str>> {
        match self.get(index)? {
            EncodedValue::Text(value) => Ok(value.as_deref()),
            EncodedValue::Numeric(_) => Err(Error::TypeMismatch(format!(
                "field {index} holds a number, read it with value"
            ))),
        }
    }
}

/// Encoded value of the target field
///
/// Fails with [`Error::InvalidArgument`] when the schema has no target.
pub fn class_value(instance: &dyn Instance, schema: &DatasetSchema) -> Result<f64> {
    let target = schema
        .target_index()
        .ok_or_else(|| Error::InvalidArgument("the dataset schema has no target field".into()))?;

    instance.value(target)
}

/// Whether the target value of the instance is missing
pub fn is_missing_class(instance: &dyn Instance, schema: &DatasetSchema) -> Result<bool> {
    class_value(instance, schema).map(f64::is_nan)
}

/// Whether the numeric value at `index` is missing
pub fn is_missing(instance: &dyn Instance, index: usize) -> Result<bool> {
    instance.value(index).map(f64::is_nan)
}
