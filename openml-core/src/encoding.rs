//! Conversion between raw field values and their canonical encoding
//!
//! Numeric and categorical fields are encoded as `f64` (a categorical value
//! becomes its position among the schema's nominal values), string fields
//! keep their text. Encoding never fails on bad input: unparsable or unknown
//! values coalesce to `NaN`, or to a missing string, because it runs once per
//! value over large and possibly dirty datasets. Decoding a category index is
//! a diagnostic operation and reports out-of-range indices as errors.

use std::borrow::Cow;
use std::collections::HashMap;

use static_assertions::assert_impl_all;
use tracing::trace;

use crate::error::{Error, Result};
use crate::instance::EncodedInstance;
use crate::schema::{CategoricalValueSchema, DatasetSchema, ValueSchema};

/// A value as produced by a data source, before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<'a> {
    /// No value present
    Missing,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    ///
    /// Its string form keeps a fractional part (`1.0`, not `1`) and writes
    /// large or tiny magnitudes as `1.0E20`, matching how JVM producers
    /// print nominal values.
    Float(f64),

    /// Text value
    Text(Cow<'a, str>),
}

impl RawValue<'_> {
    /// Check if this is the missing value
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    /// String form of the value, `None` when missing
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Missing => None,
            RawValue::Bool(value) => Some(Cow::Owned(value.to_string())),
            RawValue::Int(value) => Some(Cow::Owned(value.to_string())),
            RawValue::Float(value) => Some(Cow::Owned(float_text(*value))),
            RawValue::Text(value) => Some(Cow::Borrowed(&**value)),
        }
    }

    /// Numeric reading of the value, `NaN` when there is none
    fn to_f64(&self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            RawValue::Int(value) => *value as f64,
            RawValue::Float(value) => *value,
            RawValue::Text(value) => value.trim().parse().unwrap_or(f64::NAN),
            RawValue::Missing | RawValue::Bool(_) => f64::NAN,
        }
    }
}

fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        return if text.contains('.') { text } else { format!("{text}.0") };
    }

    // `1e20` -> `1.0E20`, `1.5e-5` -> `1.5E-5`
    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => scientific,
    }
}

impl From<f64> for RawValue<'_> {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<f32> for RawValue<'_> {
    fn from(value: f32) -> Self {
        RawValue::Float(f64::from(value))
    }
}

impl From<i64> for RawValue<'_> {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue<'_> {
    fn from(value: i32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<bool> for RawValue<'_> {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(value: &'a str) -> Self {
        RawValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for RawValue<'_> {
    fn from(value: String) -> Self {
        RawValue::Text(Cow::Owned(value))
    }
}

impl<'a, T> From<Option<T>> for RawValue<'a>
where
    T: Into<RawValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Missing, Into::into)
    }
}

/// The canonical representation of one field value
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    /// Numeric or categorical value, `NaN` when missing
    Numeric(f64),

    /// String value, `None` when missing
    Text(Option<String>),
}

impl EncodedValue {
    /// The numeric value, if this is a numeric encoding
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EncodedValue::Numeric(value) => Some(*value),
            EncodedValue::Text(_) => None,
        }
    }

    /// The text, if this is a present string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EncodedValue::Text(value) => value.as_deref(),
            EncodedValue::Numeric(_) => None,
        }
    }

    /// Whether this is the missing sentinel of its kind
    pub fn is_missing(&self) -> bool {
        match self {
            EncodedValue::Numeric(value) => value.is_nan(),
            EncodedValue::Text(value) => value.is_none(),
        }
    }
}

/// Encoder for the values of a single field
#[derive(Debug, Clone)]
pub enum FieldEncoder {
    /// Parses values as `f64`
    Numeric,

    /// Maps labels to their canonical position
    Categorical(HashMap<String, usize>),

    /// Keeps the string form of values
    String,
}

impl FieldEncoder {
    /// Build the encoder matching a value schema
    pub fn for_schema(value_schema: &ValueSchema) -> Self {
        match value_schema {
            ValueSchema::Numeric { .. } => FieldEncoder::Numeric,
            ValueSchema::Categorical(categorical) => FieldEncoder::Categorical(conversion_map(categorical)),
            ValueSchema::String { .. } => FieldEncoder::String,
        }
    }

    /// Encode a single value, coalescing anything unusable to the missing sentinel
    pub fn encode(&self, value: &RawValue<'_>) -> EncodedValue {
        match self {
            FieldEncoder::Numeric => EncodedValue::Numeric(value.to_f64()),
            FieldEncoder::Categorical(positions) => {
                let position = value
                    .to_text()
                    .and_then(|label| positions.get(&*label).copied());
                #[allow(clippy::cast_precision_loss)]
                let encoded = position.map_or(f64::NAN, |position| position as f64);
                EncodedValue::Numeric(encoded)
            }
            FieldEncoder::String => EncodedValue::Text(value.to_text().map(Cow::into_owned)),
        }
    }
}

/// Label to position lookup over a categorical schema
///
/// Used for repeated target label lookups. Unknown labels are reported as
/// `None`, not as errors.
#[derive(Debug, Clone)]
pub struct ClassIndex {
    positions: HashMap<String, usize>,
}

impl ClassIndex {
    /// Build the lookup for a categorical schema
    pub fn new(schema: &CategoricalValueSchema) -> Self {
        Self {
            positions: conversion_map(schema),
        }
    }

    /// Position of a label
    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Number of known labels
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if there are no labels
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn conversion_map(schema: &CategoricalValueSchema) -> HashMap<String, usize> {
    schema
        .nominal_values()
        .iter()
        .enumerate()
        .map(|(position, label)| (label.clone(), position))
        .collect()
}

/// Per-field encoders for a dataset schema
///
/// Built once per schema and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EncodingHelper {
    encoders: Vec<FieldEncoder>,
}

assert_impl_all!(EncodingHelper: Send, Sync);
assert_impl_all!(ClassIndex: Send, Sync);

impl EncodingHelper {
    /// Create the encoders for every field of a schema
    pub fn new(schema: &DatasetSchema) -> Self {
        let encoders = schema
            .fields()
            .iter()
            .map(|field| FieldEncoder::for_schema(field.value_schema()))
            .collect::<Vec<_>>();
        trace!(fields = encoders.len(), "created encoding helper");

        Self { encoders }
    }

    /// Number of fields this helper encodes
    pub fn number_fields(&self) -> usize {
        self.encoders.len()
    }

    /// Get the encoder of a field
    pub fn encoder(&self, field_index: usize) -> Option<&FieldEncoder> {
        self.encoders.get(field_index)
    }

    /// Encode a value for the field at `field_index`
    ///
    /// Only an invalid field index is an error; bad values coalesce to the
    /// field's missing sentinel.
    pub fn encode<'a>(&self, value: impl Into<RawValue<'a>>, field_index: usize) -> Result<EncodedValue> {
        let encoder = self.encoder(field_index).ok_or(Error::IndexOutOfRange {
            index: i64::try_from(field_index).unwrap_or(i64::MAX),
            len: self.encoders.len(),
        })?;

        Ok(encoder.encode(&value.into()))
    }

    /// Encode a full row, one value per field in index order
    pub fn encode_row<'a, I>(&self, values: I) -> Result<EncodedInstance>
    where
        I: IntoIterator,
        I::Item: Into<RawValue<'a>>,
    {
        let mut encoded = Vec::with_capacity(self.encoders.len());
        for (position, value) in values.into_iter().enumerate() {
            let encoder = self.encoders.get(position).ok_or_else(|| {
                Error::InvalidArgument(format!("row has more than {} values", self.encoders.len()))
            })?;
            encoded.push(encoder.encode(&value.into()));
        }

        if encoded.len() != self.encoders.len() {
            return Err(Error::InvalidArgument(format!(
                "row has {} values but the schema has {} fields",
                encoded.len(),
                self.encoders.len()
            )));
        }

        Ok(EncodedInstance::new(encoded))
    }

    /// Encode many rows in parallel
    #[cfg(feature = "parallel")]
    pub fn encode_rows_par(&self, rows: &[Vec<RawValue<'_>>]) -> Result<Vec<EncodedInstance>> {
        use rayon::prelude::*;

        rows.par_iter()
            .map(|row| self.encode_row(row.iter().cloned()))
            .collect()
    }

    /// Map an encoded category back to its label
    ///
    /// The value is truncated towards zero to obtain the category position.
    pub fn decode_category(value: f64, schema: &CategoricalValueSchema) -> Result<&str> {
        let out_of_range = |index: i64| Error::IndexOutOfRange {
            index,
            len: schema.len(),
        };

        if value.is_nan() {
            return Err(out_of_range(i64::MIN));
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = value.trunc() as i64;
        usize::try_from(index)
            .ok()
            .and_then(|position| schema.value_at(position))
            .ok_or_else(|| out_of_range(index))
    }

    /// Build a label to position lookup for a categorical target
    pub fn class_to_index(schema: &CategoricalValueSchema) -> ClassIndex {
        ClassIndex::new(schema)
    }
}
