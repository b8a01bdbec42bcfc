//! Schema definition for datasets exchanged with ML providers
//!
//! A [`DatasetSchema`] is an ordered list of [`FieldSchema`]s plus an optional
//! target field. Every field carries a [`ValueSchema`] describing which values
//! it accepts. All three are immutable once built and can be shared freely
//! between threads.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use crate::document::{DatasetSchemaDocument, FieldSchemaDocument, ValueSchemaDocument};
use crate::error::SchemaError;

/// Type tag of a value schema, as written in schema documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSchemaKind {
    /// Floating point values
    Numeric,

    /// One of a closed set of labels
    Categorical,

    /// Free-form text
    String,
}

impl ValueSchemaKind {
    /// Tag used for this kind in schema documents
    pub fn as_str(self) -> &'static str {
        match self {
            ValueSchemaKind::Numeric => "numeric",
            ValueSchemaKind::Categorical => "categorical",
            ValueSchemaKind::String => "string",
        }
    }

    /// Parse a document tag, `None` for anything outside the supported set
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "numeric" => Some(ValueSchemaKind::Numeric),
            "categorical" => Some(ValueSchemaKind::Categorical),
            "string" => Some(ValueSchemaKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for ValueSchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value schema of a categorical field
///
/// Nominal values are kept sorted and deduplicated. The position of a value in
/// that order is its encoded representation, so the order is part of the
/// contract and never depends on the order values were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoricalValueSchema {
    allow_missing: bool,
    nominal_values: Vec<String>,
}

impl CategoricalValueSchema {
    /// Create a categorical schema from any collection of labels
    pub fn new<I, S>(allow_missing: bool, nominal_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut nominal_values: Vec<String> = nominal_values.into_iter().map(Into::into).collect();
        nominal_values.sort_unstable();
        nominal_values.dedup();

        Self {
            allow_missing,
            nominal_values,
        }
    }

    /// Whether missing values are accepted
    pub fn allow_missing(&self) -> bool {
        self.allow_missing
    }

    /// The labels in canonical (lexicographic) order
    pub fn nominal_values(&self) -> &[String] {
        &self.nominal_values
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.nominal_values.len()
    }

    /// Whether the schema has no labels at all
    pub fn is_empty(&self) -> bool {
        self.nominal_values.is_empty()
    }

    /// Position of a label in canonical order
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.nominal_values
            .binary_search_by(|probe| probe.as_str().cmp(value))
            .ok()
    }

    /// Check if a label belongs to this schema
    pub fn contains(&self, value: &str) -> bool {
        self.index_of(value).is_some()
    }

    /// Label at a canonical position
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.nominal_values.get(index).map(String::as_str)
    }
}

/// Description of the values a field accepts
///
/// The set of variants is closed: documents naming any other type are
/// rejected when read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ValueSchemaDocument", try_from = "ValueSchemaDocument")]
pub enum ValueSchema {
    /// Values that parse as finite floating point numbers
    Numeric {
        /// Whether missing values are accepted
        allow_missing: bool,
    },

    /// Values drawn from a closed set of labels
    Categorical(CategoricalValueSchema),

    /// Any text
    String {
        /// Whether missing values are accepted
        allow_missing: bool,
    },
}

impl ValueSchema {
    /// Create a numeric value schema
    pub fn numeric(allow_missing: bool) -> Self {
        ValueSchema::Numeric { allow_missing }
    }

    /// Create a string value schema
    pub fn string(allow_missing: bool) -> Self {
        ValueSchema::String { allow_missing }
    }

    /// Create a categorical value schema
    pub fn categorical<I, S>(allow_missing: bool, nominal_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueSchema::Categorical(CategoricalValueSchema::new(allow_missing, nominal_values))
    }

    /// Whether missing values are accepted
    pub fn allow_missing(&self) -> bool {
        match self {
            ValueSchema::Numeric { allow_missing } | ValueSchema::String { allow_missing } => *allow_missing,
            ValueSchema::Categorical(categorical) => categorical.allow_missing(),
        }
    }

    /// The type tag of this schema
    pub fn kind(&self) -> ValueSchemaKind {
        match self {
            ValueSchema::Numeric { .. } => ValueSchemaKind::Numeric,
            ValueSchema::Categorical(_) => ValueSchemaKind::Categorical,
            ValueSchema::String { .. } => ValueSchemaKind::String,
        }
    }

    /// Get the categorical details, if this is a categorical schema
    pub fn as_categorical(&self) -> Option<&CategoricalValueSchema> {
        match self {
            ValueSchema::Categorical(categorical) => Some(categorical),
            _ => None,
        }
    }

    /// Validate the textual representation of a value against this schema
    ///
    /// `None` is the missing value. It is accepted only when the schema allows
    /// missing values, whatever the variant. An empty string is a present
    /// value and is validated like any other text.
    pub fn validate(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return self.allow_missing();
        };

        match self {
            ValueSchema::Numeric { .. } => value
                .trim()
                .parse::<f64>()
                .map_or(false, f64::is_finite),
            ValueSchema::Categorical(categorical) => categorical.contains(value),
            ValueSchema::String { .. } => true,
        }
    }
}

impl From<CategoricalValueSchema> for ValueSchema {
    fn from(categorical: CategoricalValueSchema) -> Self {
        ValueSchema::Categorical(categorical)
    }
}

impl fmt::Display for ValueSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = if self.allow_missing() { "nullable" } else { "non-nullable" };
        match self {
            ValueSchema::Categorical(categorical) => {
                write!(f, "categorical{{{}}} ({})", categorical.nominal_values.join(", "), missing)
            }
            other => write!(f, "{} ({})", other.kind(), missing),
        }
    }
}

/// A named, positioned field of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "FieldSchemaDocument", try_from = "FieldSchemaDocument")]
pub struct FieldSchema {
    name: String,
    index: usize,
    value_schema: ValueSchema,
}

impl FieldSchema {
    /// Create a new field
    ///
    /// Fails when the name is empty or only whitespace.
    pub fn new(name: impl Into<String>, index: usize, value_schema: ValueSchema) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyFieldName { index });
        }

        Ok(Self {
            name,
            index,
            value_schema,
        })
    }

    /// Get the name of this field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the zero-based position of this field
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the value schema of this field
    pub fn value_schema(&self) -> &ValueSchema {
        &self.value_schema
    }

    /// Validate a textual value against this field's value schema
    pub fn validate(&self, value: Option<&str>) -> bool {
        self.value_schema.validate(value)
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.index, self.name, self.value_schema)
    }
}

/// A schema describing a dataset's fields and its optional target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "DatasetSchemaDocument", try_from = "DatasetSchemaDocument")]
pub struct DatasetSchema {
    /// Fields, stored in index order
    fields: Vec<FieldSchema>,

    /// Position of the field to predict, absent for unlabeled data
    target_index: Option<usize>,

    /// Field positions by name for faster lookup
    field_indices: HashMap<String, usize>,
}

assert_impl_all!(DatasetSchema: Send, Sync);
assert_impl_all!(ValueSchema: Send, Sync);

impl DatasetSchema {
    /// Create a new schema
    ///
    /// The field at position `i` must declare index `i`, names must be unique
    /// and the target, when given, must address one of the fields.
    pub fn new(fields: Vec<FieldSchema>, target_index: Option<usize>) -> Result<Self, SchemaError> {
        let target_index = target_index.map(|index| i64::try_from(index).unwrap_or(i64::MAX));
        Self::checked(fields, target_index)
    }

    /// Create a schema for a dataset without a target field
    pub fn unsupervised(fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        Self::new(fields, None)
    }

    /// Start building a schema field by field
    pub fn builder() -> DatasetSchemaBuilder {
        DatasetSchemaBuilder::new()
    }

    /// Shared construction path for programmatic and document input
    pub(crate) fn checked(fields: Vec<FieldSchema>, target_index: Option<i64>) -> Result<Self, SchemaError> {
        let mut gap = None;
        let mut duplicate = None;
        let mut names = HashSet::with_capacity(fields.len());

        for (position, field) in fields.iter().enumerate() {
            if gap.is_none() && field.index != position {
                gap = Some(SchemaError::NonContiguousIndices {
                    position,
                    found: field.index,
                });
            }
            if duplicate.is_none() && !names.insert(field.name.as_str()) {
                duplicate = Some(SchemaError::DuplicateNames {
                    name: field.name.clone(),
                });
            }
        }

        if let Some(err) = gap.or(duplicate) {
            return Err(err);
        }

        let target_index = match target_index {
            None => None,
            Some(index) => match usize::try_from(index) {
                Ok(index) if index < fields.len() => Some(index),
                _ => {
                    return Err(SchemaError::TargetIndexOutOfBounds {
                        index,
                        len: fields.len(),
                    })
                }
            },
        };

        let field_indices = fields
            .iter()
            .map(|field| (field.name.clone(), field.index))
            .collect();

        Ok(Self {
            fields,
            target_index,
            field_indices,
        })
    }

    /// Get all fields in index order
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Get a field by index
    pub fn field(&self, index: usize) -> Option<&FieldSchema> {
        self.fields.get(index)
    }

    /// Get a field by name
    pub fn field_by_name(&self, name: &str) -> Option<&FieldSchema> {
        self.index_of(name).map(|index| &self.fields[index])
    }

    /// Get the index of a field by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// Get the number of fields in this schema
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if this schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the target field, if the dataset is labeled
    pub fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    /// The target field, if the dataset is labeled
    pub fn target_field(&self) -> Option<&FieldSchema> {
        self.target_index.map(|index| &self.fields[index])
    }

    /// All fields except the target, in index order
    pub fn predictive_fields(&self) -> impl Iterator<Item = &FieldSchema> + '_ {
        self.fields
            .iter()
            .filter(move |field| Some(field.index) != self.target_index)
    }
}

impl PartialEq for DatasetSchema {
    fn eq(&self, other: &Self) -> bool {
        self.target_index == other.target_index && self.fields == other.fields
    }
}

impl Eq for DatasetSchema {}

impl fmt::Display for DatasetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_field() {
            Some(target) => writeln!(f, "DatasetSchema: {} fields, target [{}]", self.fields.len(), target.name())?,
            None => writeln!(f, "DatasetSchema: {} fields, no target", self.fields.len())?,
        }
        for field in &self.fields {
            writeln!(f, "  {}", field)?;
        }
        Ok(())
    }
}

/// A builder for dataset schemas that assigns field indices in call order
#[derive(Debug, Default)]
pub struct DatasetSchemaBuilder {
    fields: Vec<(String, ValueSchema)>,
    target_index: Option<usize>,
}

impl DatasetSchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field with the given value schema
    pub fn field(mut self, name: impl Into<String>, value_schema: ValueSchema) -> Self {
        self.fields.push((name.into(), value_schema));
        self
    }

    /// Append a numeric field
    pub fn numeric(self, name: impl Into<String>, allow_missing: bool) -> Self {
        self.field(name, ValueSchema::numeric(allow_missing))
    }

    /// Append a string field
    pub fn string(self, name: impl Into<String>, allow_missing: bool) -> Self {
        self.field(name, ValueSchema::string(allow_missing))
    }

    /// Append a categorical field
    pub fn categorical<I, S>(self, name: impl Into<String>, allow_missing: bool, nominal_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field(name, ValueSchema::categorical(allow_missing, nominal_values))
    }

    /// Mark the field at `index` as the target
    pub fn target(mut self, index: usize) -> Self {
        self.target_index = Some(index);
        self
    }

    /// Build the schema, running every dataset schema check
    pub fn build(self) -> Result<DatasetSchema, SchemaError> {
        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, value_schema))| FieldSchema::new(name, index, value_schema))
            .collect::<Result<Vec<_>, _>>()?;

        DatasetSchema::new(fields, self.target_index)
    }
}
