//! Schema documents: the persisted JSON shape of a dataset schema
//!
//! Document types mirror the wire layout field for field and are kept apart
//! from the runtime schema types. Reading a document rebuilds the schema
//! bottom-up through the regular constructors, so a tampered document fails
//! with the same [`SchemaError`] a malformed programmatic schema would.
//!
//! ```json
//! {
//!   "targetIndex": 1,
//!   "fieldSchemas": [
//!     {"fieldIndex": 0, "fieldName": "amount",
//!      "valueSchema": {"@type": "numeric", "allowMissing": false}},
//!     {"fieldIndex": 1, "fieldName": "label",
//!      "valueSchema": {"@type": "categorical", "nominalValues": ["fraud", "genuine"], "allowMissing": false}}
//!   ]
//! }
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result, SchemaError};
use crate::schema::{CategoricalValueSchema, DatasetSchema, FieldSchema, ValueSchema, ValueSchemaKind};

/// Options for writing schema documents
#[derive(Debug, Clone, Default)]
pub struct JsonWriteOptions {
    /// Indent the output for human readers
    pub pretty: bool,
}

impl JsonWriteOptions {
    /// Options producing indented output
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Wire form of a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSchemaDocument {
    /// Type tag: `numeric`, `categorical` or `string`
    #[serde(rename = "@type")]
    pub value_type: String,

    /// Labels in canonical order, categorical schemas only
    #[serde(rename = "nominalValues", default, skip_serializing_if = "Option::is_none")]
    pub nominal_values: Option<Vec<String>>,

    /// Whether missing values are accepted
    #[serde(rename = "allowMissing")]
    pub allow_missing: bool,
}

/// Wire form of a field schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchemaDocument {
    /// Zero-based position of the field
    pub field_index: i64,

    /// Field name
    pub field_name: String,

    /// Accepted values
    pub value_schema: ValueSchemaDocument,
}

/// Wire form of a dataset schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSchemaDocument {
    /// Position of the target field, omitted for unlabeled datasets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<i64>,

    /// Field documents in index order
    #[serde(default)]
    pub field_schemas: Option<Vec<FieldSchemaDocument>>,
}

impl From<&ValueSchema> for ValueSchemaDocument {
    fn from(schema: &ValueSchema) -> Self {
        Self {
            value_type: schema.kind().as_str().to_string(),
            nominal_values: schema
                .as_categorical()
                .map(|categorical| categorical.nominal_values().to_vec()),
            allow_missing: schema.allow_missing(),
        }
    }
}

impl From<ValueSchema> for ValueSchemaDocument {
    fn from(schema: ValueSchema) -> Self {
        Self::from(&schema)
    }
}

impl TryFrom<ValueSchemaDocument> for ValueSchema {
    type Error = Error;

    fn try_from(document: ValueSchemaDocument) -> Result<Self> {
        let kind = ValueSchemaKind::from_tag(&document.value_type)
            .ok_or_else(|| Error::UnsupportedValueSchemaType(document.value_type.clone()))?;

        if kind != ValueSchemaKind::Categorical && document.nominal_values.is_some() {
            return Err(Error::MalformedDocument(format!(
                "{kind} value schema cannot carry nominalValues"
            )));
        }

        Ok(match kind {
            ValueSchemaKind::Numeric => ValueSchema::numeric(document.allow_missing),
            ValueSchemaKind::String => ValueSchema::string(document.allow_missing),
            ValueSchemaKind::Categorical => {
                let nominal_values = document.nominal_values.ok_or_else(|| {
                    Error::MalformedDocument("categorical value schema without nominalValues".into())
                })?;
                ValueSchema::Categorical(CategoricalValueSchema::new(document.allow_missing, nominal_values))
            }
        })
    }
}

impl From<&FieldSchema> for FieldSchemaDocument {
    fn from(field: &FieldSchema) -> Self {
        Self {
            field_index: i64::try_from(field.index()).unwrap_or(i64::MAX),
            field_name: field.name().to_string(),
            value_schema: field.value_schema().into(),
        }
    }
}

impl From<FieldSchema> for FieldSchemaDocument {
    fn from(field: FieldSchema) -> Self {
        Self::from(&field)
    }
}

impl TryFrom<FieldSchemaDocument> for FieldSchema {
    type Error = Error;

    fn try_from(document: FieldSchemaDocument) -> Result<Self> {
        let index = usize::try_from(document.field_index).map_err(|_| SchemaError::NegativeFieldIndex {
            name: document.field_name.clone(),
            index: document.field_index,
        })?;
        let value_schema = ValueSchema::try_from(document.value_schema)?;

        Ok(FieldSchema::new(document.field_name, index, value_schema)?)
    }
}

impl From<&DatasetSchema> for DatasetSchemaDocument {
    fn from(schema: &DatasetSchema) -> Self {
        Self {
            target_index: schema
                .target_index()
                .map(|index| i64::try_from(index).unwrap_or(i64::MAX)),
            field_schemas: Some(schema.fields().iter().map(FieldSchemaDocument::from).collect()),
        }
    }
}

impl From<DatasetSchema> for DatasetSchemaDocument {
    fn from(schema: DatasetSchema) -> Self {
        Self::from(&schema)
    }
}

impl TryFrom<DatasetSchemaDocument> for DatasetSchema {
    type Error = Error;

    fn try_from(document: DatasetSchemaDocument) -> Result<Self> {
        let fields = document
            .field_schemas
            .ok_or(SchemaError::NullFields)?
            .into_iter()
            .map(FieldSchema::try_from)
            .collect::<Result<Vec<_>>>()?;

        DatasetSchema::checked(fields, document.target_index).map_err(|err| {
            debug!(error = %err, "schema document failed validation");
            Error::from(err)
        })
    }
}

impl DatasetSchema {
    /// Serialize this schema to a compact JSON document
    pub fn to_json(&self) -> Result<String> {
        self.to_json_with(&JsonWriteOptions::default())
    }

    /// Serialize this schema to a JSON document with the given options
    pub fn to_json_with(&self, options: &JsonWriteOptions) -> Result<String> {
        let document = DatasetSchemaDocument::from(self);
        let json = if options.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(json)
    }

    /// Deserialize a schema from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: DatasetSchemaDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    /// Write this schema as a JSON document
    pub fn write_json<W: Write>(&self, writer: W, options: &JsonWriteOptions) -> Result<()> {
        let document = DatasetSchemaDocument::from(self);
        if options.pretty {
            serde_json::to_writer_pretty(writer, &document)?;
        } else {
            serde_json::to_writer(writer, &document)?;
        }
        Ok(())
    }

    /// Read a schema from a JSON document
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let document: DatasetSchemaDocument = serde_json::from_reader(reader)?;
        Self::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fraud_schema(target: Option<usize>) -> DatasetSchema {
        let mut builder = DatasetSchema::builder()
            .numeric("amount", false)
            .categorical("label", false, ["genuine", "fraud"])
            .string("merchant", true);
        if let Some(target) = target {
            builder = builder.target(target);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_document_shape() {
        let value = serde_json::to_value(DatasetSchemaDocument::from(&fraud_schema(Some(1)))).unwrap();

        assert_eq!(
            value,
            json!({
                "targetIndex": 1,
                "fieldSchemas": [
                    {"fieldIndex": 0, "fieldName": "amount",
                     "valueSchema": {"@type": "numeric", "allowMissing": false}},
                    {"fieldIndex": 1, "fieldName": "label",
                     "valueSchema": {"@type": "categorical", "nominalValues": ["fraud", "genuine"], "allowMissing": false}},
                    {"fieldIndex": 2, "fieldName": "merchant",
                     "valueSchema": {"@type": "string", "allowMissing": true}}
                ]
            })
        );
    }

    #[test]
    fn test_no_target_omits_target_index() {
        let value = serde_json::to_value(DatasetSchemaDocument::from(&fraud_schema(None))).unwrap();

        assert!(value.get("targetIndex").is_none());
    }

    #[test]
    fn test_round_trip() {
        for target in [None, Some(0), Some(1), Some(2)] {
            let schema = fraud_schema(target);
            let json = schema.to_json().unwrap();
            assert_eq!(DatasetSchema::from_json(&json).unwrap(), schema);

            let pretty = schema.to_json_with(&JsonWriteOptions::pretty()).unwrap();
            assert_eq!(DatasetSchema::from_json(&pretty).unwrap(), schema);
        }
    }

    #[test]
    fn test_reader_writer_round_trip() {
        let schema = fraud_schema(Some(1));
        let mut buffer = Vec::new();
        schema.write_json(&mut buffer, &JsonWriteOptions::default()).unwrap();

        assert_eq!(DatasetSchema::read_json(buffer.as_slice()).unwrap(), schema);
    }

    #[test]
    fn test_serde_impls_match_document() {
        let schema = fraud_schema(Some(1));
        let via_serde = serde_json::to_string(&schema).unwrap();

        assert_eq!(via_serde, schema.to_json().unwrap());
        let back: DatasetSchema = serde_json::from_str(&via_serde).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_nominal_values_are_canonicalized_on_read() {
        let json = r#"{"fieldSchemas": [{"fieldIndex": 0, "fieldName": "c",
            "valueSchema": {"@type": "categorical", "nominalValues": ["b", "a", "b"], "allowMissing": true}}]}"#;

        let schema = DatasetSchema::from_json(json).unwrap();
        let categorical = schema.fields()[0].value_schema().as_categorical().unwrap();
        assert_eq!(categorical.nominal_values(), ["a", "b"]);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"fieldSchemas": [{"fieldIndex": 0, "fieldName": "flag",
            "valueSchema": {"@type": "boolean", "allowMissing": false}}]}"#;

        match DatasetSchema::from_json(json) {
            Err(Error::UnsupportedValueSchemaType(tag)) => assert_eq!(tag, "boolean"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_categorical_without_nominal_values() {
        let json = r#"{"fieldSchemas": [{"fieldIndex": 0, "fieldName": "c",
            "valueSchema": {"@type": "categorical", "allowMissing": false}}]}"#;

        assert!(matches!(DatasetSchema::from_json(json), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_nominal_values_only_on_categorical() {
        for value_type in ["numeric", "string"] {
            let json = format!(
                r#"{{"fieldSchemas": [{{"fieldIndex": 0, "fieldName": "c",
                "valueSchema": {{"@type": "{value_type}", "allowMissing": false, "nominalValues": ["a"]}}}}]}}"#
            );

            assert!(matches!(DatasetSchema::from_json(&json), Err(Error::MalformedDocument(_))));
        }
    }

    #[test]
    fn test_tampered_documents_fail_invariants() {
        let gap = r#"{"fieldSchemas": [
            {"fieldIndex": 0, "fieldName": "a", "valueSchema": {"@type": "numeric", "allowMissing": false}},
            {"fieldIndex": 2, "fieldName": "b", "valueSchema": {"@type": "numeric", "allowMissing": false}}]}"#;
        let duplicate = r#"{"fieldSchemas": [
            {"fieldIndex": 0, "fieldName": "a", "valueSchema": {"@type": "numeric", "allowMissing": false}},
            {"fieldIndex": 1, "fieldName": "a", "valueSchema": {"@type": "string", "allowMissing": false}}]}"#;
        let target = r#"{"targetIndex": 3, "fieldSchemas": [
            {"fieldIndex": 0, "fieldName": "a", "valueSchema": {"@type": "numeric", "allowMissing": false}}]}"#;
        let negative_target = r#"{"targetIndex": -1, "fieldSchemas": []}"#;
        let negative_index = r#"{"fieldSchemas": [
            {"fieldIndex": -1, "fieldName": "a", "valueSchema": {"@type": "numeric", "allowMissing": false}}]}"#;
        let blank_name = r#"{"fieldSchemas": [
            {"fieldIndex": 0, "fieldName": "", "valueSchema": {"@type": "numeric", "allowMissing": false}}]}"#;

        let schema_error = |json: &str| DatasetSchema::from_json(json).unwrap_err().schema_error().cloned();

        assert!(matches!(schema_error(gap), Some(SchemaError::NonContiguousIndices { position: 1, found: 2 })));
        assert!(matches!(schema_error(duplicate), Some(SchemaError::DuplicateNames { .. })));
        assert!(matches!(schema_error(target), Some(SchemaError::TargetIndexOutOfBounds { index: 3, len: 1 })));
        assert!(matches!(schema_error(negative_target), Some(SchemaError::TargetIndexOutOfBounds { index: -1, len: 0 })));
        assert!(matches!(schema_error(negative_index), Some(SchemaError::NegativeFieldIndex { index: -1, .. })));
        assert!(matches!(schema_error(blank_name), Some(SchemaError::EmptyFieldName { index: 0 })));
    }

    #[test]
    fn test_missing_field_schemas() {
        assert!(matches!(
            DatasetSchema::from_json(r#"{"targetIndex": 0}"#).unwrap_err().schema_error(),
            Some(SchemaError::NullFields)
        ));
        assert!(matches!(
            DatasetSchema::from_json(r#"{"fieldSchemas": null}"#).unwrap_err().schema_error(),
            Some(SchemaError::NullFields)
        ));
    }

    #[test]
    fn test_incomplete_documents() {
        assert!(matches!(DatasetSchema::from_json("{"), Err(Error::Serialization(_))));
        assert!(matches!(
            DatasetSchema::from_json(r#"{"fieldSchemas": [{"fieldIndex": 0, "fieldName": "a"}]}"#),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            DatasetSchema::from_json(r#"{"fieldSchemas": [{"fieldIndex": 0, "fieldName": "a",
                "valueSchema": {"@type": "numeric"}}]}"#),
            Err(Error::Serialization(_))
        ));
    }
}
