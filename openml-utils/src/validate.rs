//! Validations shared by model providers
//!
//! Checks on user input (parameters, schemas, directories) return every
//! failure as a list of [`ParamValidationError`]s. Checks on a loaded model
//! fail fast with [`Error::ModelLoading`].

use std::fs;
use std::path::Path;

use openml_core::{
    AlgorithmDescriptor, ClassificationModel, DatasetSchema, EncodedInstance, EncodedValue, ModelLoader,
    ParamValidationError, Params, ValueSchema, ValueSchemaKind,
};
use tracing::{debug, error, warn};

use crate::classification::num_class_values;
use crate::error::{Error, Result};
use crate::layout::ModelLayout;

/// Check `params` against every parameter declared by the algorithm
///
/// A mandatory parameter without a value is reported; supplied values are
/// checked against their parameter kind. Unknown parameters are ignored.
pub fn check_params(descriptor: &AlgorithmDescriptor, params: &Params) -> Vec<ParamValidationError> {
    debug!(algorithm = descriptor.name(), "validating parameters");

    let validators = descriptor.validators();
    descriptor
        .parameters()
        .iter()
        .filter_map(|parameter| {
            let name = parameter.name();
            match params.get(name) {
                None if parameter.is_mandatory() => Some(ParamValidationError::for_parameter(
                    name,
                    None,
                    format_args!("The parameter {name} must have a value since it's mandatory"),
                )),
                None => None,
                Some(value) => validators
                    .get(name)
                    .and_then(|kind| kind.validate(name, Some(value.as_str()))),
            }
        })
        .collect()
}

/// Check the target is categorical with at least two classes
pub fn validate_categorical_schema(schema: &DatasetSchema) -> Option<ParamValidationError> {
    let Some(target) = schema.target_field() else {
        return Some(ParamValidationError::new("The dataset schema has no target variable"));
    };

    match target.value_schema() {
        ValueSchema::Categorical(categorical) if categorical.len() < 2 => Some(ParamValidationError::new(format!(
            "Target variable {} must be a categorical field with at least 2 values, but only has {}.",
            target.name(),
            categorical.len()
        ))),
        ValueSchema::Categorical(_) => None,
        _ => Some(ParamValidationError::new(format!(
            "Target variable {} must be a categorical field",
            target.name()
        ))),
    }
}

impl ModelLayout {
    /// Check the model directory layout, reporting every problem found
    pub fn validate_model_dir(&self, model_path: &Path) -> Vec<ParamValidationError> {
        match self.inspect(model_path) {
            Ok(_) => Vec::new(),
            Err(problems) => problems
                .into_iter()
                .map(|problem| {
                    let message = format!("Could not load model from path {}: {problem}", model_path.display());
                    warn!("{message}");
                    ParamValidationError::new(message)
                })
                .collect(),
        }
    }
}

/// Check the model directory layout using the default layout
pub fn validate_model_in_dir(model_path: &Path) -> Vec<ParamValidationError> {
    ModelLayout::default().validate_model_dir(model_path)
}

/// Report predictive fields whose value schema is of the given kind
pub fn check_no_fields_of_type(schema: &DatasetSchema, kind: ValueSchemaKind) -> Vec<ParamValidationError> {
    schema
        .predictive_fields()
        .filter(|field| field.value_schema().kind() == kind)
        .map(|field| ParamValidationError::new(format!("field [{}] is of unsupported type [{kind}]", field.name())))
        .collect()
}

/// Check the folder a model will be persisted to is absent or empty
pub fn validate_model_path_to_train(path_to_persist: &Path) -> Vec<ParamValidationError> {
    if !path_to_persist.exists() {
        return Vec::new();
    }

    match fs::read_dir(path_to_persist).map(|mut entries| entries.next().is_none()) {
        Ok(true) => Vec::new(),
        Ok(false) => vec![ParamValidationError::new(format!(
            "The selected folder {} to persist the Machine Learning Model (yet to be trained) must be empty but is currently not.",
            path_to_persist.display()
        ))],
        Err(err) => {
            warn!(
                path = %path_to_persist.display(),
                "unexpected error while verifying the directory to persist the model to"
            );
            vec![ParamValidationError::new(format!(
                "Could not access the selected folder {} to persist the Machine Learning Model (yet to be trained) due to error {err}.",
                path_to_persist.display()
            ))]
        }
    }
}

/// Run the loader's own load validations, joining any failures into one error
pub fn validate_params_model_to_load<L: ModelLoader>(
    loader: &L,
    model_path: &Path,
    schema: &DatasetSchema,
    params: &Params,
) -> Result<()> {
    debug!(path = %model_path.display(), "validating the parameters of the model");

    let errors = loader.validate_for_load(model_path, schema, params);
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ParamValidationError::message)
            .collect::<Vec<_>>()
            .join(",");
        return Err(Error::ModelLoading(message));
    }

    debug!(path = %model_path.display(), "parameters of the model successfully validated");
    Ok(())
}

/// A deterministic instance matching `schema`
///
/// Numeric fields hold `0.0`, categorical fields their first category (or
/// the missing sentinel when there are none) and string fields an empty
/// string.
pub fn probe_instance(schema: &DatasetSchema) -> EncodedInstance {
    let values = schema
        .fields()
        .iter()
        .map(|field| match field.value_schema() {
            ValueSchema::Numeric { .. } => EncodedValue::Numeric(0.0),
            ValueSchema::Categorical(categorical) if categorical.is_empty() => EncodedValue::Numeric(f64::NAN),
            ValueSchema::Categorical(_) => EncodedValue::Numeric(0.0),
            ValueSchema::String { .. } => EncodedValue::Text(Some(String::new())),
        })
        .collect();

    EncodedInstance::new(values)
}

/// Check a loaded model can score instances of `schema`
///
/// Both `classify` and `class_distribution` are run on a probe instance.
/// When the target is categorical the distribution must have one entry per
/// class.
pub fn validate_classification_model(schema: &DatasetSchema, model: &dyn ClassificationModel) -> Result<()> {
    let probe = probe_instance(schema);

    if let Err(err) = model.classify(&probe) {
        let message = format!("Model classification is not compatible with the given schema {schema}: {err}");
        error!("{message}");
        return Err(Error::ModelLoading(message));
    }

    let distribution = model.class_distribution(&probe).map_err(|err| {
        let message = format!("Model does not support class distribution: {err}");
        error!("{message}");
        Error::ModelLoading(message)
    })?;

    if let Ok(Some(classes)) = num_class_values(schema) {
        if distribution.len() != classes {
            let message = format!(
                "Model class distribution has {} values but the target has {classes} classes",
                distribution.len()
            );
            error!("{message}");
            return Err(Error::ModelLoading(message));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use openml_core::{
        AlgorithmType, ChoiceParameter, Instance, MachineLearningModel, ModelParameter, NumericKind,
        NumericParameter, ParameterKind,
    };
    use tempfile::tempdir;
    use test_case::test_case;

    fn schema(target: ValueSchema) -> DatasetSchema {
        DatasetSchema::builder()
            .numeric("amount", false)
            .string("merchant", true)
            .field("label", target)
            .target(2)
            .build()
            .unwrap()
    }

    fn fraud_schema() -> DatasetSchema {
        schema(ValueSchema::categorical(false, ["fraud", "genuine"]))
    }

    fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(
            "forest",
            vec![
                ModelParameter::new(
                    "trees",
                    "Number of trees",
                    "",
                    true,
                    NumericParameter::range(1.0, 500.0, NumericKind::Int, 100.0).unwrap(),
                ),
                ModelParameter::new(
                    "criterion",
                    "Split criterion",
                    "",
                    false,
                    ChoiceParameter::new(["gini", "entropy"], "gini").unwrap(),
                ),
                ModelParameter::new("notes", "Notes", "", false, ParameterKind::FreeText { default: String::new() }),
            ],
            AlgorithmType::SupervisedBinaryClassification,
            "https://example.com/forest",
        )
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test_case(&[("trees", "10")], 0 ; "mandatory only")]
    #[test_case(&[("trees", "10"), ("criterion", "entropy"), ("notes", "x")], 0 ; "all valid")]
    #[test_case(&[], 1 ; "mandatory missing")]
    #[test_case(&[("trees", "0")], 1 ; "out of range")]
    #[test_case(&[("criterion", "log")], 2 ; "missing and invalid choice")]
    #[test_case(&[("trees", "10"), ("unknown", "x")], 0 ; "unknown ignored")]
    fn test_check_params(pairs: &[(&str, &str)], expected: usize) {
        assert_eq!(check_params(&descriptor(), &params(pairs)).len(), expected);
    }

    #[test]
    fn test_check_params_mandatory_message() {
        let errors = check_params(&descriptor(), &Params::new());

        assert_eq!(
            errors[0].message(),
            "Parameter trees has value null: The parameter trees must have a value since it's mandatory"
        );
    }

    #[test]
    fn test_validate_categorical_schema() {
        assert!(validate_categorical_schema(&fraud_schema()).is_none());

        let numeric = validate_categorical_schema(&schema(ValueSchema::numeric(false))).unwrap();
        assert_eq!(numeric.message(), "Target variable label must be a categorical field");

        let single = validate_categorical_schema(&schema(ValueSchema::categorical(false, ["fraud"]))).unwrap();
        assert_eq!(
            single.message(),
            "Target variable label must be a categorical field with at least 2 values, but only has 1."
        );

        let unsupervised = DatasetSchema::builder().numeric("amount", false).build().unwrap();
        assert!(validate_categorical_schema(&unsupervised).is_some());
    }

    #[test]
    fn test_validate_model_in_dir() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("model");
        fs::create_dir(&model_dir).unwrap();
        assert_eq!(validate_model_in_dir(dir.path()).len(), 1);

        fs::write(model_dir.join("weights.bin"), b"weights").unwrap();
        assert!(validate_model_in_dir(dir.path()).is_empty());

        fs::write(model_dir.join("extra.bin"), b"extra").unwrap();
        fs::create_dir(model_dir.join("nested")).unwrap();
        let errors = validate_model_in_dir(dir.path());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message().starts_with("Could not load model from path")));
    }

    #[test]
    fn test_check_no_fields_of_type() {
        let schema = fraud_schema();

        let strings = check_no_fields_of_type(&schema, ValueSchemaKind::String);
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].message(), "field [merchant] is of unsupported type [string]");

        // the target is not a predictive field
        assert!(check_no_fields_of_type(&schema, ValueSchemaKind::Categorical).is_empty());
    }

    #[test]
    fn test_validate_model_path_to_train() {
        let dir = tempdir().unwrap();
        assert!(validate_model_path_to_train(&dir.path().join("absent")).is_empty());
        assert!(validate_model_path_to_train(dir.path()).is_empty());

        fs::write(dir.path().join("stale.bin"), b"").unwrap();
        let errors = validate_model_path_to_train(dir.path());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("must be empty"));
    }

    struct StubModel {
        schema: DatasetSchema,
    }

    impl MachineLearningModel for StubModel {
        fn save(&self, _dir: &Path, _name: &str) -> openml_core::Result<()> {
            Ok(())
        }

        fn schema(&self) -> &DatasetSchema {
            &self.schema
        }
    }

    mock! {
        Loader {}

        impl ModelLoader for Loader {
            type Model = StubModel;

            fn load_model(&self, model_path: &Path, schema: &DatasetSchema) -> openml_core::Result<StubModel>;
            fn validate_for_load(&self, model_path: &Path, schema: &DatasetSchema, params: &Params) -> Vec<ParamValidationError>;
            fn load_schema(&self, model_path: &Path) -> openml_core::Result<DatasetSchema>;
        }
    }

    #[test]
    fn test_validate_params_model_to_load() {
        let mut loader = MockLoader::new();
        loader
            .expect_validate_for_load()
            .times(1)
            .returning(|_, _, _| Vec::new());

        assert!(validate_params_model_to_load(&loader, Path::new("m"), &fraud_schema(), &Params::new()).is_ok());
    }

    #[test]
    fn test_validate_params_model_to_load_joins_errors() {
        let mut loader = MockLoader::new();
        loader.expect_validate_for_load().returning(|_, _, _| {
            vec![
                ParamValidationError::new("first problem"),
                ParamValidationError::new("second problem"),
            ]
        });

        let Err(Error::ModelLoading(message)) =
            validate_params_model_to_load(&loader, Path::new("m"), &fraud_schema(), &Params::new())
        else {
            panic!("expected a model loading error");
        };
        assert_eq!(message, "first problem,second problem");
    }

    struct FixedClassifier {
        schema: DatasetSchema,
        distribution: Vec<f64>,
        fail_distribution: bool,
    }

    impl MachineLearningModel for FixedClassifier {
        fn save(&self, _dir: &Path, _name: &str) -> openml_core::Result<()> {
            Ok(())
        }

        fn schema(&self) -> &DatasetSchema {
            &self.schema
        }
    }

    impl ClassificationModel for FixedClassifier {
        fn class_distribution(&self, _instance: &dyn Instance) -> openml_core::Result<Vec<f64>> {
            if self.fail_distribution {
                return Err(openml_core::Error::InvalidArgument("not supported".into()));
            }
            Ok(self.distribution.clone())
        }

        fn classify(&self, instance: &dyn Instance) -> openml_core::Result<usize> {
            // reads every numeric field like a real model would
            instance.value(0)?;
            instance.string_value(1)?;
            Ok(0)
        }
    }

    fn classifier(distribution: Vec<f64>, fail_distribution: bool) -> FixedClassifier {
        FixedClassifier {
            schema: fraud_schema(),
            distribution,
            fail_distribution,
        }
    }

    #[test]
    fn test_validate_classification_model() {
        let schema = fraud_schema();

        assert!(validate_classification_model(&schema, &classifier(vec![1.0, 0.0], false)).is_ok());
        assert!(matches!(
            validate_classification_model(&schema, &classifier(vec![1.0, 0.0], true)),
            Err(Error::ModelLoading(_))
        ));
        assert!(matches!(
            validate_classification_model(&schema, &classifier(vec![1.0], false)),
            Err(Error::ModelLoading(_))
        ));
    }

    #[test]
    fn test_validate_classification_model_incompatible_schema() {
        // the classifier reads field 1 as a string but here it is numeric
        let schema = DatasetSchema::builder()
            .numeric("amount", false)
            .numeric("age", false)
            .categorical("label", false, ["fraud", "genuine"])
            .target(2)
            .build()
            .unwrap();

        let Err(Error::ModelLoading(message)) =
            validate_classification_model(&schema, &classifier(vec![1.0, 0.0], false))
        else {
            panic!("expected a model loading error");
        };
        assert!(message.starts_with("Model classification is not compatible"));
    }

    #[test]
    fn test_probe_instance() {
        let probe = probe_instance(&fraud_schema());

        assert_eq!(probe.value(0).unwrap(), 0.0);
        assert_eq!(probe.string_value(1).unwrap(), Some(""));
        assert_eq!(probe.value(2).unwrap(), 0.0);
    }
}
