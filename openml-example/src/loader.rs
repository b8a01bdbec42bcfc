//! Loader and trainer for [`ExampleModel`]

use std::path::Path;

use openml_core::{
    Dataset, DatasetSchema, Error, ModelLoader, ModelTrainer, ParamValidationError, Params, Result,
};
use openml_utils::{num_class_values, validate_categorical_schema, validate_model_path_to_train};
use tracing::{debug, info};

use crate::model::ExampleModel;

/// Builds models that always predict the class at a fixed position
#[derive(Debug, Clone, Copy)]
pub struct ExampleModelLoader {
    index_to_predict: usize,
}

impl ExampleModelLoader {
    /// Loader for models predicting the class at `index_to_predict`
    pub fn new(index_to_predict: usize) -> Self {
        Self { index_to_predict }
    }

    fn schema_problems(&self, schema: &DatasetSchema) -> Vec<ParamValidationError> {
        if let Some(problem) = validate_categorical_schema(schema) {
            return vec![problem];
        }

        match num_class_values(schema) {
            Ok(Some(classes)) if classes > self.index_to_predict => Vec::new(),
            Ok(Some(classes)) => vec![ParamValidationError::new(format!(
                "The target has {classes} classes, cannot always predict class {}",
                self.index_to_predict
            ))],
            Ok(None) => vec![ParamValidationError::new("The dataset schema has no target variable")],
            Err(err) => vec![ParamValidationError::new(err.to_string())],
        }
    }
}

impl ModelLoader for ExampleModelLoader {
    type Model = ExampleModel;

    /// The model path is not read, the prediction follows from the schema alone
    fn load_model(&self, _model_path: &Path, schema: &DatasetSchema) -> Result<ExampleModel> {
        let problems = self.schema_problems(schema);
        if !problems.is_empty() {
            let message = problems
                .iter()
                .map(ParamValidationError::message)
                .collect::<Vec<_>>()
                .join(",");
            return Err(Error::ModelLoading(message));
        }

        let classes = num_class_values(schema)
            .ok()
            .flatten()
            .ok_or_else(|| Error::ModelLoading("the target is not categorical".into()))?;

        debug!(classes, class = self.index_to_predict, "loaded example model");
        Ok(ExampleModel::new(schema.clone(), self.index_to_predict, classes))
    }

    fn validate_for_load(&self, _model_path: &Path, schema: &DatasetSchema, _params: &Params) -> Vec<ParamValidationError> {
        self.schema_problems(schema)
    }

    fn load_schema(&self, _model_path: &Path) -> Result<DatasetSchema> {
        Err(Error::ModelLoading("You cannot load schemas with this provider.".into()))
    }
}

/// Trains [`ExampleModel`]s, which amounts to loading one for the dataset's schema
#[derive(Debug, Clone, Copy)]
pub struct ExampleModelTrainer {
    loader: ExampleModelLoader,
}

impl ExampleModelTrainer {
    /// Trainer for models predicting the class at `index_to_predict`
    pub fn new(index_to_predict: usize) -> Self {
        Self {
            loader: ExampleModelLoader::new(index_to_predict),
        }
    }
}

impl ModelLoader for ExampleModelTrainer {
    type Model = ExampleModel;

    fn load_model(&self, model_path: &Path, schema: &DatasetSchema) -> Result<ExampleModel> {
        self.loader.load_model(model_path, schema)
    }

    fn validate_for_load(&self, model_path: &Path, schema: &DatasetSchema, params: &Params) -> Vec<ParamValidationError> {
        self.loader.validate_for_load(model_path, schema, params)
    }

    fn load_schema(&self, model_path: &Path) -> Result<DatasetSchema> {
        self.loader.load_schema(model_path)
    }
}

impl ModelTrainer for ExampleModelTrainer {
    fn fit(&self, dataset: &dyn Dataset, seed: u64, _params: &Params) -> Result<ExampleModel> {
        info!(instances = dataset.len(), seed, "fitting example model");
        self.loader.load_model(Path::new(""), dataset.schema())
    }

    fn validate_for_fit(
        &self,
        path_to_persist: &Path,
        schema: &DatasetSchema,
        _params: &Params,
    ) -> Vec<ParamValidationError> {
        let mut problems = validate_model_path_to_train(path_to_persist);
        problems.extend(self.loader.schema_problems(schema));
        problems
    }
}
