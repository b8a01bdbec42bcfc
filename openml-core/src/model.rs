//! Contracts between model providers and the components that host them

use std::collections::HashMap;
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::instance::Instance;
use crate::params::{AlgorithmDescriptor, ParamValidationError};
use crate::schema::DatasetSchema;

/// Parameter name to raw value, as supplied by the user
pub type Params = HashMap<String, String>;

/// A trained model
pub trait MachineLearningModel: Send + Sync {
    /// Persist the model as `name` inside `dir`
    fn save(&self, dir: &Path, name: &str) -> Result<()>;

    /// Schema of the data the model was built for
    fn schema(&self) -> &DatasetSchema;
}

/// A model scoring instances against a categorical target
pub trait ClassificationModel: MachineLearningModel {
    /// Probability of each target class, in nominal value order
    fn class_distribution(&self, instance: &dyn Instance) -> Result<Vec<f64>>;

    /// Position of the predicted class among the nominal values
    fn classify(&self, instance: &dyn Instance) -> Result<usize>;
}

/// Explains the predictions of a model
pub trait ModelExplainer: Send + Sync {
    /// Model whose predictions are explained
    type Model: MachineLearningModel;

    /// The explained model
    fn model(&self) -> &Self::Model;

    /// Contribution score of each field of the model's schema to the
    /// prediction for `instance`, in field index order
    fn feature_contributions(&self, instance: &dyn Instance) -> Result<Vec<f64>>;
}

/// Loads previously persisted models
pub trait ModelLoader {
    /// Model type produced by this loader
    type Model: MachineLearningModel;

    /// Load the model stored at `model_path`
    fn load_model(&self, model_path: &Path, schema: &DatasetSchema) -> Result<Self::Model>;

    /// Check that a model can be loaded with the given schema and parameters
    fn validate_for_load(&self, model_path: &Path, schema: &DatasetSchema, params: &Params) -> Vec<ParamValidationError>;

    /// Read the schema persisted with the model at `model_path`
    fn load_schema(&self, model_path: &Path) -> Result<DatasetSchema>;
}

/// Trains new models
pub trait ModelTrainer: ModelLoader {
    /// Fit a model to `dataset`; `seed` drives any randomness
    fn fit(&self, dataset: &dyn Dataset, seed: u64, params: &Params) -> Result<Self::Model>;

    /// Check that a model can be trained and persisted at `path_to_persist`
    fn validate_for_fit(
        &self,
        path_to_persist: &Path,
        schema: &DatasetSchema,
        params: &Params,
    ) -> Vec<ParamValidationError>;
}

/// A vendor offering one or more algorithms
pub trait MachineLearningProvider {
    /// Loader (or trainer) created for an algorithm
    type Creator: ModelLoader;

    /// Provider name
    fn name(&self) -> &str;

    /// Algorithms this provider offers
    fn algorithms(&self) -> &[AlgorithmDescriptor];

    /// The loader for the named algorithm, if offered
    fn model_creator(&self, algorithm_name: &str) -> Option<Self::Creator>;
}
