//! A classification model that always predicts the same class

use std::fs;
use std::path::Path;

use openml_core::{
    ClassificationModel, DatasetSchema, Instance, JsonWriteOptions, MachineLearningModel, ModelExplainer, Result,
};
use openml_utils::ModelLayout;
use tracing::info;

/// Model predicting a fixed class with probability one
#[derive(Debug, Clone)]
pub struct ExampleModel {
    schema: DatasetSchema,
    index_to_predict: usize,
    prediction: Vec<f64>,
}

impl ExampleModel {
    /// Create a model over `classes` classes always predicting `index_to_predict`
    pub(crate) fn new(schema: DatasetSchema, index_to_predict: usize, classes: usize) -> Self {
        let mut prediction = vec![0.0; classes];
        prediction[index_to_predict] = 1.0;

        Self {
            schema,
            index_to_predict,
            prediction,
        }
    }

    /// Position of the class this model predicts
    pub fn index_to_predict(&self) -> usize {
        self.index_to_predict
    }
}

impl MachineLearningModel for ExampleModel {
    /// Writes `model/<name>` and the schema document under `dir`
    fn save(&self, dir: &Path, name: &str) -> Result<()> {
        let layout = ModelLayout::default();
        let model_dir = layout.model_dir(dir);
        fs::create_dir_all(&model_dir)?;
        fs::write(model_dir.join(name), self.index_to_predict.to_string())?;
        layout.save_schema(dir, &self.schema, &JsonWriteOptions::pretty())?;

        info!(path = %dir.display(), class = self.index_to_predict, "saved example model");
        Ok(())
    }

    fn schema(&self) -> &DatasetSchema {
        &self.schema
    }
}

impl ClassificationModel for ExampleModel {
    fn class_distribution(&self, _instance: &dyn Instance) -> Result<Vec<f64>> {
        Ok(self.prediction.clone())
    }

    fn classify(&self, _instance: &dyn Instance) -> Result<usize> {
        Ok(self.index_to_predict)
    }
}

/// Explains [`ExampleModel`] predictions
///
/// The model ignores its input, so every field contributes nothing.
#[derive(Debug, Clone)]
pub struct ExampleExplainer {
    model: ExampleModel,
}

impl ExampleExplainer {
    /// Explainer for `model`
    pub fn new(model: ExampleModel) -> Self {
        Self { model }
    }
}

impl ModelExplainer for ExampleExplainer {
    type Model = ExampleModel;

    fn model(&self) -> &ExampleModel {
        &self.model
    }

    fn feature_contributions(&self, _instance: &dyn Instance) -> Result<Vec<f64>> {
        Ok(vec![0.0; self.model.schema.len()])
    }
}
