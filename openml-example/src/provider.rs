//! The example provider and its algorithm descriptors

use openml_core::{
    AlgorithmDescriptor, AlgorithmType, MachineLearningProvider, ModelParameter, NumericKind, NumericParameter,
    Result,
};

use crate::loader::ExampleModelLoader;

/// Provider name
pub const NAME: &str = "Ultra ML Vendor";

/// Algorithm always predicting the first class
pub const PREDICT_FIRST: &str = "Always predicts first class";

/// Algorithm always predicting the second class
pub const PREDICT_SECOND: &str = "Always predicts second class";

const DOCUMENTATION: &str = "https://example.com/ultra-ml-vendor";

/// Provider offering the two fixed-class algorithms
#[derive(Debug, Clone)]
pub struct ExampleProvider {
    algorithms: Vec<AlgorithmDescriptor>,
}

impl ExampleProvider {
    /// Create the provider and describe its algorithms
    pub fn new() -> Result<Self> {
        let parameters = vec![ModelParameter::new(
            "Not used Parameter",
            "This parameter is not really used at all.",
            "You can fill any number you wish, it is not relevant.",
            true,
            NumericParameter::range(0.0, f64::MAX, NumericKind::Double, 42.0)?,
        )];

        let algorithms = vec![
            AlgorithmDescriptor::new(
                PREDICT_FIRST,
                parameters.clone(),
                AlgorithmType::SupervisedBinaryClassification,
                DOCUMENTATION,
            ),
            AlgorithmDescriptor::new(
                PREDICT_SECOND,
                parameters,
                AlgorithmType::MultiClassification,
                DOCUMENTATION,
            ),
        ];

        Ok(Self { algorithms })
    }

    /// Look up an algorithm descriptor by name
    pub fn algorithm(&self, name: &str) -> Option<&AlgorithmDescriptor> {
        self.algorithms.iter().find(|algorithm| algorithm.name() == name)
    }
}

impl MachineLearningProvider for ExampleProvider {
    type Creator = ExampleModelLoader;

    fn name(&self) -> &str {
        NAME
    }

    fn algorithms(&self) -> &[AlgorithmDescriptor] {
        &self.algorithms
    }

    fn model_creator(&self, algorithm_name: &str) -> Option<ExampleModelLoader> {
        match algorithm_name {
            PREDICT_FIRST => Some(ExampleModelLoader::new(0)),
            PREDICT_SECOND => Some(ExampleModelLoader::new(1)),
            _ => None,
        }
    }
}
