//! Reference provider for the model contracts
//!
//! The "Ultra ML Vendor" offers two algorithms that ignore their input and
//! always predict the first or the second target class. It exercises every
//! contract a real provider implements: algorithm descriptors, loading,
//! training, saving and schema validation.

#![warn(missing_docs)]

pub mod loader;
pub mod model;
pub mod provider;

pub use loader::{ExampleModelLoader, ExampleModelTrainer};
pub use model::{ExampleExplainer, ExampleModel};
pub use provider::{ExampleProvider, NAME, PREDICT_FIRST, PREDICT_SECOND};
