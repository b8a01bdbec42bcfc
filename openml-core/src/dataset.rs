//! Dataset trait and the in-memory implementation

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::encoding::{EncodingHelper, RawValue};
use crate::error::{Error, Result};
use crate::instance::{EncodedInstance, Instance};
use crate::schema::DatasetSchema;

/// A collection of instances sharing one schema
pub trait Dataset: Send + Sync {
    /// Get the schema of this dataset
    fn schema(&self) -> &Arc<DatasetSchema>;

    /// Get the number of instances
    fn len(&self) -> usize;

    /// Check if the dataset holds no instances
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the instance at `index`
    fn instance(&self, index: usize) -> Option<&dyn Instance>;

    /// Iterate over all instances in order
    fn instances(&self) -> Box<dyn Iterator<Item = &dyn Instance> + '_>;

    /// Numeric values of one field across all instances
    fn feature(&self, index: usize) -> Result<FeatureValues> {
        if index >= self.schema().len() {
            return Err(Error::IndexOutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.schema().len(),
            });
        }

        let values = self
            .instances()
            .map(|instance| instance.value(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureValues::new(values))
    }
}

/// All values of a single feature, in instance order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureValues {
    values: Vec<f64>,
}

impl FeatureValues {
    /// Create from a column of values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value for the instance at `index`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Result of splitting a dataset by a predicate
#[derive(Debug, Clone)]
pub struct PartitionedDataset {
    /// Instances for which the predicate held
    pub matched: InMemoryDataset,

    /// Instances for which the predicate did not hold
    pub unmatched: InMemoryDataset,
}

/// A dataset holding all of its encoded instances in memory
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    schema: Arc<DatasetSchema>,
    instances: Vec<EncodedInstance>,
}

impl InMemoryDataset {
    /// Create a dataset, checking every instance has one value per field
    pub fn new(schema: Arc<DatasetSchema>, instances: Vec<EncodedInstance>) -> Result<Self> {
        if let Some((position, instance)) = instances
            .iter()
            .enumerate()
            .find(|(_, instance)| instance.len() != schema.len())
        {
            return Err(Error::InvalidArgument(format!(
                "instance {position} has {} values but the schema has {} fields",
                instance.len(),
                schema.len()
            )));
        }

        Ok(Self { schema, instances })
    }

    /// Start building a dataset from raw rows
    pub fn builder(schema: Arc<DatasetSchema>) -> DatasetBuilder {
        DatasetBuilder::new(schema)
    }

    /// A dataset with the same schema and no instances
    pub fn empty(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            instances: Vec::new(),
        }
    }

    /// Keep only the instances matching `predicate`
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&EncodedInstance) -> bool,
    {
        self.with_instances(self.instances.iter().filter(|instance| predicate(instance)).cloned().collect())
    }

    /// Group instances by the key computed for each one
    pub fn group_by<K, F>(&self, key: F) -> HashMap<K, Self>
    where
        K: Eq + Hash,
        F: Fn(&EncodedInstance) -> K,
    {
        let mut groups: HashMap<K, Vec<EncodedInstance>> = HashMap::new();
        for instance in &self.instances {
            groups.entry(key(instance)).or_default().push(instance.clone());
        }

        groups
            .into_iter()
            .map(|(key, instances)| (key, self.with_instances(instances)))
            .collect()
    }

    /// Split instances into those matching `predicate` and the rest
    pub fn partition<P>(&self, predicate: P) -> PartitionedDataset
    where
        P: Fn(&EncodedInstance) -> bool,
    {
        let (matched, unmatched): (Vec<_>, Vec<_>) =
            self.instances.iter().cloned().partition(|instance| predicate(instance));

        PartitionedDataset {
            matched: self.with_instances(matched),
            unmatched: self.with_instances(unmatched),
        }
    }

    /// The encoded instances
    pub fn encoded_instances(&self) -> &[EncodedInstance] {
        &self.instances
    }

    fn with_instances(&self, instances: Vec<EncodedInstance>) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            instances,
        }
    }
}

impl Dataset for InMemoryDataset {
    fn schema(&self) -> &Arc<DatasetSchema> {
        &self.schema
    }

    fn len(&self) -> usize {
        self.instances.len()
    }

    fn instance(&self, index: usize) -> Option<&dyn Instance> {
        self.instances.get(index).map(|instance| instance as &dyn Instance)
    }

    fn instances(&self) -> Box<dyn Iterator<Item = &dyn Instance> + '_> {
        Box::new(self.instances.iter().map(|instance| instance as &dyn Instance))
    }
}

/// Builds an [`InMemoryDataset`] by encoding raw rows against its schema
#[derive(Debug)]
pub struct DatasetBuilder {
    schema: Arc<DatasetSchema>,
    helper: EncodingHelper,
    instances: Vec<EncodedInstance>,
}

impl DatasetBuilder {
    /// Create a builder for the given schema
    pub fn new(schema: Arc<DatasetSchema>) -> Self {
        let helper = EncodingHelper::new(&schema);
        Self {
            schema,
            helper,
            instances: Vec::new(),
        }
    }

    /// Encode and append a row
    pub fn row<'a, I>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RawValue<'a>>,
    {
        self.push_row(values)?;
        Ok(self)
    }

    /// Encode and append a row in place
    pub fn push_row<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<RawValue<'a>>,
    {
        let instance = self.helper.encode_row(values)?;
        self.instances.push(instance);
        Ok(())
    }

    /// Build the dataset
    pub fn build(self) -> InMemoryDataset {
        InMemoryDataset {
            schema: self.schema,
            instances: self.instances,
        }
    }
}
