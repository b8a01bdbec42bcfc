//! Algorithm descriptors and parameter validation
//!
//! Every algorithm a provider offers is described by an
//! [`AlgorithmDescriptor`] listing its [`ModelParameter`]s. Parameter values
//! arrive as optional strings and are checked against the parameter's
//! [`ParameterKind`]; failures are reported as [`ParamValidationError`]
//! values, never as `Err`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{Error, Result};

/// A human readable parameter validation failure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamValidationError {
    message: String,
}

impl ParamValidationError {
    /// Create an error with a free form message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create an error about a specific parameter value
    pub fn for_parameter(name: &str, value: Option<&str>, reason: impl fmt::Display) -> Self {
        Self::new(format!(
            "Parameter {name} has value {}: {reason}",
            value.unwrap_or("null")
        ))
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParamValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Whether a numeric parameter holds whole or real numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// Integer parameter
    Int,
    /// Floating point parameter
    Double,
}

/// A numeric parameter bounded by an inclusive range
#[derive(Debug, Clone, PartialEq)]
pub struct NumericParameter {
    min: f64,
    max: f64,
    kind: NumericKind,
    default: f64,
}

impl NumericParameter {
    /// Parameter accepting values in `[min, max]`
    pub fn range(min: f64, max: f64, kind: NumericKind, default: f64) -> Result<Self> {
        if min > max || min.is_nan() || max.is_nan() {
            return Err(Error::InvalidArgument(
                "min value should be smaller or equal to max value".into(),
            ));
        }
        if !(min..=max).contains(&default) {
            return Err(Error::InvalidArgument(
                "the default value must be within the min and max values".into(),
            ));
        }

        Ok(Self { min, max, kind, default })
    }

    /// Parameter accepting values of at least `min`
    pub fn min(min: f64, kind: NumericKind, default: f64) -> Result<Self> {
        Self::range(min, f64::MAX, kind, default)
    }

    /// Parameter accepting values of at most `max`
    pub fn max(max: f64, kind: NumericKind, default: f64) -> Result<Self> {
        Self::range(-f64::MAX, max, kind, default)
    }

    /// Lower bound
    pub fn min_value(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max_value(&self) -> f64 {
        self.max
    }

    /// Numeric kind
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    /// Default value
    pub fn default_value(&self) -> f64 {
        self.default
    }

    fn validate(&self, name: &str, value: Option<&str>) -> Option<ParamValidationError> {
        let Some(text) = value else {
            return Some(ParamValidationError::for_parameter(name, value, "parameter value can't be null."));
        };

        match text.trim().parse::<f64>() {
            Ok(parsed) if parsed < self.min => Some(ParamValidationError::for_parameter(
                name,
                value,
                format_args!("should be equal or bigger than {}", self.min),
            )),
            Ok(parsed) if parsed > self.max => Some(ParamValidationError::for_parameter(
                name,
                value,
                format_args!("should be equal or smaller than {}", self.max),
            )),
            Ok(parsed) if parsed.is_nan() => {
                Some(ParamValidationError::for_parameter(name, value, "is not a parsable number"))
            }
            Ok(_) => None,
            Err(_) => Some(ParamValidationError::for_parameter(name, value, "is not a parsable number")),
        }
    }
}

/// A parameter restricted to a fixed set of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceParameter {
    allowed: BTreeSet<String>,
    default: String,
}

impl ChoiceParameter {
    /// Create a choice; the set must be non-empty and contain the default
    pub fn new<I, S>(allowed: I, default: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
        let default = default.into();

        if allowed.is_empty() {
            return Err(Error::InvalidArgument("allowed values can't be empty".into()));
        }
        if !allowed.contains(&default) {
            return Err(Error::InvalidArgument(format!(
                "default value [{default}] is not one of the allowed values"
            )));
        }

        Ok(Self { allowed, default })
    }

    /// Allowed values, in sorted order
    pub fn allowed_values(&self) -> impl Iterator<Item = &str> + '_ {
        self.allowed.iter().map(String::as_str)
    }

    /// Default value
    pub fn default_value(&self) -> &str {
        &self.default
    }

    fn validate(&self, name: &str, value: Option<&str>) -> Option<ParamValidationError> {
        if value.is_some_and(|value| self.allowed.contains(value)) {
            return None;
        }

        let options = self.allowed.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        Some(ParamValidationError::for_parameter(
            name,
            value,
            format_args!("should be one of: {options}"),
        ))
    }
}

/// The accepted values of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    /// `true` or `false`, case insensitive
    Boolean {
        /// Whether the parameter defaults to `true`
        default_true: bool,
    },

    /// One of a fixed set of strings
    Choice(ChoiceParameter),

    /// A number within a range
    Numeric(NumericParameter),

    /// Any text
    FreeText {
        /// Default value
        default: String,
    },
}

impl ParameterKind {
    /// Check a value, returning the failure if it is not accepted
    pub fn validate(&self, name: &str, value: Option<&str>) -> Option<ParamValidationError> {
        match self {
            ParameterKind::Boolean { .. } => match value {
                None => Some(ParamValidationError::for_parameter(name, value, "should not be null")),
                Some(text) if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") => None,
                Some(_) => Some(ParamValidationError::for_parameter(name, value, "is not a valid boolean value")),
            },
            ParameterKind::Choice(choice) => choice.validate(name, value),
            ParameterKind::Numeric(numeric) => numeric.validate(name, value),
            ParameterKind::FreeText { .. } => None,
        }
    }
}

impl From<ChoiceParameter> for ParameterKind {
    fn from(choice: ChoiceParameter) -> Self {
        ParameterKind::Choice(choice)
    }
}

impl From<NumericParameter> for ParameterKind {
    fn from(numeric: NumericParameter) -> Self {
        ParameterKind::Numeric(numeric)
    }
}

/// A configurable parameter of an algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameter {
    name: String,
    description: String,
    helper_description: String,
    mandatory: bool,
    kind: ParameterKind,
}

impl ModelParameter {
    /// Describe a parameter
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        helper_description: impl Into<String>,
        mandatory: bool,
        kind: impl Into<ParameterKind>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            helper_description: helper_description.into(),
            mandatory,
            kind: kind.into(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Longer usage help
    pub fn helper_description(&self) -> &str {
        &self.helper_description
    }

    /// Whether a value must be supplied
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// The accepted values
    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }
}

/// The kind of problem an algorithm solves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    /// Two-class classification
    SupervisedBinaryClassification,
    /// Unsupervised anomaly detection
    AnomalyDetection,
    /// Classification over more than two classes
    MultiClassification,
    /// Regression
    Regression,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmType::SupervisedBinaryClassification => "SUPERVISED_BINARY_CLASSIFICATION",
            AlgorithmType::AnomalyDetection => "ANOMALY_DETECTION",
            AlgorithmType::MultiClassification => "MULTI_CLASSIFICATION",
            AlgorithmType::Regression => "REGRESSION",
        };
        f.write_str(name)
    }
}

/// Description of an algorithm offered by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmDescriptor {
    name: String,
    parameters: Vec<ModelParameter>,
    algorithm_type: AlgorithmType,
    documentation: String,
}

impl AlgorithmDescriptor {
    /// Describe an algorithm; `documentation` is a link to its documentation
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ModelParameter>,
        algorithm_type: AlgorithmType,
        documentation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            algorithm_type,
            documentation: documentation.into(),
        }
    }

    /// Algorithm name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters
    pub fn parameters(&self) -> &[ModelParameter] {
        &self.parameters
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ModelParameter> {
        self.parameters.iter().find(|parameter| parameter.name() == name)
    }

    /// Algorithm type
    pub fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    /// Documentation link
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Parameter name to accepted values, for validating user input
    pub fn validators(&self) -> HashMap<&str, &ParameterKind> {
        self.parameters
            .iter()
            .map(|parameter| (parameter.name(), parameter.kind()))
            .collect()
    }
}
