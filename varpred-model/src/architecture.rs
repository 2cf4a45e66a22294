//! Serialized network architectures.
//!
//! The format follows the JSON a Keras `Sequential` model writes with `model.to_json()`.
//! Only the layer types needed for sequence-to-score networks are understood; unknown
//! configuration keys are ignored.
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ModelError, Result};

/// Accepts both `8` and `[8]`, as Keras writes kernel sizes and strides as lists.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum OneOrList {
    One(usize),
    List([usize; 1]),
}

impl OneOrList {
    pub fn value(&self) -> usize {
        match self {
            OneOrList::One(v) => *v,
            OneOrList::List([v]) => *v,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    #[default]
    Valid,
    Same,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Softplus,
}

fn default_one() -> OneOrList {
    OneOrList::One(1)
}

fn default_true() -> bool {
    true
}

fn default_epsilon() -> f32 {
    1e-3
}

fn default_pool() -> OneOrList {
    OneOrList::One(2)
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct InputShape {
    #[serde(alias = "batch_shape")]
    pub batch_input_shape: Option<Vec<Option<usize>>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Conv1DConfig {
    pub name: String,
    pub filters: usize,
    pub kernel_size: OneOrList,
    #[serde(default = "default_one")]
    pub strides: OneOrList,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default = "default_one")]
    pub dilation_rate: OneOrList,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default = "default_true")]
    pub use_bias: bool,
    #[serde(flatten)]
    pub input: InputShape,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Pooling1DConfig {
    #[serde(default = "default_pool")]
    pub pool_size: OneOrList,
    pub strides: Option<OneOrList>,
    #[serde(default)]
    pub padding: Padding,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DenseConfig {
    pub name: String,
    pub units: usize,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default = "default_true")]
    pub use_bias: bool,
    #[serde(flatten)]
    pub input: InputShape,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ActivationConfig {
    pub activation: Activation,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BatchNormalizationConfig {
    pub name: String,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_true")]
    pub center: bool,
    #[serde(default = "default_true")]
    pub scale: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "class_name", content = "config")]
pub enum LayerSpec {
    InputLayer(InputShape),
    Conv1D(Conv1DConfig),
    MaxPooling1D(Pooling1DConfig),
    AveragePooling1D(Pooling1DConfig),
    GlobalMaxPooling1D(serde_json::Value),
    GlobalAveragePooling1D(serde_json::Value),
    Flatten(serde_json::Value),
    Dense(DenseConfig),
    Dropout(serde_json::Value),
    Activation(ActivationConfig),
    BatchNormalization(BatchNormalizationConfig),
}

impl LayerSpec {
    /// The `(batch, length, channels)` shape declared on this layer, if any.
    pub fn declared_input_shape(&self) -> Option<&Vec<Option<usize>>> {
        match self {
            LayerSpec::InputLayer(shape) => shape.batch_input_shape.as_ref(),
            LayerSpec::Conv1D(config) => config.input.batch_input_shape.as_ref(),
            LayerSpec::Dense(config) => config.input.batch_input_shape.as_ref(),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum SequentialLayers {
    Named { layers: Vec<LayerSpec> },
    Bare(Vec<LayerSpec>),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct ModelJson {
    class_name: String,
    config: serde_json::Value,
}

///
/// A parsed sequential architecture: the input shape and the ordered layer specs.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Architecture {
    pub input_length: usize,
    pub input_channels: usize,
    pub layers: Vec<LayerSpec>,
}

impl Architecture {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: ModelJson = serde_json::from_str(json)?;
        if model.class_name != "Sequential" {
            return Err(ModelError::UnsupportedModel(model.class_name));
        }

        let layers = match serde_json::from_value::<SequentialLayers>(model.config)? {
            SequentialLayers::Named { layers } => layers,
            SequentialLayers::Bare(layers) => layers,
        };

        let shape = layers
            .first()
            .and_then(LayerSpec::declared_input_shape)
            .ok_or(ModelError::MissingInputShape)?;

        let (input_length, input_channels) = match shape.as_slice() {
            [_, Some(length), Some(channels)] => (*length, *channels),
            _ => {
                return Err(ModelError::InvalidInputShape {
                    expected: 4,
                    found: shape.clone(),
                });
            }
        };

        // the input layer carries no computation
        let layers = layers
            .into_iter()
            .filter(|l| !matches!(l, LayerSpec::InputLayer(_)))
            .collect();

        Ok(Architecture {
            input_length,
            input_channels,
            layers,
        })
    }
}

impl TryFrom<&Path> for Architecture {
    type Error = ModelError;

    fn try_from(path: &Path) -> Result<Self> {
        let json = read_to_string(path)?;
        Architecture::from_json(&json)
    }
}
