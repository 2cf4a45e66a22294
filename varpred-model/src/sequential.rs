use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use log::{debug, info};
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView3, Axis, Ix1, Ix2, Ix3};
use ndarray_npy::NpzReader;
use rayon::prelude::*;

use crate::architecture::{Architecture, LayerSpec, Pooling1DConfig};
use crate::error::{ModelError, Result};
use crate::layers::{Layer, PoolKind, Shape, Tensor, Window};
use crate::model::Model;

///
/// Somewhere to look up named weight arrays, e.g. `conv1d/kernel`.
///
pub trait WeightSource {
    fn get(&mut self, name: &str) -> Result<ArrayD<f32>>;
}

/// Weights stored in a NumPy `.npz` archive, one array per `<layer>/<weight>` key.
pub struct NpzWeights {
    reader: NpzReader<File>,
    names: Vec<String>,
}

impl NpzWeights {
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = NpzReader::new(file).map_err(|e| ModelError::Weights(e.to_string()))?;
        let names = reader
            .names()
            .map_err(|e| ModelError::Weights(e.to_string()))?;
        Ok(NpzWeights { reader, names })
    }
}

impl WeightSource for NpzWeights {
    fn get(&mut self, name: &str) -> Result<ArrayD<f32>> {
        // numpy appends `.npy` to every array name in the archive
        let with_suffix = format!("{}.npy", name);
        let key = match self.names.iter().any(|n| *n == with_suffix) {
            true => with_suffix,
            false => name.to_string(),
        };
        self.reader
            .by_name(&key)
            .map_err(|e| ModelError::Weights(format!("{}: {}", name, e)))
    }
}

impl WeightSource for HashMap<String, ArrayD<f32>> {
    fn get(&mut self, name: &str) -> Result<ArrayD<f32>> {
        HashMap::get(self, name)
            .cloned()
            .ok_or_else(|| ModelError::Weights(format!("{} not found", name)))
    }
}

fn weight_1d<W: WeightSource>(weights: &mut W, name: &str, len: usize) -> Result<Array1<f32>> {
    let array = weights.get(name)?;
    let found = array.shape().to_vec();
    array
        .into_dimensionality::<Ix1>()
        .ok()
        .filter(|a| a.len() == len)
        .ok_or_else(|| ModelError::WeightShape {
            name: name.to_string(),
            expected: vec![len],
            found,
        })
}

fn weight_2d<W: WeightSource>(weights: &mut W, name: &str, rows: usize) -> Result<Array2<f32>> {
    let array = weights.get(name)?;
    let found = array.shape().to_vec();
    array
        .into_dimensionality::<Ix2>()
        .ok()
        .filter(|a| a.nrows() == rows)
        .ok_or_else(|| ModelError::WeightShape {
            name: name.to_string(),
            expected: vec![rows, found.last().copied().unwrap_or(0)],
            found,
        })
}

fn weight_3d<W: WeightSource>(
    weights: &mut W,
    name: &str,
    expected: [usize; 3],
) -> Result<Array3<f32>> {
    let array = weights.get(name)?;
    let found = array.shape().to_vec();
    array
        .into_dimensionality::<Ix3>()
        .ok()
        .filter(|a| a.shape() == &expected[..])
        .ok_or_else(|| ModelError::WeightShape {
            name: name.to_string(),
            expected: expected.to_vec(),
            found,
        })
}

fn pooling_window(config: &Pooling1DConfig) -> Window {
    let size = config.pool_size.value();
    Window {
        size,
        stride: config.strides.map(|s| s.value()).unwrap_or(size),
        dilation: 1,
        padding: config.padding,
    }
}

/// Resolve a layer spec into an evaluable layer. `input` is the shape it will be applied to.
fn build_layer<W: WeightSource>(spec: &LayerSpec, input: Shape, weights: &mut W) -> Result<Layer> {
    let layer = match spec {
        LayerSpec::InputLayer(_) | LayerSpec::Dropout(_) => Layer::Identity,
        LayerSpec::Conv1D(config) => {
            let kernel_size = config.kernel_size.value();
            let kernel = weight_3d(
                weights,
                &format!("{}/kernel", config.name),
                [kernel_size, input.last_dim(), config.filters],
            )?;
            let bias = match config.use_bias {
                true => Some(weight_1d(
                    weights,
                    &format!("{}/bias", config.name),
                    config.filters,
                )?),
                false => None,
            };
            Layer::Conv1D {
                kernel,
                bias,
                window: Window {
                    size: kernel_size,
                    stride: config.strides.value(),
                    dilation: config.dilation_rate.value(),
                    padding: config.padding,
                },
                activation: config.activation,
            }
        }
        LayerSpec::MaxPooling1D(config) => Layer::Pooling1D {
            kind: PoolKind::Max,
            window: pooling_window(config),
        },
        LayerSpec::AveragePooling1D(config) => Layer::Pooling1D {
            kind: PoolKind::Average,
            window: pooling_window(config),
        },
        LayerSpec::GlobalMaxPooling1D(_) => Layer::GlobalPooling1D {
            kind: PoolKind::Max,
        },
        LayerSpec::GlobalAveragePooling1D(_) => Layer::GlobalPooling1D {
            kind: PoolKind::Average,
        },
        LayerSpec::Flatten(_) => Layer::Flatten,
        LayerSpec::Dense(config) => {
            let kernel = weight_2d(
                weights,
                &format!("{}/kernel", config.name),
                input.last_dim(),
            )?;
            if kernel.ncols() != config.units {
                return Err(ModelError::WeightShape {
                    name: format!("{}/kernel", config.name),
                    expected: vec![input.last_dim(), config.units],
                    found: kernel.shape().to_vec(),
                });
            }
            let bias = match config.use_bias {
                true => Some(weight_1d(
                    weights,
                    &format!("{}/bias", config.name),
                    config.units,
                )?),
                false => None,
            };
            Layer::Dense {
                kernel,
                bias,
                activation: config.activation,
            }
        }
        LayerSpec::Activation(config) => Layer::Activation(config.activation),
        LayerSpec::BatchNormalization(config) => {
            let channels = input.last_dim();
            let name = &config.name;
            let mean = weight_1d(weights, &format!("{}/moving_mean", name), channels)?;
            let variance = weight_1d(weights, &format!("{}/moving_variance", name), channels)?;
            let gamma = match config.scale {
                true => weight_1d(weights, &format!("{}/gamma", name), channels)?,
                false => Array1::ones(channels),
            };
            let beta = match config.center {
                true => weight_1d(weights, &format!("{}/beta", name), channels)?,
                false => Array1::zeros(channels),
            };

            let multiplier = gamma / variance.mapv(|v| (v + config.epsilon).sqrt());
            let offset = beta - &mean * &multiplier;
            Layer::BatchNormalization { multiplier, offset }
        }
    };

    Ok(layer)
}

fn layer_label(spec: &LayerSpec, idx: usize) -> String {
    match spec {
        LayerSpec::Conv1D(config) => config.name.clone(),
        LayerSpec::Dense(config) => config.name.clone(),
        LayerSpec::BatchNormalization(config) => config.name.clone(),
        _ => format!("#{}", idx),
    }
}

///
/// A feed-forward stack of layers evaluated on the CPU. Samples of a batch are
/// scored in parallel on the current rayon thread pool.
///
#[derive(Debug, Clone)]
pub struct SequentialModel {
    input_length: usize,
    input_channels: usize,
    num_tasks: usize,
    layers: Vec<Layer>,
}

impl SequentialModel {
    ///
    /// Load a model from its serialized architecture (JSON) and weights (NPZ).
    ///
    /// # Arguments
    /// - architecture_path: path to the architecture JSON
    /// - weights_path: path to the `.npz` weights
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        architecture_path: P,
        weights_path: Q,
    ) -> Result<Self> {
        let architecture = Architecture::try_from(architecture_path.as_ref())?;
        let mut weights = NpzWeights::open(weights_path.as_ref())?;
        let model = SequentialModel::from_architecture(&architecture, &mut weights)?;

        info!(
            "Loaded model {} with {} layers: input length {}, {} tasks",
            architecture_path.as_ref().display(),
            model.layers.len(),
            model.input_length,
            model.num_tasks
        );

        Ok(model)
    }

    pub fn from_architecture<W: WeightSource>(
        architecture: &Architecture,
        weights: &mut W,
    ) -> Result<Self> {
        let mut shape = Shape::Sequence {
            steps: architecture.input_length,
            channels: architecture.input_channels,
        };
        let mut layers = Vec::with_capacity(architecture.layers.len());

        for (idx, spec) in architecture.layers.iter().enumerate() {
            let layer = build_layer(spec, shape, weights)?;
            shape = layer
                .output_shape(shape)
                .map_err(|reason| ModelError::LayerShape {
                    layer: layer_label(spec, idx),
                    reason,
                })?;
            debug!("Layer {} -> {:?}", layer_label(spec, idx), shape);
            layers.push(layer);
        }

        let num_tasks = match shape {
            Shape::Vector { features } => features,
            other => return Err(ModelError::NonVectorOutput(other.rank())),
        };

        Ok(SequentialModel {
            input_length: architecture.input_length,
            input_channels: architecture.input_channels,
            num_tasks,
            layers,
        })
    }

    fn forward(&self, sample: Array2<f32>) -> Array1<f32> {
        let output = self
            .layers
            .iter()
            .fold(Tensor::Sequence(sample), |x, layer| layer.forward(x));
        match output {
            Tensor::Vector(v) => v,
            // from_architecture guarantees a vector output
            Tensor::Sequence(s) => Array1::from_iter(s),
        }
    }
}

impl Model for SequentialModel {
    fn input_length(&self) -> usize {
        self.input_length
    }

    fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    fn predict(&self, batch: ArrayView3<f32>) -> Result<Array2<f32>> {
        let (n, length, channels) = batch.dim();
        if length != self.input_length || channels != self.input_channels {
            return Err(ModelError::BatchShape {
                found: batch.shape().to_vec(),
                length: self.input_length,
                channels: self.input_channels,
            });
        }

        let rows: Vec<Array1<f32>> = (0..n)
            .into_par_iter()
            .map(|i| self.forward(batch.index_axis(Axis(0), i).to_owned()))
            .collect();

        let mut scores = Array2::<f32>::zeros((n, self.num_tasks));
        for (mut row, values) in scores.axis_iter_mut(Axis(0)).zip(rows) {
            row.assign(&values);
        }

        debug!("Scored batch of {} sequences", n);

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array, array};
    use ndarray_npy::NpzWriter;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::encoding::encode_batch;

    const TINY_CNN: &str = r#"{
        "class_name": "Sequential",
        "config": {
            "name": "tiny",
            "layers": [
                {"class_name": "InputLayer", "config": {"batch_input_shape": [null, 4, 4]}},
                {"class_name": "Conv1D", "config": {"name": "conv", "filters": 1, "kernel_size": [1], "activation": "linear", "use_bias": false}},
                {"class_name": "GlobalMaxPooling1D", "config": {"name": "gmp"}},
                {"class_name": "Dense", "config": {"name": "out", "units": 2, "activation": "linear"}}
            ]
        }
    }"#;

    /// conv scores each base: A=1, C=2, G=3, T=4; max over the sequence; then
    /// two tasks: identity and negated plus one.
    fn tiny_weights() -> HashMap<String, ArrayD<f32>> {
        let mut weights = HashMap::new();
        weights.insert(
            "conv/kernel".to_string(),
            Array::from_shape_vec((1, 4, 1), vec![1.0, 2.0, 3.0, 4.0])
                .unwrap()
                .into_dyn(),
        );
        weights.insert("out/kernel".to_string(), array![[1.0, -1.0]].into_dyn());
        weights.insert("out/bias".to_string(), array![0.0, 1.0].into_dyn());
        weights
    }

    #[rstest]
    fn test_from_architecture_and_predict() {
        let architecture = Architecture::from_json(TINY_CNN).unwrap();
        let model = SequentialModel::from_architecture(&architecture, &mut tiny_weights()).unwrap();
        assert_eq!(model.input_length(), 4);
        assert_eq!(model.num_tasks(), 2);

        let batch = encode_batch(&["AAAA", "ACGA", "CTCC"], 4).unwrap();
        let scores = model.predict(batch.view()).unwrap();

        assert_eq!(scores, array![[1.0, 0.0], [3.0, -2.0], [4.0, -3.0]]);
    }

    #[rstest]
    fn test_predict_rejects_wrong_length() {
        let architecture = Architecture::from_json(TINY_CNN).unwrap();
        let model = SequentialModel::from_architecture(&architecture, &mut tiny_weights()).unwrap();

        let batch = encode_batch(&["AAAAA"], 5).unwrap();
        assert!(matches!(
            model.predict(batch.view()),
            Err(ModelError::BatchShape { .. })
        ));
    }

    #[rstest]
    fn test_missing_weight() {
        let architecture = Architecture::from_json(TINY_CNN).unwrap();
        let mut weights = tiny_weights();
        weights.remove("out/bias");

        assert!(matches!(
            SequentialModel::from_architecture(&architecture, &mut weights),
            Err(ModelError::Weights(_))
        ));
    }

    #[rstest]
    fn test_wrong_weight_shape() {
        let architecture = Architecture::from_json(TINY_CNN).unwrap();
        let mut weights = tiny_weights();
        weights.insert("out/kernel".to_string(), array![[1.0, -1.0, 0.0]].into_dyn());

        assert!(matches!(
            SequentialModel::from_architecture(&architecture, &mut weights),
            Err(ModelError::WeightShape { .. })
        ));
    }

    #[rstest]
    fn test_sequence_output_is_rejected() {
        let json = r#"{"class_name": "Sequential", "config": {"layers": [
            {"class_name": "InputLayer", "config": {"batch_input_shape": [null, 4, 4]}},
            {"class_name": "Activation", "config": {"activation": "relu"}}
        ]}}"#;
        let architecture = Architecture::from_json(json).unwrap();
        assert!(matches!(
            SequentialModel::from_architecture(
                &architecture,
                &mut HashMap::<String, ArrayD<f32>>::new()
            ),
            Err(ModelError::NonVectorOutput(2))
        ));
    }

    #[rstest]
    fn test_batch_normalization_folding() {
        let json = r#"{"class_name": "Sequential", "config": {"layers": [
            {"class_name": "InputLayer", "config": {"batch_input_shape": [null, 1, 4]}},
            {"class_name": "Flatten", "config": {}},
            {"class_name": "BatchNormalization", "config": {"name": "bn", "epsilon": 0.0}}
        ]}}"#;
        let architecture = Architecture::from_json(json).unwrap();
        let mut weights: HashMap<String, ArrayD<f32>> = HashMap::new();
        weights.insert("bn/gamma".to_string(), array![2.0, 2.0, 2.0, 2.0].into_dyn());
        weights.insert("bn/beta".to_string(), array![1.0, 1.0, 1.0, 1.0].into_dyn());
        weights.insert("bn/moving_mean".to_string(), array![0.5, 0.5, 0.5, 0.5].into_dyn());
        weights.insert("bn/moving_variance".to_string(), array![4.0, 4.0, 4.0, 4.0].into_dyn());

        let model = SequentialModel::from_architecture(&architecture, &mut weights).unwrap();
        let scores = model.predict(encode_batch(&["G"], 1).unwrap().view()).unwrap();

        // (x - 0.5) / 2 * 2 + 1
        assert_eq!(scores, array![[0.5, 0.5, 1.5, 0.5]]);
    }

    #[rstest]
    fn test_load_from_files() {
        let tempdir = tempfile::tempdir().unwrap();
        let architecture_path = tempdir.path().join("model.json");
        let weights_path = tempdir.path().join("weights.npz");

        std::fs::write(&architecture_path, TINY_CNN).unwrap();
        let mut npz = NpzWriter::new(File::create(&weights_path).unwrap());
        for (name, array) in tiny_weights() {
            npz.add_array(name, &array).unwrap();
        }
        npz.finish().unwrap();

        let model = SequentialModel::load(&architecture_path, &weights_path).unwrap();
        let scores = model
            .predict(encode_batch(&["GGGG"], 4).unwrap().view())
            .unwrap();

        assert_eq!(scores, array![[3.0, -2.0]]);
    }
}
