use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayViewMut1, Axis};

use crate::architecture::{Activation, Padding};

/// Activations flowing between layers for a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// `(steps, channels)`
    Sequence(Array2<f32>),
    /// `(features,)`
    Vector(Array1<f32>),
}

/// Shape of a [Tensor] without its batch dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sequence { steps: usize, channels: usize },
    Vector { features: usize },
}

impl Shape {
    pub fn rank(&self) -> usize {
        match self {
            Shape::Sequence { .. } => 2,
            Shape::Vector { .. } => 1,
        }
    }

    /// Size of the last axis.
    pub fn last_dim(&self) -> usize {
        match self {
            Shape::Sequence { channels, .. } => *channels,
            Shape::Vector { features } => *features,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Max,
    Average,
}

/// Sliding window geometry shared by convolutions and pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub size: usize,
    pub stride: usize,
    pub dilation: usize,
    pub padding: Padding,
}

impl Window {
    fn span(&self) -> usize {
        self.dilation * (self.size - 1) + 1
    }

    /// Number of output steps and left padding for `steps` input steps, or `None`
    /// when the window doesn't fit.
    pub fn output_steps(&self, steps: usize) -> Option<(usize, usize)> {
        if self.size == 0 || self.stride == 0 || self.dilation == 0 {
            return None;
        }
        match self.padding {
            Padding::Valid => {
                if steps < self.span() {
                    return None;
                }
                Some(((steps - self.span()) / self.stride + 1, 0))
            }
            Padding::Same => {
                if steps == 0 {
                    return None;
                }
                let out = steps.div_ceil(self.stride);
                let total = ((out - 1) * self.stride + self.span()).saturating_sub(steps);
                Some((out, total / 2))
            }
        }
    }

    /// Input step indices covered by output step `o`, skipping padding.
    fn taps(&self, o: usize, pad_left: usize, steps: usize) -> impl Iterator<Item = (usize, usize)> {
        let origin = (o * self.stride) as i64 - pad_left as i64;
        let dilation = self.dilation as i64;
        (0..self.size).filter_map(move |k| {
            let i = origin + k as i64 * dilation;
            (i >= 0 && (i as usize) < steps).then_some((k, i as usize))
        })
    }
}

///
/// A layer with its weights, ready for evaluation.
///
#[derive(Debug, Clone)]
pub enum Layer {
    Conv1D {
        /// `(kernel_size, in_channels, filters)`
        kernel: Array3<f32>,
        bias: Option<Array1<f32>>,
        window: Window,
        activation: Activation,
    },
    Pooling1D {
        kind: PoolKind,
        window: Window,
    },
    GlobalPooling1D {
        kind: PoolKind,
    },
    Flatten,
    Dense {
        /// `(in_features, units)`
        kernel: Array2<f32>,
        bias: Option<Array1<f32>>,
        activation: Activation,
    },
    Activation(Activation),
    /// Inference-time batch normalization folded into a per-channel affine map.
    BatchNormalization {
        multiplier: Array1<f32>,
        offset: Array1<f32>,
    },
    Identity,
}

impl Layer {
    ///
    /// Output shape of the layer for a given input shape, or a description of why
    /// the layer can't be applied.
    ///
    pub fn output_shape(&self, input: Shape) -> Result<Shape, String> {
        match (self, input) {
            (Layer::Conv1D { kernel, window, .. }, Shape::Sequence { steps, channels }) => {
                if kernel.shape()[1] != channels {
                    return Err(format!(
                        "kernel expects {} input channels, got {}",
                        kernel.shape()[1],
                        channels
                    ));
                }
                let (out, _) = window
                    .output_steps(steps)
                    .ok_or_else(|| format!("window doesn't fit {} steps", steps))?;
                Ok(Shape::Sequence {
                    steps: out,
                    channels: kernel.shape()[2],
                })
            }
            (Layer::Pooling1D { window, .. }, Shape::Sequence { steps, channels }) => {
                let (out, _) = window
                    .output_steps(steps)
                    .ok_or_else(|| format!("pool doesn't fit {} steps", steps))?;
                Ok(Shape::Sequence {
                    steps: out,
                    channels,
                })
            }
            (Layer::GlobalPooling1D { .. }, Shape::Sequence { channels, .. }) => {
                Ok(Shape::Vector { features: channels })
            }
            (Layer::Flatten, Shape::Sequence { steps, channels }) => Ok(Shape::Vector {
                features: steps * channels,
            }),
            (Layer::Flatten, shape @ Shape::Vector { .. }) => Ok(shape),
            (Layer::Dense { kernel, .. }, shape) => {
                if kernel.nrows() != shape.last_dim() {
                    return Err(format!(
                        "kernel expects {} input features, got {}",
                        kernel.nrows(),
                        shape.last_dim()
                    ));
                }
                Ok(match shape {
                    Shape::Sequence { steps, .. } => Shape::Sequence {
                        steps,
                        channels: kernel.ncols(),
                    },
                    Shape::Vector { .. } => Shape::Vector {
                        features: kernel.ncols(),
                    },
                })
            }
            (Layer::BatchNormalization { multiplier, .. }, shape) => {
                if multiplier.len() != shape.last_dim() {
                    return Err(format!(
                        "normalizes {} channels, got {}",
                        multiplier.len(),
                        shape.last_dim()
                    ));
                }
                Ok(shape)
            }
            (Layer::Activation(_), shape) | (Layer::Identity, shape) => Ok(shape),
            (_, shape) => Err(format!("needs a sequence input, got rank {}", shape.rank())),
        }
    }

    ///
    /// Apply the layer to a single sample. Shapes must have been checked with
    /// [Layer::output_shape] beforehand.
    ///
    pub fn forward(&self, input: Tensor) -> Tensor {
        match (self, input) {
            (
                Layer::Conv1D {
                    kernel,
                    bias,
                    window,
                    activation,
                },
                Tensor::Sequence(x),
            ) => {
                let mut out = conv1d(x.view(), kernel, bias.as_ref(), window);
                activate_sequence(*activation, &mut out);
                Tensor::Sequence(out)
            }
            (Layer::Pooling1D { kind, window }, Tensor::Sequence(x)) => {
                Tensor::Sequence(pool1d(x.view(), *kind, window))
            }
            (Layer::GlobalPooling1D { kind }, Tensor::Sequence(x)) => {
                let pooled = match kind {
                    PoolKind::Max => x.fold_axis(Axis(0), f32::NEG_INFINITY, |a, b| a.max(*b)),
                    PoolKind::Average => x
                        .mean_axis(Axis(0))
                        .unwrap_or_else(|| Array1::zeros(x.ncols())),
                };
                Tensor::Vector(pooled)
            }
            (Layer::Flatten, Tensor::Sequence(x)) => {
                let flat: Vec<f32> = x.iter().copied().collect();
                Tensor::Vector(Array1::from(flat))
            }
            (
                Layer::Dense {
                    kernel,
                    bias,
                    activation,
                },
                tensor,
            ) => match tensor {
                Tensor::Vector(x) => {
                    let mut out = x.dot(kernel);
                    if let Some(bias) = bias {
                        out += bias;
                    }
                    activate_vector(*activation, &mut out);
                    Tensor::Vector(out)
                }
                Tensor::Sequence(x) => {
                    let mut out = x.dot(kernel);
                    if let Some(bias) = bias {
                        out += bias;
                    }
                    activate_sequence(*activation, &mut out);
                    Tensor::Sequence(out)
                }
            },
            (Layer::Activation(activation), Tensor::Vector(mut x)) => {
                activate_vector(*activation, &mut x);
                Tensor::Vector(x)
            }
            (Layer::Activation(activation), Tensor::Sequence(mut x)) => {
                activate_sequence(*activation, &mut x);
                Tensor::Sequence(x)
            }
            (Layer::BatchNormalization { multiplier, offset }, Tensor::Vector(x)) => {
                Tensor::Vector(x * multiplier + offset)
            }
            (Layer::BatchNormalization { multiplier, offset }, Tensor::Sequence(x)) => {
                Tensor::Sequence(x * multiplier + offset)
            }
            (_, tensor) => tensor,
        }
    }
}

fn conv1d(
    x: ArrayView2<f32>,
    kernel: &Array3<f32>,
    bias: Option<&Array1<f32>>,
    window: &Window,
) -> Array2<f32> {
    let steps = x.nrows();
    let filters = kernel.shape()[2];
    let (out_steps, pad_left) = window.output_steps(steps).unwrap_or((0, 0));

    let mut out = Array2::<f32>::zeros((out_steps, filters));
    for o in 0..out_steps {
        let mut row = out.row_mut(o);
        for (k, i) in window.taps(o, pad_left, steps) {
            // (in_channels,) . (in_channels, filters)
            row += &x.row(i).dot(&kernel.index_axis(Axis(0), k));
        }
        if let Some(bias) = bias {
            row += bias;
        }
    }
    out
}

fn pool1d(x: ArrayView2<f32>, kind: PoolKind, window: &Window) -> Array2<f32> {
    let steps = x.nrows();
    let (out_steps, pad_left) = window.output_steps(steps).unwrap_or((0, 0));

    let mut out = Array2::<f32>::zeros((out_steps, x.ncols()));
    for o in 0..out_steps {
        let taps: Vec<usize> = window.taps(o, pad_left, steps).map(|(_, i)| i).collect();
        for c in 0..x.ncols() {
            let values = taps.iter().map(|i| x[[*i, c]]);
            out[[o, c]] = match kind {
                PoolKind::Max => values.fold(f32::NEG_INFINITY, f32::max),
                PoolKind::Average => values.sum::<f32>() / taps.len().max(1) as f32,
            };
        }
    }
    out
}

fn apply_scalar(activation: Activation, v: f32) -> f32 {
    match activation {
        Activation::Linear | Activation::Softmax => v,
        Activation::Relu => v.max(0.0),
        Activation::Sigmoid => 1.0 / (1.0 + (-v).exp()),
        Activation::Tanh => v.tanh(),
        Activation::Softplus => v.exp().ln_1p(),
    }
}

fn activate_vector(activation: Activation, x: &mut Array1<f32>) {
    x.mapv_inplace(|v| apply_scalar(activation, v));
    if activation == Activation::Softmax {
        softmax(x.view_mut());
    }
}

fn activate_sequence(activation: Activation, x: &mut Array2<f32>) {
    x.mapv_inplace(|v| apply_scalar(activation, v));
    if activation == Activation::Softmax {
        softmax_rows(x);
    }
}

fn softmax_rows(x: &mut Array2<f32>) {
    for row in x.rows_mut() {
        softmax(row);
    }
}

fn softmax(mut x: ArrayViewMut1<f32>) {
    let max = x.fold(f32::NEG_INFINITY, |a, b| a.max(*b));
    x.mapv_inplace(|v| (v - max).exp());
    let sum = x.sum();
    if sum > 0.0 {
        x /= sum;
    }
}
