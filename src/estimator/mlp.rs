use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::activation::Activation;
use super::dense::DenseLayer;
use super::optimizer::Optimizer;
use super::{check_state_batch, ValueEstimator};
use crate::error::{Result, RlError};

/// Parameters of one dense layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// All parameters of an [`MlpEstimator`], in layer order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MlpWeights {
    pub layers: Vec<LayerWeights>,
}

/// Multilayer perceptron action-value estimator trained on mean squared error.
///
/// # Examples
///
/// ```
/// use snake_rl::estimator::{MlpEstimator, Optimizer, ValueEstimator};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let net = MlpEstimator::new(&[25, 256, 4], Optimizer::rmsprop(), 0.001, &mut rng).unwrap();
/// assert_eq!(net.state_dim(), 25);
/// assert_eq!(net.num_actions(), 4);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MlpEstimator {
    layers: Vec<DenseLayer>,
    optimizer: Optimizer,
    learning_rate: f32,
}

impl MlpEstimator {
    /// ReLU on every hidden layer, linear output.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        optimizer: Optimizer,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(RlError::invalid_parameter(
                "layer_sizes",
                "must contain at least input and output sizes",
            ));
        }
        let mut activations = vec![Activation::Relu; layer_sizes.len() - 2];
        activations.push(Activation::Linear);
        Self::with_activations(layer_sizes, &activations, optimizer, learning_rate, rng)
    }

    pub fn with_activations<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: Optimizer,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 || layer_sizes.iter().any(|&size| size == 0) {
            return Err(RlError::invalid_parameter(
                "layer_sizes",
                format!("need at least two non-zero sizes, got {:?}", layer_sizes),
            ));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(RlError::invalid_parameter(
                "activations",
                format!("expected {}, got {}", layer_sizes.len() - 1, activations.len()),
            ));
        }
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(RlError::invalid_parameter(
                "learning_rate",
                format!("must be positive and finite, got {}", learning_rate),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations)
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, rng))
            .collect();

        Ok(MlpEstimator { layers, optimizer, learning_rate })
    }

    /// Two independently initialized estimators of the same architecture,
    /// intended as an online/target pair.
    pub fn pair<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        optimizer: Optimizer,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<(Self, Self)> {
        let online = Self::new(layer_sizes, optimizer.clone(), learning_rate, rng)?;
        let target = Self::new(layer_sizes, optimizer, learning_rate, rng)?;
        Ok((online, target))
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }
}

impl ValueEstimator for MlpEstimator {
    type Weights = MlpWeights;

    fn state_dim(&self) -> usize {
        self.layers[0].input_size()
    }

    fn num_actions(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_state_batch(states, self.state_dim())?;
        let mut current = states.to_owned();
        for layer in &self.layers {
            current = layer.forward(current.view());
        }
        Ok(current)
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        check_state_batch(states, self.state_dim())?;
        if targets.dim() != (states.nrows(), self.num_actions()) {
            return Err(RlError::dimension_mismatch(
                format!("targets ({}, {})", states.nrows(), self.num_actions()),
                format!("targets {:?}", targets.shape()),
            ));
        }
        if states.nrows() == 0 {
            return Ok(0.0);
        }

        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current = states.to_owned();
        for layer in &self.layers {
            let (outputs, cache) = layer.forward_cached(current.view());
            caches.push(cache);
            current = outputs;
        }

        let errors = &current - &targets;
        let loss = errors.mapv(|e| e * e).mean().unwrap_or(0.0);

        // d(mean squared error)/d(output)
        let scale = 2.0 / errors.len() as f32;
        let mut upstream = errors * scale;

        for (index, (layer, cache)) in self.layers.iter_mut().zip(&caches).enumerate().rev() {
            let (input_errors, weight_gradients, bias_gradients) = layer.backward(cache, upstream.view());
            self.optimizer.step(
                index,
                &mut layer.weights,
                &mut layer.biases,
                &weight_gradients,
                &bias_gradients,
                self.learning_rate,
            );
            upstream = input_errors;
        }

        Ok(loss)
    }

    fn weights(&self) -> MlpWeights {
        MlpWeights {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerWeights {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    fn set_weights(&mut self, weights: &MlpWeights) -> Result<()> {
        if weights.layers.len() != self.layers.len() {
            return Err(RlError::dimension_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} layers", weights.layers.len()),
            ));
        }
        for (index, (layer, incoming)) in self.layers.iter().zip(&weights.layers).enumerate() {
            if layer.weights.dim() != incoming.weights.dim() || layer.biases.len() != incoming.biases.len() {
                return Err(RlError::dimension_mismatch(
                    format!("layer {} weights {:?}", index, layer.weights.dim()),
                    format!("layer {} weights {:?}", index, incoming.weights.dim()),
                ));
            }
        }

        for (layer, incoming) in self.layers.iter_mut().zip(&weights.layers) {
            layer.weights.assign(&incoming.weights);
            layer.biases.assign(&incoming.biases);
        }
        Ok(())
    }
}
