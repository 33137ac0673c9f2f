use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Gradient-descent rule used by [`MlpEstimator`](super::MlpEstimator).
///
/// Stateful rules keep one slot per layer index, allocated on first use.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Optimizer {
    Sgd,
    RmsProp(RmsProp),
    Adam(Adam),
}

impl Optimizer {
    pub fn sgd() -> Self {
        Optimizer::Sgd
    }

    pub fn rmsprop() -> Self {
        Optimizer::RmsProp(RmsProp::new(0.9, 1e-7))
    }

    pub fn adam() -> Self {
        Optimizer::Adam(Adam::new(0.9, 0.999, 1e-8))
    }

    /// Apply one update to the parameters of layer `layer`.
    pub fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        match self {
            Optimizer::Sgd => {
                weights.scaled_add(-learning_rate, weight_gradients);
                biases.scaled_add(-learning_rate, bias_gradients);
            }
            Optimizer::RmsProp(rms) => {
                rms.step(layer, weights, biases, weight_gradients, bias_gradients, learning_rate)
            }
            Optimizer::Adam(adam) => {
                adam.step(layer, weights, biases, weight_gradients, bias_gradients, learning_rate)
            }
        }
    }

    /// Drop accumulated moment estimates.
    pub fn reset(&mut self) {
        match self {
            Optimizer::Sgd => {}
            Optimizer::RmsProp(rms) => rms.slots.clear(),
            Optimizer::Adam(adam) => adam.slots.clear(),
        }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::rmsprop()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Moments {
    weights: Array2<f32>,
    biases: Array1<f32>,
}

impl Moments {
    fn zeros(weight_dim: (usize, usize), bias_dim: usize) -> Self {
        Moments {
            weights: Array2::zeros(weight_dim),
            biases: Array1::zeros(bias_dim),
        }
    }
}

fn slot<'a, T>(slots: &'a mut Vec<Option<T>>, layer: usize, init: impl FnOnce() -> T) -> &'a mut T {
    if slots.len() <= layer {
        slots.resize_with(layer + 1, || None);
    }
    slots[layer].get_or_insert_with(init)
}

/// RMSProp: divides the gradient by a running root-mean-square.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RmsProp {
    pub rho: f32,
    pub epsilon: f32,
    slots: Vec<Option<Moments>>,
}

impl RmsProp {
    pub fn new(rho: f32, epsilon: f32) -> Self {
        RmsProp { rho, epsilon, slots: Vec::new() }
    }

    fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        let (rho, eps) = (self.rho, self.epsilon);
        let (weight_dim, bias_dim) = (weights.dim(), biases.len());
        let mean_sq = slot(&mut self.slots, layer, || Moments::zeros(weight_dim, bias_dim));

        mean_sq.weights.zip_mut_with(weight_gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);
        mean_sq.biases.zip_mut_with(bias_gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);

        ndarray::Zip::from(weights)
            .and(weight_gradients)
            .and(&mean_sq.weights)
            .for_each(|w, &g, &v| *w -= learning_rate * g / (v.sqrt() + eps));
        ndarray::Zip::from(biases)
            .and(bias_gradients)
            .and(&mean_sq.biases)
            .for_each(|b, &g, &v| *b -= learning_rate * g / (v.sqrt() + eps));
    }
}

/// Adam with bias-corrected first and second moments, tracked per layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    slots: Vec<Option<AdamSlot>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct AdamSlot {
    m: Moments,
    v: Moments,
    t: i32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam { beta1, beta2, epsilon, slots: Vec::new() }
    }

    fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);
        let (weight_dim, bias_dim) = (weights.dim(), biases.len());
        let state = slot(&mut self.slots, layer, || AdamSlot {
            m: Moments::zeros(weight_dim, bias_dim),
            v: Moments::zeros(weight_dim, bias_dim),
            t: 0,
        });
        state.t += 1;
        let m_correction = 1.0 - beta1.powi(state.t);
        let v_correction = 1.0 - beta2.powi(state.t);

        state.m.weights.zip_mut_with(weight_gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        state.v.weights.zip_mut_with(weight_gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
        state.m.biases.zip_mut_with(bias_gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        state.v.biases.zip_mut_with(bias_gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        ndarray::Zip::from(weights)
            .and(&state.m.weights)
            .and(&state.v.weights)
            .for_each(|w, &m, &v| {
                *w -= learning_rate * (m / m_correction) / ((v / v_correction).sqrt() + eps)
            });
        ndarray::Zip::from(biases)
            .and(&state.m.biases)
            .and(&state.v.biases)
            .for_each(|b, &m, &v| {
                *b -= learning_rate * (m / m_correction) / ((v / v_correction).sqrt() + eps)
            });
    }
}
