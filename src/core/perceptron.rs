//! A `Perceptron` is a single linear threshold unit recognizing one digit class.
//!
//! It computes a weighted sum of its inputs and thresholds at zero. Ten such units,
//! one per class, form the one-vs-rest bank driven by the `Trainer`.
//!
//! Mechanism:
//! - Owns a weight vector of input dimensionality, plus one trailing bias weight
//!   when the bias term is modeled. The bias weight is fed by an implicit input of 1,
//!   so the decision boundary can be offset from the origin.
//! - Error-driven learning: for each presented sample the unit compares its binary
//!   decision against whether the sample carries its own label, and moves the weights
//!   by `alpha * error * input`. A correctly classified sample produces an error of
//!   zero and leaves the weights untouched.
//! - The learning rate decays on a deterministic schedule as a function of how many
//!   decay steps have been applied, and clamps at zero.
//!
//! Inference:
//! - `score` is the raw weighted sum and is what the driver compares across the bank
//!   for multi-class decisions.
//! - `predict` thresholds the score at zero and is only used to form the training
//!   error signal.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Controls how the learning rate shrinks after each training epoch.
///
/// The decrement applied at decay step `n` is `step * growth^n`, so a `growth`
/// below 1 tapers the decay off over time while a `growth` of 1 keeps it linear.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecayOptions {
    /// Base amount subtracted from the learning rate per decay step.
    pub step: f32,

    /// Per-step multiplier applied to the base amount.
    pub growth: f32,
}

impl Default for DecayOptions {
    fn default() -> Self {
        Self {
            step: 0.05,
            growth: 0.9,
        }
    }
}

/// A binary linear classifier for a single class of the one-vs-rest bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perceptron {
    /// The class label this unit recognizes.
    label: usize,

    /// Learning rate for weight updates. Monotonically non-increasing.
    alpha: f32,

    /// Weight vector. Input dimensionality, plus one trailing bias weight if
    /// `bias` is set.
    weights: Vec<f32>,

    /// Whether the last weight is a bias weight fed by an implicit input of 1.
    bias: bool,

    /// Decay schedule for the learning rate.
    decay: DecayOptions,

    /// The number of decay steps applied so far.
    decay_steps: u32,
}

impl Perceptron {
    /// Creates a new `Perceptron` with zeroed weights.
    ///
    /// # Arguments
    ///
    /// * `label` - The class this unit recognizes.
    /// * `input_size` - The number of input features (bias weight excluded).
    /// * `alpha` - The initial learning rate.
    /// * `bias` - Whether to append a bias weight.
    /// * `decay` - The learning rate decay schedule.
    #[inline]
    pub fn new(label: usize, input_size: usize, alpha: f32, bias: bool, decay: DecayOptions) -> Self {
        Self {
            label,
            alpha,
            weights: vec![0.0; input_size + bias as usize],
            bias,
            decay,
            decay_steps: 0,
        }
    }

    /// Replaces the zeroed weights with draws from a normal distribution of the
    /// given standard deviation, centered at zero.
    #[inline]
    pub fn randomize_weights<R: Rng>(&mut self, std_dev: f32, rng: &mut R) {
        for weight in &mut self.weights {
            let z: f32 = rng.sample(StandardNormal);
            *weight = std_dev * z;
        }
    }

    /// Returns the raw weighted sum of the input, including the bias weight
    /// (with its implicit input of 1) when the bias term is modeled. Pure.
    ///
    /// This is the value the driver compares across the bank for multi-class
    /// decisions.
    #[inline]
    pub fn score(&self, input: &[f32]) -> f32 {
        let dot: f32 = self
            .weights
            .iter()
            .zip(input)
            .map(|(weight, x)| weight * x)
            .sum();

        if self.bias {
            dot + self.weights[self.weights.len() - 1]
        } else {
            dot
        }
    }

    /// Returns the binary decision: whether the score exceeds zero.
    ///
    /// Only used to form the training error signal; multi-class prediction
    /// compares raw scores instead.
    #[inline]
    pub fn predict(&self, input: &[f32]) -> bool {
        self.score(input) > 0.0
    }

    /// Presents one labeled sample for an online weight update.
    ///
    /// The target is 1 if the sample carries this unit's own label and 0
    /// otherwise; the weights move by `alpha * (target - prediction) * input`,
    /// with the bias weight moved by the implicit input of 1. A correctly
    /// classified sample leaves the weights exactly unchanged.
    #[inline]
    pub fn update(&mut self, input: &[f32], label: usize) {
        let target = (label == self.label) as i32;
        let predicted = self.predict(input) as i32;
        let error = target - predicted;

        if error == 0 {
            return;
        }

        let delta = self.alpha * error as f32;

        for (weight, x) in self.weights.iter_mut().zip(input) {
            *weight += delta * x;
        }

        if self.bias {
            let last = self.weights.len() - 1;
            self.weights[last] += delta;
        }
    }

    /// Applies one decay step to the learning rate.
    ///
    /// The rate shrinks by `step * growth^n` where `n` counts prior decay steps,
    /// clamps at zero, and never increases.
    #[inline]
    pub fn decay_learning_rate(&mut self) {
        let decrement = (self.decay.step * self.decay.growth.powi(self.decay_steps as i32)).max(0.0);
        self.alpha = (self.alpha - decrement).max(0.0);
        self.decay_steps += 1;
    }

    /// The class label this unit recognizes.
    #[inline]
    pub fn label(&self) -> usize {
        self.label
    }

    /// The current learning rate.
    #[inline]
    pub fn learning_rate(&self) -> f32 {
        self.alpha
    }

    /// The number of input features this unit accepts (bias weight excluded).
    #[inline]
    pub fn input_size(&self) -> usize {
        self.weights.len() - self.bias as usize
    }

    /// Returns a reference to the weight vector.
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_update_from_zero_weights() {
        let mut p = Perceptron::new(3, 2, 1.0, false, DecayOptions::default());

        // score is 0, prediction 0, target 1: the error of 1 moves the weights
        // by exactly the input.
        p.update(&[1.0, 1.0], 3);

        assert_eq!(p.weights(), &[1.0, 1.0]);
    }

    #[test]
    fn update_is_noop_when_correct() {
        let mut p = Perceptron::new(0, 2, 1.0, true, DecayOptions::default());

        p.update(&[1.0, 0.5], 0);
        let trained = p.weights().to_vec();

        // Now correctly classified: target 1, prediction 1.
        assert!(p.predict(&[1.0, 0.5]));
        p.update(&[1.0, 0.5], 0);
        assert_eq!(p.weights(), trained.as_slice());

        // Correct rejection of another class: target 0, prediction 0.
        assert!(!p.predict(&[-1.0, -1.0]));
        p.update(&[-1.0, -1.0], 7);
        assert_eq!(p.weights(), trained.as_slice());
    }

    #[test]
    fn misprediction_moves_weights_down() {
        let mut p = Perceptron::new(0, 2, 0.5, false, DecayOptions::default());
        p.update(&[1.0, 1.0], 0);

        // The unit now fires on this input, but the sample belongs to class 1:
        // target 0, prediction 1, error -1.
        p.update(&[1.0, 1.0], 1);

        assert_eq!(p.weights(), &[0.5, 0.5]);
    }

    #[test]
    fn bias_weight_tracks_implicit_input() {
        let mut p = Perceptron::new(2, 2, 1.0, true, DecayOptions::default());

        p.update(&[1.0, 0.5], 2);

        assert_eq!(p.weights(), &[1.0, 0.5, 1.0]);
        assert_eq!(p.input_size(), 2);
        // The bias weight contributes through its implicit input of 1.
        assert_eq!(p.score(&[0.0, 0.0]), 1.0);
    }

    #[test]
    fn decay_is_monotone_and_clamps_at_zero() {
        let decay = DecayOptions {
            step: 0.03,
            growth: 1.0,
        };
        let mut p = Perceptron::new(0, 4, 0.1, false, decay);

        let mut previous = p.learning_rate();
        for _ in 0..100 {
            p.decay_learning_rate();
            let rate = p.learning_rate();
            assert!(rate <= previous);
            assert!(rate >= 0.0);
            previous = rate;
        }

        // 0.1 / 0.03 decay steps exhaust the rate; it must sit at exactly zero.
        assert_eq!(p.learning_rate(), 0.0);
    }

    #[test]
    fn tapered_decay_stays_deterministic() {
        let decay = DecayOptions {
            step: 0.05,
            growth: 0.5,
        };
        let mut a = Perceptron::new(0, 1, 1.0, false, decay);
        let mut b = Perceptron::new(1, 1, 1.0, false, decay);

        for _ in 0..8 {
            a.decay_learning_rate();
            b.decay_learning_rate();
        }

        // The schedule depends only on the call count.
        assert_eq!(a.learning_rate(), b.learning_rate());
        assert!(a.learning_rate() > 0.0);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut p = Perceptron::new(5, 3, 0.8, true, DecayOptions::default());
        p.update(&[1.0, 0.0, 0.5], 5);
        p.decay_learning_rate();

        let bytes = bincode::serialize(&p).unwrap();
        let restored: Perceptron = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.label(), p.label());
        assert_eq!(restored.learning_rate(), p.learning_rate());
        assert_eq!(restored.weights(), p.weights());
    }

    #[test]
    fn randomized_weights_are_seed_reproducible() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut a = Perceptron::new(0, 16, 1.0, true, DecayOptions::default());
        let mut b = Perceptron::new(0, 16, 1.0, true, DecayOptions::default());

        a.randomize_weights(5.0, &mut StdRng::seed_from_u64(11));
        b.randomize_weights(5.0, &mut StdRng::seed_from_u64(11));

        assert_eq!(a.weights(), b.weights());
        assert!(a.weights().iter().any(|&w| w != 0.0));
    }
}
