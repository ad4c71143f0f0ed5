//! The `Trainer` drives one-vs-rest training and evaluation of a perceptron bank.
//!
//! It owns one `Perceptron` per digit class, the train/validation split, and a
//! single seeded random number generator, and runs the online training loop:
//! - Splits the raw sample sequence into a leading validation fraction and the
//!   remaining training subset. The two subsets are disjoint and exhaustive.
//! - Each epoch draws one uniformly random permutation of the training subset and
//!   presents every sample, in that order, to every classifier in the bank, so all
//!   classifiers observe an identical presentation order.
//! - After each pass it measures validation accuracy with an inference-only
//!   winner-take-all sweep, decays every learning rate one step, and stops early
//!   once the epoch-over-epoch accuracy change falls below the tolerance.
//!
//! The early stop is a heuristic: a flat validation curve says the bank has stopped
//! moving, not that the weights are optimal.
//!
//! Multi-class prediction:
//! - The predicted class for a sample is the index of the classifier with the
//!   highest raw score. Ties keep the lowest index. The running best starts at
//!   negative infinity, so a bank whose best score is non-positive still elects
//!   a winner.
//!
//! The trainer performs no I/O. Per-epoch validation accuracy is returned in a
//! `TrainingReport` for the caller to log or persist.

use super::{
    perceptron::{DecayOptions, Perceptron},
    sample::Sample,
};
use crate::error::{Error, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The strategy used to initialize classifier weights before training.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum WeightInit {
    /// All weights start at zero.
    Zero,

    /// Weights are drawn from a zero-mean normal distribution with the given
    /// standard deviation.
    Normal { std_dev: f32 },
}

/// Configuration for a training run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainerOptions {
    /// The number of classes, and therefore classifiers in the bank.
    pub num_classes: usize,

    /// Fraction of the raw sample sequence held out (from the front) for
    /// per-epoch validation.
    pub validation_fraction: f32,

    /// The initial learning rate shared by every classifier.
    pub learning_rate: f32,

    /// The learning rate decay schedule.
    pub decay: DecayOptions,

    /// The maximum number of training epochs.
    pub max_epochs: usize,

    /// Early-stop threshold on the epoch-over-epoch change in validation
    /// accuracy (percentage points).
    pub tolerance: f32,

    /// Whether each classifier carries a bias weight.
    pub bias: bool,

    /// How classifier weights are initialized.
    pub weight_init: WeightInit,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            num_classes: 10,
            validation_fraction: 0.1,
            learning_rate: 1.0,
            decay: DecayOptions::default(),
            max_epochs: 200,
            tolerance: 1e-5,
            bias: true,
            weight_init: WeightInit::Zero,
        }
    }
}

/// The outcome of a training run: the validation accuracy after every epoch,
/// and whether the early stop fired before the epoch limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Validation accuracy (percent) after each completed epoch.
    pub epoch_accuracies: Vec<f32>,

    /// True if training stopped because the accuracy curve flattened.
    pub converged: bool,
}

impl TrainingReport {
    /// The number of epochs that actually ran.
    #[inline]
    pub fn epochs(&self) -> usize {
        self.epoch_accuracies.len()
    }

    /// The validation accuracy after the final epoch, if any epoch ran.
    #[inline]
    pub fn final_accuracy(&self) -> Option<f32> {
        self.epoch_accuracies.last().copied()
    }
}

/// Returns the index of the classifier with the strictly highest raw score.
/// Equal scores keep the earlier classifier, so ties break toward the lowest
/// class index.
#[inline]
pub fn winner_take_all(bank: &[Perceptron], input: &[f32]) -> usize {
    let mut best_score = f32::NEG_INFINITY;
    let mut best_label = 0;

    for (index, perceptron) in bank.iter().enumerate() {
        let score = perceptron.score(input);

        if score > best_score {
            best_score = score;
            best_label = index;
        }
    }

    best_label
}

/// Winner-take-all accuracy (percent) of the bank over a sample sequence.
fn accuracy_of(bank: &[Perceptron], samples: &[Sample]) -> f32 {
    let correct = samples
        .iter()
        .filter(|sample| winner_take_all(bank, &sample.features) == sample.label)
        .count();

    100.0 * correct as f32 / samples.len() as f32
}

/// Orchestrates online training and evaluation of a one-vs-rest perceptron bank.
pub struct Trainer {
    /// The configuration this trainer was built with.
    options: TrainerOptions,

    /// A seeded pseudo-random number generator driving the per-epoch shuffle
    /// and any randomized weight initialization.
    rng: StdRng,

    /// One classifier per class, indexed by label.
    bank: Vec<Perceptron>,

    /// The training subset. Presentation order is re-drawn every epoch.
    training: Vec<Sample>,

    /// The held-out validation subset, measured after every epoch.
    validation: Vec<Sample>,

    /// The feature dimensionality every consumed sample must have.
    input_size: usize,
}

impl Trainer {
    /// Creates a trainer seeded from OS entropy.
    ///
    /// See [`Trainer::with_rng`] for the validation and split behavior.
    pub fn new(options: TrainerOptions, samples: Vec<Sample>) -> Result<Self> {
        Self::with_rng(options, samples, StdRng::from_os_rng())
    }

    /// Creates a trainer with an injected generator, for reproducible runs.
    ///
    /// Validates the raw samples (consistent feature dimensionality, labels
    /// within range), holds out the leading `validation_fraction` of the
    /// sequence, and initializes the classifier bank.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if any sample's feature length differs from the
    ///   first sample's.
    /// - `LabelOutOfRange` if any label is not below `num_classes`.
    /// - `EmptySplit` if either subset of the split ends up empty.
    pub fn with_rng(options: TrainerOptions, samples: Vec<Sample>, mut rng: StdRng) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySplit { subset: "training" });
        }

        let input_size = samples[0].features.len();

        for sample in &samples {
            if sample.features.len() != input_size {
                return Err(Error::DimensionMismatch {
                    expected: input_size,
                    got: sample.features.len(),
                });
            }

            if sample.label >= options.num_classes {
                return Err(Error::LabelOutOfRange {
                    label: sample.label,
                    num_classes: options.num_classes,
                });
            }
        }

        let held_out = (samples.len() as f32 * options.validation_fraction) as usize;
        let mut validation = samples;
        let training = validation.split_off(held_out.min(validation.len()));

        if validation.is_empty() {
            return Err(Error::EmptySplit {
                subset: "validation",
            });
        }

        if training.is_empty() {
            return Err(Error::EmptySplit { subset: "training" });
        }

        let mut bank = Vec::with_capacity(options.num_classes);

        for label in 0..options.num_classes {
            let mut perceptron = Perceptron::new(
                label,
                input_size,
                options.learning_rate,
                options.bias,
                options.decay,
            );

            if let WeightInit::Normal { std_dev } = options.weight_init {
                perceptron.randomize_weights(std_dev, &mut rng);
            }

            bank.push(perceptron);
        }

        Ok(Self {
            options,
            rng,
            bank,
            training,
            validation,
            input_size,
        })
    }

    /// Runs the epoch loop until the epoch limit or convergence, whichever
    /// comes first, and returns the per-epoch validation accuracy series.
    pub fn train(&mut self) -> TrainingReport {
        let mut report = TrainingReport::default();
        let mut last_accuracy = 0.0;

        for _ in 0..self.options.max_epochs {
            let order = self.permutation(self.training.len());

            for &index in &order {
                let sample = &self.training[index];

                for perceptron in &mut self.bank {
                    perceptron.update(&sample.features, sample.label);
                }
            }

            let accuracy = accuracy_of(&self.bank, &self.validation);

            for perceptron in &mut self.bank {
                perceptron.decay_learning_rate();
            }

            report.epoch_accuracies.push(accuracy);

            if (accuracy - last_accuracy).abs() < self.options.tolerance {
                report.converged = true;
                break;
            }

            last_accuracy = accuracy;
        }

        report
    }

    /// Produces a uniformly random permutation of `[0, len)`.
    ///
    /// Scans left to right and swaps each position with a uniformly chosen
    /// later-or-equal position, so every permutation is equally likely.
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();

        for i in 0..len {
            let j = self.rng.random_range(i..len);
            indices.swap(i, j);
        }

        indices
    }

    /// Predicts the class of a single feature vector by winner-take-all over
    /// the bank's raw scores.
    #[inline]
    pub fn classify(&self, input: &[f32]) -> usize {
        winner_take_all(&self.bank, input)
    }

    /// Winner-take-all accuracy (percent) over a held-out sample sequence,
    /// without any weight update.
    ///
    /// # Errors
    ///
    /// - `EmptySplit` if the sequence is empty.
    /// - `DimensionMismatch` if any sample's feature length differs from the
    ///   bank's input size.
    pub fn evaluate(&self, samples: &[Sample]) -> Result<f32> {
        if samples.is_empty() {
            return Err(Error::EmptySplit { subset: "test" });
        }

        for sample in samples {
            if sample.features.len() != self.input_size {
                return Err(Error::DimensionMismatch {
                    expected: self.input_size,
                    got: sample.features.len(),
                });
            }
        }

        Ok(accuracy_of(&self.bank, samples))
    }

    /// The current winner-take-all accuracy (percent) on the validation subset.
    #[inline]
    pub fn validation_accuracy(&self) -> f32 {
        accuracy_of(&self.bank, &self.validation)
    }

    /// The configuration this trainer was built with.
    #[inline]
    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// The classifier bank, indexed by class label.
    #[inline]
    pub fn perceptrons(&self) -> &[Perceptron] {
        &self.bank
    }

    /// The training subset of the split.
    #[inline]
    pub fn training(&self) -> &[Sample] {
        &self.training
    }

    /// The held-out validation subset of the split.
    #[inline]
    pub fn validation(&self) -> &[Sample] {
        &self.validation
    }

    /// The feature dimensionality every consumed sample must have.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three linearly separable classes over four features, interleaved so a
    /// leading split holds out every class.
    fn separable_samples(per_class: usize) -> Vec<Sample> {
        let mut samples = Vec::new();

        for i in 0..per_class {
            for class in 0..3 {
                let mut features = vec![0.0; 4];
                features[class] = 1.0;
                features[3] = 0.25 * (i % 3) as f32;
                samples.push(Sample::new(features, class));
            }
        }

        samples
    }

    fn options_3x4() -> TrainerOptions {
        TrainerOptions {
            num_classes: 3,
            validation_fraction: 0.25,
            learning_rate: 1.0,
            max_epochs: 50,
            tolerance: 1e-4,
            ..TrainerOptions::default()
        }
    }

    #[test]
    fn permutation_is_a_bijection() {
        let mut trainer = Trainer::with_rng(
            options_3x4(),
            separable_samples(20),
            StdRng::seed_from_u64(3),
        )
        .unwrap();

        let mut order = trainer.permutation(97);
        order.sort_unstable();

        assert_eq!(order, (0..97).collect::<Vec<_>>());
    }

    #[test]
    fn winner_take_all_breaks_ties_toward_lower_index() {
        let decay = DecayOptions::default();
        let mut a = Perceptron::new(0, 1, 1.0, false, decay);
        let mut b = Perceptron::new(1, 1, 1.0, false, decay);

        a.update(&[2.0], 0);
        b.update(&[2.0], 1);

        // Both score 2.0 on the probe; the earlier classifier must win.
        assert_eq!(winner_take_all(&[a, b], &[1.0]), 0);
    }

    #[test]
    fn winner_take_all_handles_all_negative_scores() {
        let decay = DecayOptions::default();
        let mut bank = Vec::new();

        for (label, magnitude) in [3.0f32, 1.0, 2.0].iter().enumerate() {
            let mut p = Perceptron::new(label, 1, 1.0, false, decay);
            p.update(&[-magnitude], label);
            bank.push(p);
        }

        // Scores on the probe are -3, -1, -2; the least negative must win
        // rather than a default index.
        assert_eq!(winner_take_all(&bank, &[1.0]), 1);
    }

    #[test]
    fn split_is_disjoint_and_exhaustive() {
        let samples: Vec<Sample> = (0..20)
            .map(|i| Sample::new(vec![i as f32, 0.0], 0))
            .collect();
        let options = TrainerOptions {
            num_classes: 1,
            validation_fraction: 0.25,
            ..TrainerOptions::default()
        };

        let trainer = Trainer::with_rng(options, samples, StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(trainer.validation().len(), 5);
        assert_eq!(trainer.training().len(), 15);

        let mut seen: Vec<i64> = trainer
            .validation()
            .iter()
            .chain(trainer.training())
            .map(|sample| sample.features[0] as i64)
            .collect();
        seen.sort_unstable();

        // Every raw sample lands in exactly one subset.
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn empty_validation_split_fails_before_training() {
        let options = TrainerOptions {
            num_classes: 3,
            validation_fraction: 0.0,
            ..TrainerOptions::default()
        };

        let result = Trainer::with_rng(options, separable_samples(4), StdRng::seed_from_u64(0));

        assert!(matches!(
            result,
            Err(Error::EmptySplit {
                subset: "validation"
            })
        ));
    }

    #[test]
    fn empty_training_split_fails_before_training() {
        let options = TrainerOptions {
            num_classes: 3,
            validation_fraction: 1.0,
            ..TrainerOptions::default()
        };

        let result = Trainer::with_rng(options, separable_samples(4), StdRng::seed_from_u64(0));

        assert!(matches!(
            result,
            Err(Error::EmptySplit { subset: "training" })
        ));
    }

    #[test]
    fn inconsistent_feature_length_fails_setup() {
        let samples = vec![
            Sample::new(vec![0.0, 0.5, 1.0], 0),
            Sample::new(vec![0.0, 0.5], 1),
        ];

        let result = Trainer::with_rng(
            TrainerOptions::default(),
            samples,
            StdRng::seed_from_u64(0),
        );

        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn out_of_range_label_fails_setup() {
        let options = TrainerOptions {
            num_classes: 3,
            ..TrainerOptions::default()
        };
        let samples = vec![
            Sample::new(vec![1.0, 0.0], 0),
            Sample::new(vec![0.0, 1.0], 3),
        ];

        let result = Trainer::with_rng(options, samples, StdRng::seed_from_u64(0));

        assert!(matches!(
            result,
            Err(Error::LabelOutOfRange {
                label: 3,
                num_classes: 3
            })
        ));
    }

    #[test]
    fn separable_classes_converge_deterministically() {
        let mut trainer = Trainer::with_rng(
            options_3x4(),
            separable_samples(20),
            StdRng::seed_from_u64(7),
        )
        .unwrap();

        let report = trainer.train();

        assert!(report.epochs() <= 50);
        assert!(report.final_accuracy().unwrap() >= 95.0);
        assert!(report.converged);

        // A held-out sequence from the same distribution classifies cleanly.
        let test = separable_samples(8);
        assert!(trainer.evaluate(&test).unwrap() >= 95.0);
    }

    #[test]
    fn evaluate_rejects_empty_and_mismatched_input() {
        let trainer = Trainer::with_rng(
            options_3x4(),
            separable_samples(20),
            StdRng::seed_from_u64(1),
        )
        .unwrap();

        assert!(matches!(
            trainer.evaluate(&[]),
            Err(Error::EmptySplit { subset: "test" })
        ));

        let short = vec![Sample::new(vec![1.0], 0)];
        assert!(matches!(
            trainer.evaluate(&short),
            Err(Error::DimensionMismatch { expected: 4, got: 1 })
        ));
    }
}
