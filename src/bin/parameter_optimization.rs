//! Random search over the trainer's hyperparameters on MNIST.
//!
//! Every trial trains a fresh bank under one sampled configuration and scores
//! it on the test set; the shuffle seed is pinned so accuracy differences come
//! from the hyperparameters alone.

use anyhow::Result;
use mnist::{Mnist, MnistBuilder};
use percep_rs::core::{
    perceptron::DecayOptions,
    sample::Sample,
    trainer::{Trainer, TrainerOptions, WeightInit},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Copy, Clone)]
struct HyperParams {
    learning_rate: f32,
    decay_step: f32,
    decay_growth: f32,
    validation_fraction: f32,
    bias: bool,
    normal_std: Option<f32>,
}

/// Quantizes one MNIST pixel into the three-level input domain.
fn quantize(pixel: u8) -> f32 {
    match pixel {
        193.. => 1.0,
        65.. => 0.5,
        _ => 0.0,
    }
}

/// Builds labeled samples from the flat MNIST image buffer.
fn samples_from(images: &[u8], labels: &[u8], image_size: usize) -> Vec<Sample> {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let image = &images[i * image_size..(i + 1) * image_size];
            Sample::new(image.iter().map(|&p| quantize(p)).collect(), label as usize)
        })
        .collect()
}

// Given a hyperparameter configuration, train a bank on the training set and
// return the resulting accuracy on the test set.
fn evaluate_model(hyper: HyperParams, training: Vec<Sample>, test: &[Sample]) -> Result<f32> {
    let options = TrainerOptions {
        num_classes: 10,
        validation_fraction: hyper.validation_fraction,
        learning_rate: hyper.learning_rate,
        decay: DecayOptions {
            step: hyper.decay_step,
            growth: hyper.decay_growth,
        },
        max_epochs: 10,
        tolerance: 1e-5,
        bias: hyper.bias,
        weight_init: match hyper.normal_std {
            Some(std_dev) => WeightInit::Normal { std_dev },
            None => WeightInit::Zero,
        },
    };

    let mut trainer = Trainer::with_rng(options, training, StdRng::seed_from_u64(0xC0FFEE))?;
    trainer.train();

    Ok(trainer.evaluate(test)?)
}

fn main() -> Result<()> {
    println!("Loading MNIST dataset...");

    let Mnist {
        trn_img,
        trn_lbl,
        tst_img,
        tst_lbl,
        ..
    } = MnistBuilder::new()
        .label_format_digit()
        .training_set_length(60_000)
        .test_set_length(10_000)
        .finalize();

    let image_size = 28 * 28;
    let training = samples_from(&trn_img, &trn_lbl, image_size);
    let test = samples_from(&tst_img, &tst_lbl, image_size);

    let mut rng = rand::rng();
    let num_trials = 50;
    let mut best_accuracy = 0.0;
    let mut best_params = None;

    // Random search loop.
    for trial in 0..num_trials {
        let hyper = HyperParams {
            learning_rate: rng.random_range(0.05..1.0),
            decay_step: rng.random_range(0.001..0.1),
            decay_growth: rng.random_range(0.5..1.0),
            validation_fraction: rng.random_range(0.05..0.25),
            bias: rng.random_bool(0.5),
            normal_std: if rng.random_bool(0.3) {
                Some(rng.random_range(1.0..6.0))
            } else {
                None
            },
        };

        println!("Trial {}: Testing hyperparameters: {:?}", trial + 1, hyper);

        let accuracy = evaluate_model(hyper, training.clone(), &test)?;

        println!("Trial {}: Accuracy: {:.2}%", trial + 1, accuracy);

        if accuracy > best_accuracy {
            best_accuracy = accuracy;
            best_params = Some(hyper);
        }
    }

    println!("Best hyperparameters found: {:?}", best_params);
    println!("Best accuracy achieved: {:.2}%", best_accuracy);

    Ok(())
}
