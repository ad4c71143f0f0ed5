//! Trains the one-vs-rest perceptron bank on the MNIST dataset and reports
//! accuracy on the MNIST test set.
//!
//! MNIST pixels are quantized into the same three-level {0.0, 0.5, 1.0} input
//! domain the ASCII bitmap loader produces, so the bank sees the feature
//! distribution it was designed for. A linear bank is a baseline: it bounds
//! what the perceptron learning rule alone achieves on raw pixels.

use anyhow::Result;
use mnist::{Mnist, MnistBuilder};
use percep_rs::core::{
    sample::Sample,
    trainer::{Trainer, TrainerOptions},
};

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

    let options = TrainerOptions {
        max_epochs: 20,
        ..TrainerOptions::default()
    };

    println!(
        "Training {} perceptrons on {} images...",
        options.num_classes,
        training.len()
    );

    let mut trainer = Trainer::new(options, training)?;
    let report = trainer.train();

    for (epoch, accuracy) in report.epoch_accuracies.iter().enumerate() {
        println!("Epoch: {} Accuracy: {:.2}%", epoch, accuracy);
    }

    println!("Training complete.");
    println!("Testing on {} images...", test.len());

    let accuracy = trainer.evaluate(&test)?;

    println!(
        "Accuracy: {:.2}%, Total: {} images",
        accuracy,
        test.len()
    );

    Ok(())
}
