//! Trains the one-vs-rest perceptron bank on the ASCII digit bitmap files and
//! reports accuracy on the held-out test files.
//!
//! Expects a data directory (default `data/`) containing `trainingimages`,
//! `traininglabels`, `testimages`, and `testlabels`. An optional second
//! argument names a file to snapshot the trained bank into.

use anyhow::{Context, Result};
use percep_rs::{
    core::trainer::{Trainer, TrainerOptions},
    data,
};
use std::{env, fs::File, io::BufWriter, path::PathBuf};

fn main() -> Result<()> {
    let data_dir = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "data".into()));
    let snapshot_path = env::args().nth(2);

    println!("Loading digit bitmaps from {}...", data_dir.display());

    let training = data::load_dataset(
        data_dir.join("trainingimages"),
        data_dir.join("traininglabels"),
        data::ROWS_PER_IMAGE,
    )
    .context("failed to load the training set")?;

    let options = TrainerOptions::default();

    println!(
        "Training {} perceptrons on {} samples...",
        options.num_classes,
        training.len()
    );

    let mut trainer = Trainer::new(options, training).context("failed to set up the trainer")?;

    let report = trainer.train();

    for (epoch, accuracy) in report.epoch_accuracies.iter().enumerate() {
        println!("Epoch: {} Validation Accuracy: {:.2}%", epoch, accuracy);
    }

    if report.converged {
        println!("Done training: converged after {} epochs.", report.epochs());
    } else {
        println!("Done training: reached the epoch limit.");
    }

    let test = data::load_dataset(
        data_dir.join("testimages"),
        data_dir.join("testlabels"),
        data::ROWS_PER_IMAGE,
    )
    .context("failed to load the test set")?;

    let accuracy = trainer.evaluate(&test)?;

    println!(
        "Accuracy on Test Data: {:.2}%, Total: {} images",
        accuracy,
        test.len()
    );

    if let Some(path) = snapshot_path {
        let file =
            File::create(&path).with_context(|| format!("failed to create snapshot file {path}"))?;
        bincode::serialize_into(BufWriter::new(file), trainer.perceptrons())
            .context("failed to write the trained bank")?;

        println!("Wrote trained weights to {path}.");
    }

    Ok(())
}
