//! A `Sample` is one labeled digit bitmap in its numeric form.
//!
//! The feature vector holds one value per pixel cell, in the {0.0, 0.5, 1.0}
//! domain produced by the data loader, and the label is the digit class the
//! bitmap depicts. Samples are immutable once produced; the trainer only ever
//! reads them.

use serde::{Deserialize, Serialize};

/// A feature vector paired with its class label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// One value per pixel cell.
    pub features: Vec<f32>,

    /// The digit class in `[0, num_classes)`.
    pub label: usize,
}

impl Sample {
    /// Creates a new Sample.
    pub fn new(features: Vec<f32>, label: usize) -> Self {
        Self { features, label }
    }
}
