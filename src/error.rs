//! The crate's error type.
//!
//! Every failure here indicates a setup defect (malformed data files, an
//! impossible split, mismatched dimensions) and surfaces before or instead of
//! training, never silently mid-run.

use std::{
    error::Error as StdError,
    fmt::{self, Display},
    io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate's error type.
#[derive(Debug)]
pub enum Error {
    /// A sample's feature-vector length differs from the classifier bank's
    /// input dimensionality.
    DimensionMismatch { expected: usize, got: usize },

    /// A subset of the dataset split ("training", "validation", or "test")
    /// holds zero samples.
    EmptySplit { subset: &'static str },

    /// The image and label sequences differ in length.
    CountMismatch { images: usize, labels: usize },

    /// A sample's label is not below the configured class count.
    LabelOutOfRange { label: usize, num_classes: usize },

    /// An I/O failure while reading a data file.
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch { expected, got } => write!(
                f,
                "feature vector has length {got} but the classifiers expect {expected}"
            ),
            Error::EmptySplit { subset } => {
                write!(f, "the {subset} subset of the dataset split is empty")
            }
            Error::CountMismatch { images, labels } => write!(
                f,
                "loaded {images} images but {labels} labels; the sequences must align 1:1"
            ),
            Error::LabelOutOfRange { label, num_classes } => write!(
                f,
                "label {label} is out of range for {num_classes} classes"
            ),
            Error::Io(err) => write!(f, "failed to read data file: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
