//! Loaders for the ASCII digit bitmap format.
//!
//! An image file holds bitmaps stacked vertically, one fixed-height block of
//! text rows per digit. Each character is one pixel cell: `' '` is background,
//! `'+'` a half-intensity stroke, `'#'` a full-intensity stroke. A label file
//! carries the matching digits, one per character, aligned 1:1 with the image
//! blocks.
//!
//! This is a parsing utility around the core: it produces `Sample`s and never
//! touches classifier state.

use crate::{
    core::sample::Sample,
    error::{Error, Result},
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// The row height of one digit bitmap in the standard data files.
pub const ROWS_PER_IMAGE: usize = 28;

/// Maps one bitmap character to its pixel value. Unrecognized characters count
/// as background.
#[inline]
pub fn pixel_value(c: char) -> f32 {
    match c {
        '+' => 0.5,
        '#' => 1.0,
        _ => 0.0,
    }
}

/// Loads digit bitmaps from a file, one feature vector per block of
/// `rows_per_image` text rows.
pub fn load_images<P: AsRef<Path>>(path: P, rows_per_image: usize) -> Result<Vec<Vec<f32>>> {
    parse_images(BufReader::new(File::open(path)?), rows_per_image)
}

/// Loads digit labels from a file, one label per digit character.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    parse_labels(BufReader::new(File::open(path)?))
}

/// Loads an image file and its label file into a sample sequence.
///
/// # Errors
///
/// `CountMismatch` if the two files do not yield the same number of entries,
/// besides any I/O failure.
pub fn load_dataset<P: AsRef<Path>>(
    image_path: P,
    label_path: P,
    rows_per_image: usize,
) -> Result<Vec<Sample>> {
    zip_dataset(
        load_images(image_path, rows_per_image)?,
        load_labels(label_path)?,
    )
}

/// Zips aligned image and label sequences into samples.
fn zip_dataset(images: Vec<Vec<f32>>, labels: Vec<usize>) -> Result<Vec<Sample>> {
    if images.len() != labels.len() {
        return Err(Error::CountMismatch {
            images: images.len(),
            labels: labels.len(),
        });
    }

    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(features, label)| Sample::new(features, label))
        .collect())
}

fn parse_images<R: BufRead>(reader: R, rows_per_image: usize) -> Result<Vec<Vec<f32>>> {
    let mut images = Vec::new();
    let mut current = Vec::new();
    let mut rows = 0;

    for line in reader.lines() {
        current.extend(line?.chars().map(pixel_value));
        rows += 1;

        if rows % rows_per_image == 0 {
            images.push(std::mem::take(&mut current));
        }
    }

    // A trailing block of fewer than rows_per_image rows is incomplete and dropped.
    Ok(images)
}

fn parse_labels<R: BufRead>(reader: R) -> Result<Vec<usize>> {
    let mut labels = Vec::new();

    for line in reader.lines() {
        labels.extend(
            line?
                .chars()
                .filter(|c| c.is_ascii_digit())
                .map(|c| (c as u8 - b'0') as usize),
        );
    }

    Ok(labels)
}
