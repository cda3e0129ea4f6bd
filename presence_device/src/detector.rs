// THEORY:
// A stand-in for a real recogniser. The reference photo and every frame are
// shrunk to a quarter, converted to luminance and squeezed into a tiny fixed-size
// thumbnail; the frame "matches" when its thumbnail is close enough to the
// reference one on average. Crude, but it keeps the appliance runnable end to
// end with nothing but the `image` crate.

use anyhow::Context;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use presence_watch::{BoxError, Detector};
use std::path::Path;

const THUMBNAIL_SIDE: u32 = 32;
const DOWNSCALE: u32 = 4;

/// Default tolerance, as a mean absolute luminance difference on a 0-255 scale.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 24.0;

pub struct ReferenceDetector {
    reference: GrayImage,
    threshold: f64,
}

impl ReferenceDetector {
    pub fn from_file(path: &Path, threshold: f64) -> anyhow::Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("cannot load reference image {}", path.display()))?
            .to_rgb8();
        tracing::debug!(reference = %path.display(), threshold, "Init reference detector");
        Ok(Self::from_image(&image, threshold))
    }

    pub fn from_image(image: &RgbImage, threshold: f64) -> Self {
        Self {
            reference: thumbnail(image),
            threshold,
        }
    }

    /// Mean absolute luminance difference between `frame` and the reference.
    pub fn distance(&self, frame: &RgbImage) -> f64 {
        let candidate = thumbnail(frame);
        let total: u64 = candidate
            .pixels()
            .zip(self.reference.pixels())
            .map(|(a, b)| a[0].abs_diff(b[0]) as u64)
            .sum();
        total as f64 / (THUMBNAIL_SIDE * THUMBNAIL_SIDE) as f64
    }
}

impl Detector<RgbImage> for ReferenceDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<bool, BoxError> {
        let distance = self.distance(frame);
        tracing::trace!(distance, "Compared frame against reference");
        Ok(distance <= self.threshold)
    }
}

fn thumbnail(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let small = imageops::resize(
        image,
        (width / DOWNSCALE).max(1),
        (height / DOWNSCALE).max(1),
        FilterType::Triangle,
    );
    let gray = imageops::grayscale(&small);
    imageops::resize(&gray, THUMBNAIL_SIDE, THUMBNAIL_SIDE, FilterType::Triangle)
}
