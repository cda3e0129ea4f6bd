// THEORY:
// The physical panel is a 400x300 grayscale e-paper screen. This sink renders
// an asset the way the panel would show it (oriented, fitted, centred on a white
// canvas) and writes the result to a file that the panel driver, or a person,
// can pick up.

use crate::orientation::Orientation;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use presence_watch::{BoxError, RenderSink};
use std::path::PathBuf;

pub const PANEL_WIDTH: u32 = 400;
pub const PANEL_HEIGHT: u32 = 300;

pub struct FileDisplay {
    output: PathBuf,
    orientation: Orientation,
}

impl FileDisplay {
    pub fn new(output: PathBuf, orientation: Orientation) -> Self {
        Self { output, orientation }
    }
}

impl RenderSink<PathBuf> for FileDisplay {
    fn render(&mut self, asset: &PathBuf) -> Result<(), BoxError> {
        let mut picture = image::open(asset)?.to_luma8();
        self.orientation.apply(&mut picture);
        compose(picture).save_with_format(&self.output, ImageFormat::Png)?;
        tracing::info!(asset = %asset.display(), output = %self.output.display(), "Display updated");
        Ok(())
    }
}

/// Fits the picture inside the panel, keeping its aspect ratio.
fn compose(picture: GrayImage) -> GrayImage {
    let fitted = DynamicImage::ImageLuma8(picture)
        .resize(PANEL_WIDTH, PANEL_HEIGHT, FilterType::Triangle)
        .to_luma8();
    let mut canvas = GrayImage::from_pixel(PANEL_WIDTH, PANEL_HEIGHT, Luma([255]));
    let x = (PANEL_WIDTH - fitted.width()) / 2;
    let y = (PANEL_HEIGHT - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
    canvas
}
