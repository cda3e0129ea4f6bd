// THEORY:
// Frame acquisition for the appliance. Two sources produce oriented RGB frames:
// a directory replay (stills taken earlier, looped forever) and, with the
// `camera` feature, a live OpenCV capture device. Both apply the configured
// orientation before handing the frame to detection.

use crate::orientation::Orientation;
use anyhow::bail;
use image::{ImageFormat, RgbImage};
use presence_watch::{BoxError, FrameSource};
use std::path::{Path, PathBuf};

/// Replays the images of a directory as camera frames, in name order, looping.
#[derive(Debug)]
pub struct DirectoryReplay {
    frames: Vec<PathBuf>,
    next: usize,
    orientation: Orientation,
}

impl DirectoryReplay {
    pub fn open(dir: &Path, orientation: Orientation) -> anyhow::Result<Self> {
        let mut frames = Vec::new();
        for entry in fs_err::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                frames.push(path);
            }
        }
        if frames.is_empty() {
            bail!("no image frames found in {}", dir.display());
        }
        frames.sort();
        tracing::info!(count = frames.len(), dir = %dir.display(), "Replaying frames");
        Ok(Self {
            frames,
            next: 0,
            orientation,
        })
    }
}

impl FrameSource for DirectoryReplay {
    type Frame = RgbImage;

    fn capture(&mut self) -> Result<RgbImage, BoxError> {
        let path = &self.frames[self.next % self.frames.len()];
        self.next = self.next.wrapping_add(1);
        let mut frame = image::open(path)?.to_rgb8();
        self.orientation.apply(&mut frame);
        Ok(frame)
    }
}

#[cfg(feature = "camera")]
pub use camera::CameraCapture;

#[cfg(feature = "camera")]
mod camera {
    use super::{BoxError, FrameSource, Orientation, RgbImage};
    use opencv::{
        core::{self, Mat},
        imgproc,
        prelude::*,
        videoio::{self, VideoCapture},
    };

    /// A live capture device read through OpenCV.
    pub struct CameraCapture {
        cap: VideoCapture,
        orientation: Orientation,
    }

    impl CameraCapture {
        pub fn open(index: i32, width: u32, height: u32, orientation: Orientation) -> opencv::Result<Self> {
            let mut cap = VideoCapture::new(index, videoio::CAP_ANY)?;
            if !cap.is_opened()? {
                return Err(opencv::Error::new(
                    core::StsError,
                    format!("camera {index} could not be opened"),
                ));
            }
            cap.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
            cap.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
            tracing::info!(index, width, height, "Camera opened");
            Ok(Self { cap, orientation })
        }
    }

    impl FrameSource for CameraCapture {
        type Frame = RgbImage;

        fn capture(&mut self) -> Result<RgbImage, BoxError> {
            let mut bgr = Mat::default();
            if !self.cap.read(&mut bgr)? || bgr.empty() {
                return Err("camera returned no frame".into());
            }

            // Convert the OpenCV Mat (BGR) to an RGB buffer.
            let mut rgb = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
            let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
            let data = rgb.data_bytes()?.to_vec();
            let mut frame = RgbImage::from_raw(width, height, data).ok_or("camera frame has an unexpected size")?;
            self.orientation.apply(&mut frame);
            Ok(frame)
        }
    }
}
