use image::{GenericImage, imageops};

/// Mirror flags applied to an image in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    /// Flip top to bottom.
    pub vflip: bool,
    /// Flip left to right.
    pub hflip: bool,
}

impl Orientation {
    /// A 180° rotation is both flips; mirroring toggles the horizontal one.
    pub fn for_display(rotate_180: bool, mirror: bool) -> Self {
        Self {
            vflip: rotate_180,
            hflip: rotate_180 ^ mirror,
        }
    }

    pub fn apply<I: GenericImage>(&self, image: &mut I) {
        if self.vflip {
            imageops::flip_vertical_in_place(image);
        }
        if self.hflip {
            imageops::flip_horizontal_in_place(image);
        }
    }
}
