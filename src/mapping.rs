//! Normalized landmark coordinates to display pixels under "contain" fitting.
//!
//! The captured photo is drawn scaled uniformly to fit entirely inside its
//! container and centered, so a container with a different aspect ratio
//! leaves letterbox bands either above/below or left/right of the image.

use crate::types::{Point, Size};

/// Uniform scale and centering offset of an image drawn with contain fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainFit {
    natural: Size,
    /// Display pixels per natural image pixel.
    pub scale: f32,
    /// Letterbox offset of the drawn image inside the container.
    pub offset: Point,
    /// Size of the drawn image in display pixels.
    pub drawn: Size,
}

impl ContainFit {
    /// Returns `None` while either size is unknown (zero, negative or
    /// non-finite), so callers never divide by an unmeasured dimension.
    pub fn new(natural: Size, container: Size) -> Option<Self> {
        if !natural.is_measured() || !container.is_measured() {
            return None;
        }

        let scale = (container.width / natural.width).min(container.height / natural.height);
        let drawn = Size::new(natural.width * scale, natural.height * scale);
        let offset = Point::new(
            (container.width - drawn.width) / 2.0,
            (container.height - drawn.height) / 2.0,
        );

        Some(Self {
            natural,
            scale,
            offset,
            drawn,
        })
    }

    /// Map a point normalized to the natural image into container pixels.
    pub fn to_display(&self, normalized: Point) -> Point {
        Point::new(
            normalized.x * self.natural.width * self.scale + self.offset.x,
            normalized.y * self.natural.height * self.scale + self.offset.y,
        )
    }
}
