//! Raster rendering of the try-on composition.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::mapping::ContainFit;
use crate::placement::Placement;
use crate::types::{Point, Size};

/// Letterbox color behind the photo.
pub const BACKGROUND: Rgba<u8> = Rgba([243, 244, 246, 255]);

/// Largest canvas side, in pixels, the compositor will allocate.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Render the photo contain-fitted into a `container`-sized canvas, then the
/// frame asset scaled by the placement and centered on its anchor.
///
/// Passing `None` for `frame` (a failed frame load) renders the photo alone.
/// An unmeasured container yields a 1x1 background image; a container with
/// a side above [`MAX_CANVAS_SIDE`] is rejected with [`Error::InvalidSize`].
pub fn composite(
    base: &RgbaImage,
    frame: Option<&RgbaImage>,
    container: Size,
    placement: &Placement,
    background: Rgba<u8>,
) -> Result<RgbaImage> {
    if !container.is_measured() {
        return Ok(RgbaImage::from_pixel(1, 1, background));
    }
    let limit = MAX_CANVAS_SIDE as f32;
    if container.width.round() > limit || container.height.round() > limit {
        return Err(Error::InvalidSize(format!(
            "{}x{} exceeds the {MAX_CANVAS_SIDE}px canvas limit",
            container.width, container.height
        )));
    }
    let (cw, ch) = (container.width.round() as u32, container.height.round() as u32);
    let mut canvas = RgbaImage::from_pixel(cw.max(1), ch.max(1), background);

    if let Some(fit) = ContainFit::new(Size::from(base.dimensions()), container) {
        let w = fit.drawn.width.round().max(1.0) as u32;
        let h = fit.drawn.height.round().max(1.0) as u32;
        let photo = imageops::resize(base, w, h, FilterType::Triangle);
        imageops::overlay(
            &mut canvas,
            &photo,
            fit.offset.x.round() as i64,
            fit.offset.y.round() as i64,
        );
    }

    if let Some(frame) = frame {
        draw_frame(&mut canvas, frame, container, placement);
    }

    Ok(canvas)
}

fn draw_frame(canvas: &mut RgbaImage, frame: &RgbaImage, container: Size, placement: &Placement) {
    let w = (frame.width() as f32 * placement.scale).round();
    let h = (frame.height() as f32 * placement.scale).round();
    if !(w >= 1.0 && h >= 1.0) {
        tracing::debug!(scale = placement.scale, "frame too small to draw");
        return;
    }

    let scaled = imageops::resize(frame, w as u32, h as u32, FilterType::CatmullRom);
    let top_left = placement.anchor.resolve(container) - Point::new(w, h) * 0.5;
    imageops::overlay(
        canvas,
        &scaled,
        top_left.x.round() as i64,
        top_left.y.round() as i64,
    );
}
