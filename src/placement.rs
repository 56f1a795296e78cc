//! Where, and how large, to draw a frame over the captured photo.

use std::fmt;

use serde::Serialize;

use crate::calibration::VtoCalibration;
use crate::dimensions::parse_dimensions;
use crate::mapping::ContainFit;
use crate::scale::{face_width_mm, DisplayFace, ScaleEstimate};
use crate::types::{CapturedData, Point, Size};

/// Center point of the frame overlay inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum Anchor {
    /// Relative placement used before real measurements exist.
    Percent { x: f32, y: f32 },
    /// Absolute position in container pixels.
    Pixels { x: f32, y: f32 },
}

impl Anchor {
    /// Resolve to container pixels.
    pub fn resolve(&self, container: Size) -> Point {
        match *self {
            Anchor::Percent { x, y } => {
                Point::new(container.width * x / 100.0, container.height * y / 100.0)
            }
            Anchor::Pixels { x, y } => Point::new(x, y),
        }
    }
}

/// A CSS length as the overlay styles it.
struct CssLength(f32, &'static str);

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

/// Computed placement of the frame overlay. Recomputed on every render,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub anchor: Anchor,
    pub scale: f32,
    /// Scale diagnostics; `None` when the default placement was used.
    pub estimate: Option<ScaleEstimate>,
}

/// Inline style for the frame `<img>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameStyle {
    pub left: String,
    pub top: String,
    pub transform: String,
}

impl Placement {
    /// Centered placement with the default scale.
    pub fn fallback(cal: &VtoCalibration) -> Self {
        let (x, y) = cal.default_anchor_percent;
        Self {
            anchor: Anchor::Percent { x, y },
            scale: cal.default_scale,
            estimate: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.estimate.is_none()
    }

    pub fn left(&self) -> String {
        match self.anchor {
            Anchor::Percent { x, .. } => CssLength(x, "%").to_string(),
            Anchor::Pixels { x, .. } => CssLength(x, "px").to_string(),
        }
    }

    pub fn top(&self) -> String {
        match self.anchor {
            Anchor::Percent { y, .. } => CssLength(y, "%").to_string(),
            Anchor::Pixels { y, .. } => CssLength(y, "px").to_string(),
        }
    }

    /// The asset is centered on the anchor, then scaled about its center.
    pub fn transform(&self) -> String {
        format!("translate(-50%, -50%) scale({})", self.scale)
    }

    pub fn style(&self) -> FrameStyle {
        FrameStyle {
            left: self.left(),
            top: self.top(),
            transform: self.transform(),
        }
    }
}

/// Place a frame over a captured photo.
///
/// * `dimensions` - the product's raw dimension string
/// * `natural` - intrinsic size of the captured photo
/// * `container` - measured size of the display box
///
/// Falls back to [`Placement::fallback`] when the eyes are missing or either
/// size is not known yet; never produces NaN or infinite values.
pub fn place_frame(
    capture: &CapturedData,
    dimensions: Option<&str>,
    natural: Size,
    container: Size,
    cal: &VtoCalibration,
) -> Placement {
    let Some(landmarks) = capture.landmarks.as_ref() else {
        tracing::debug!("no landmarks in capture, using default placement");
        return Placement::fallback(cal);
    };
    let (Some((left_eye, right_eye)), Some(bridge)) =
        (landmarks.eyes(), landmarks.bridge_or_midpoint())
    else {
        tracing::debug!("eye landmarks missing, using default placement");
        return Placement::fallback(cal);
    };
    let Some(fit) = ContainFit::new(natural, container) else {
        tracing::debug!(?natural, ?container, "sizes not measured yet, using default placement");
        return Placement::fallback(cal);
    };

    let edge = |p: Option<Point>| p.filter(Point::is_finite).map(|p| fit.to_display(p));
    let face = DisplayFace {
        left_eye: fit.to_display(left_eye),
        right_eye: fit.to_display(right_eye),
        face_left: edge(landmarks.face_left),
        face_right: edge(landmarks.face_right),
    };

    let frame = parse_dimensions(dimensions);
    let estimate = ScaleEstimate::compute(
        face.width_px(cal),
        face_width_mm(capture.measurements.as_ref(), cal),
        &frame,
        cal,
    );
    if estimate.was_clamped() {
        tracing::debug!(raw = estimate.raw_scale, clamped = estimate.scale, "frame scale clamped");
    }

    let bridge_drop = Point::new(0.0, estimate.mm_to_px(cal.bridge_drop_mm));
    let center = fit.to_display(bridge) + bridge_drop;

    Placement {
        anchor: Anchor::Pixels {
            x: center.x,
            y: center.y,
        },
        scale: estimate.scale,
        estimate: Some(estimate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmarks, Measurements};

    fn capture_with_eyes() -> CapturedData {
        CapturedData {
            processed_image_data_url: "data:image/png;base64,".to_string(),
            landmarks: Some(Landmarks {
                left_eye: Some(Point::new(0.4, 0.5)),
                right_eye: Some(Point::new(0.6, 0.5)),
                ..Default::default()
            }),
            measurements: Some(Measurements {
                face_width: Some(130.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn fallback_style_strings() {
        let placement = Placement::fallback(&VtoCalibration::default());
        let style = placement.style();
        assert_eq!(style.left, "50%");
        assert_eq!(style.top, "45%");
        assert_eq!(style.transform, "translate(-50%, -50%) scale(0.38)");
    }

    #[test]
    fn missing_landmarks_use_default() {
        let cal = VtoCalibration::default();
        let capture = CapturedData::default();
        let (natural, container) = (Size::new(640.0, 480.0), Size::new(320.0, 240.0));
        let placement = place_frame(&capture, None, natural, container, &cal);
        assert_eq!(placement, Placement::fallback(&cal));

        let one_eye = CapturedData {
            landmarks: Some(Landmarks {
                left_eye: Some(Point::new(0.4, 0.5)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let placement = place_frame(&one_eye, None, natural, container, &cal);
        assert!(placement.is_fallback());
    }

    #[test]
    fn degenerate_sizes_use_default() {
        let cal = VtoCalibration::default();
        let capture = capture_with_eyes();
        for (natural, container) in [
            (Size::new(0.0, 480.0), Size::new(320.0, 240.0)),
            (Size::new(640.0, 480.0), Size::new(0.0, 240.0)),
            (Size::zero(), Size::zero()),
        ] {
            let placement = place_frame(&capture, Some("140-18-145"), natural, container, &cal);
            assert!(placement.is_fallback());
            assert_eq!(placement.anchor, Anchor::Percent { x: 50.0, y: 45.0 });
            assert_eq!(placement.scale, 0.38);
            assert!(!placement.scale.is_nan());
        }
    }

    #[test]
    fn pixel_anchor_style() {
        let placement = Placement {
            anchor: Anchor::Pixels { x: 160.0, y: 123.5 },
            scale: 0.5,
            estimate: None,
        };
        assert_eq!(placement.left(), "160px");
        assert_eq!(placement.top(), "123.5px");
        assert_eq!(placement.transform(), "translate(-50%, -50%) scale(0.5)");
    }

    #[test]
    fn anchor_resolution() {
        let container = Size::new(200.0, 100.0);
        let p = Anchor::Percent { x: 50.0, y: 45.0 }.resolve(container);
        assert_eq!(p, Point::new(100.0, 45.0));
        let p = Anchor::Pixels { x: 12.0, y: 34.0 }.resolve(container);
        assert_eq!(p, Point::new(12.0, 34.0));
    }

    #[test]
    fn explicit_bridge_moves_anchor() {
        let cal = VtoCalibration::default();
        let mut capture = capture_with_eyes();
        if let Some(lm) = capture.landmarks.as_mut() {
            lm.bridge = Some(Point::new(0.5, 0.4));
        }
        let placement = place_frame(
            &capture,
            Some("140-18-145"),
            Size::new(640.0, 480.0),
            Size::new(320.0, 240.0),
            &cal,
        );
        let Anchor::Pixels { x, y } = placement.anchor else {
            panic!("expected pixel anchor");
        };
        let drop = 4.0 / (130.0 / 128.0);
        assert!((x - 160.0).abs() < 1e-3);
        assert!((y - (96.0 + drop)).abs() < 1e-3);
    }
}
