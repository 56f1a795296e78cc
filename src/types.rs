use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 2D point with floating-point coordinates.
///
/// Landmarks use it in normalized image space (fractions of the captured
/// image's width/height); the mapper produces it in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        (*self + *other) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// Componentwise ops for display-space offsets: spans, anchor drops and
// half-extents.
impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Pixel dimensions of an image or a display container.
///
/// A zero size means "not known yet" (image still loading, container not
/// measured).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// True when both sides are finite and strictly positive.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Parses `"WIDTHxHEIGHT"`, e.g. `"320x240"`.
impl FromStr for Size {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| Error::InvalidSize(format!("expected WIDTHxHEIGHT, got {s:?}")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| Error::InvalidSize(format!("not a number: {v:?}")))
        };
        let size = Size::new(parse(w)?, parse(h)?);
        if !size.is_measured() {
            return Err(Error::InvalidSize(format!("{s:?} must be positive")));
        }
        Ok(size)
    }
}

/// Facial reference points detected upstream, normalized to the captured image.
///
/// Every point is optional so that partial detector output still
/// deserializes; the placement code decides which subsets are usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Landmarks {
    pub left_eye: Option<Point>,
    pub right_eye: Option<Point>,
    pub bridge: Option<Point>,
    pub face_left: Option<Point>,
    pub face_right: Option<Point>,
}

impl Landmarks {
    /// Both eye centers, if present and finite.
    pub fn eyes(&self) -> Option<(Point, Point)> {
        match (self.left_eye, self.right_eye) {
            (Some(l), Some(r)) if l.is_finite() && r.is_finite() => Some((l, r)),
            _ => None,
        }
    }

    /// The explicit bridge landmark, or the midpoint between the eyes.
    pub fn bridge_or_midpoint(&self) -> Option<Point> {
        match self.bridge {
            Some(b) if b.is_finite() => Some(b),
            _ => self.eyes().map(|(l, r)| l.midpoint(&r)),
        }
    }
}

/// Physical measurements derived by the capture backend, in millimeters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurements {
    pub face_width: Option<f32>,
    pub face_height: Option<f32>,
    pub pd: Option<f32>,
}

/// One face-capture attempt, as persisted for the browsing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturedData {
    pub processed_image_data_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cropped_preview_data_url: Option<String>,
    pub landmarks: Option<Landmarks>,
    pub measurements: Option<Measurements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_offsets_and_midpoint() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        assert_eq!(a + b, Point::new(4.0, 6.0));
        assert_eq!(b - a, Point::new(2.0, 2.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(a.midpoint(&b), Point::new(2.0, 3.0));
    }

    #[test]
    fn size_parsing() {
        let size: Size = "320x240".parse().unwrap();
        assert_eq!(size, Size::new(320.0, 240.0));
        assert!(" 64 X 48 ".parse::<Size>().is_ok());
        assert!("320".parse::<Size>().is_err());
        assert!("0x240".parse::<Size>().is_err());
        assert!("axb".parse::<Size>().is_err());
    }

    #[test]
    fn unmeasured_sizes() {
        assert!(!Size::zero().is_measured());
        assert!(!Size::new(f32::NAN, 10.0).is_measured());
        assert!(Size::new(1.0, 1.0).is_measured());
    }

    #[test]
    fn bridge_falls_back_to_eye_midpoint() {
        let lm = Landmarks {
            left_eye: Some(Point::new(0.4, 0.5)),
            right_eye: Some(Point::new(0.6, 0.5)),
            ..Default::default()
        };
        let bridge = lm.bridge_or_midpoint().unwrap();
        assert!((bridge.x - 0.5).abs() < 1e-6);
        assert!((bridge.y - 0.5).abs() < 1e-6);

        let explicit = Landmarks {
            bridge: Some(Point::new(0.45, 0.55)),
            ..lm
        };
        assert_eq!(explicit.bridge_or_midpoint(), Some(Point::new(0.45, 0.55)));
    }

    #[test]
    fn captured_data_reads_camel_case_json() {
        let json = r#"{
            "processedImageDataUrl": "data:image/png;base64,AAAA",
            "glassesDetected": false,
            "landmarks": {
                "leftEye": {"x": 0.4, "y": 0.5, "z": 0.01},
                "rightEye": {"x": 0.6, "y": 0.5, "z": 0.02},
                "faceLeft": {"x": 0.3, "y": 0.5, "z": 0.0}
            },
            "measurements": {"pd": 63.5, "face_width": 138},
            "faceShape": "oval",
            "timestamp": 1718000000000
        }"#;
        let data: CapturedData = serde_json::from_str(json).unwrap();
        assert_eq!(data.processed_image_data_url, "data:image/png;base64,AAAA");
        let lm = data.landmarks.unwrap();
        assert_eq!(lm.left_eye, Some(Point::new(0.4, 0.5)));
        assert_eq!(lm.face_left, Some(Point::new(0.3, 0.5)));
        assert!(lm.face_right.is_none());
        assert_eq!(data.measurements.unwrap().face_width, Some(138.0));
        assert_eq!(data.face_shape.as_deref(), Some("oval"));
    }
}
