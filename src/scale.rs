//! Anthropometric scaling: real-world millimeters to on-screen pixels.
//!
//! The wearer's face width is known in millimeters (from the capture
//! backend, or an average) and measurable in display pixels (from
//! landmarks). Their ratio calibrates every other physical length, in
//! particular the frame's total width, which in turn fixes the overlay
//! scale relative to the authored asset width.

use serde::Serialize;

use crate::calibration::VtoCalibration;
use crate::dimensions::FrameDimensions;
use crate::types::{Measurements, Point};

/// Display-space landmark positions used for face width estimation.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFace {
    pub left_eye: Point,
    pub right_eye: Point,
    pub face_left: Option<Point>,
    pub face_right: Option<Point>,
}

impl DisplayFace {
    /// On-screen face width in pixels.
    ///
    /// With no face-edge landmarks, the face is taken to be a fixed multiple
    /// of the eye span. If only one edge was detected, the missing one is
    /// placed a fixed distance outside its eye, and the wider of the edge
    /// span and the eye-span estimate wins.
    pub fn width_px(&self, cal: &VtoCalibration) -> f32 {
        let eye_span = (self.right_eye - self.left_eye).x.abs();
        let eye_estimate = eye_span * cal.eye_span_face_multiplier;

        if self.face_left.is_none() && self.face_right.is_none() {
            return eye_estimate;
        }

        let outward = Point::new(cal.face_edge_fallback_px, 0.0);
        let left = self.face_left.unwrap_or(self.left_eye - outward);
        let right = self.face_right.unwrap_or(self.right_eye + outward);

        (right - left).x.abs().max(eye_estimate)
    }
}

/// Measured face width in mm, or the calibrated default when absent or
/// implausible (zero, negative, non-finite).
pub fn face_width_mm(measurements: Option<&Measurements>, cal: &VtoCalibration) -> f32 {
    measurements
        .and_then(|m| m.face_width)
        .filter(|w| w.is_finite() && *w > 0.0)
        .unwrap_or(cal.default_face_width_mm)
}

/// Every intermediate of the scale computation, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleEstimate {
    pub face_width_px: f32,
    pub face_width_mm: f32,
    pub mm_per_pixel: f32,
    pub frame_width_mm: f32,
    pub desired_frame_width_px: f32,
    /// Scale before clamping.
    pub raw_scale: f32,
    /// Scale applied to the frame asset.
    pub scale: f32,
}

impl ScaleEstimate {
    pub fn compute(
        face_width_px: f32,
        face_width_mm: f32,
        frame: &FrameDimensions,
        cal: &VtoCalibration,
    ) -> Self {
        // A zero pixel width gives an infinite mm/px, which maps every
        // physical length to 0 px and lands on the lower clamp.
        let mm_per_pixel = face_width_mm / face_width_px.max(0.0);
        let desired_frame_width_px = px_for_mm(frame.width, mm_per_pixel);
        let raw_scale = desired_frame_width_px / cal.frame_asset_base_width_px;

        Self {
            face_width_px,
            face_width_mm,
            mm_per_pixel,
            frame_width_mm: frame.width,
            desired_frame_width_px,
            raw_scale,
            scale: cal.clamp_scale(raw_scale),
        }
    }

    /// Convert a physical length to display pixels.
    pub fn mm_to_px(&self, mm: f32) -> f32 {
        px_for_mm(mm, self.mm_per_pixel)
    }

    pub fn was_clamped(&self) -> bool {
        self.scale != self.raw_scale
    }
}

fn px_for_mm(mm: f32, mm_per_pixel: f32) -> f32 {
    if mm_per_pixel.is_finite() && mm_per_pixel > 0.0 {
        mm / mm_per_pixel
    } else {
        0.0
    }
}
