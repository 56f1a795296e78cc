//! Calibration constants for frame placement.
//!
//! These values encode assumptions about the photographed asset pipeline
//! (how frame PNGs are authored, average face size, where frames sit on the
//! nose) and are tuned together, so they live in one struct.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VtoCalibration {
    /// Face width assumed when the capture has no measurement (mm).
    pub default_face_width_mm: f32,

    /// Pixel width every frame overlay PNG is authored at. Asset producers
    /// must export frames so that the full frame front spans exactly this
    /// many pixels at scale 1.0.
    pub frame_asset_base_width_px: f32,

    /// Distance below the bridge landmark where the frame is centered (mm).
    pub bridge_drop_mm: f32,

    /// Lower bound of the visual scale clamp.
    pub min_scale: f32,

    /// Upper bound of the visual scale clamp.
    pub max_scale: f32,

    /// Scale used when no landmark-based placement is possible.
    pub default_scale: f32,

    /// Default anchor, as percentages of the container (x, y).
    pub default_anchor_percent: (f32, f32),

    /// Face edge offset from each eye when no face-edge landmark exists (px).
    pub face_edge_fallback_px: f32,

    /// Face width estimate as a multiple of the eye-to-eye span.
    pub eye_span_face_multiplier: f32,

    /// Opacity transition of the frame overlay once loaded (ms).
    pub frame_fade_ms: u32,
}

impl Default for VtoCalibration {
    fn default() -> Self {
        Self {
            default_face_width_mm: 130.0,
            frame_asset_base_width_px: 340.0,
            bridge_drop_mm: 4.0,
            min_scale: 0.26,
            max_scale: 0.62,
            default_scale: 0.38,
            default_anchor_percent: (50.0, 45.0),
            face_edge_fallback_px: 50.0,
            eye_span_face_multiplier: 2.0,
            frame_fade_ms: 200,
        }
    }
}

impl VtoCalibration {
    /// Load calibration from a JSON file. Omitted fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let calibration: Self = serde_json::from_str(&text)?;
        calibration.validate()?;
        Ok(calibration)
    }

    /// Reject values that would make placement meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("default_face_width_mm", self.default_face_width_mm),
            ("frame_asset_base_width_px", self.frame_asset_base_width_px),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("default_scale", self.default_scale),
            ("eye_span_face_multiplier", self.eye_span_face_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidSize(format!("{name} must be positive, got {value}")));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(Error::InvalidSize(format!(
                "scale range inverted: {} > {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.bridge_drop_mm.is_finite() && self.face_edge_fallback_px.is_finite()) {
            return Err(Error::InvalidSize("offsets must be finite".to_string()));
        }
        Ok(())
    }

    /// Clamp a raw scale factor into the visually plausible range.
    pub fn clamp_scale(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return self.default_scale;
        }
        raw.clamp(self.min_scale, self.max_scale)
    }
}
