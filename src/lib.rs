//! # vto-fit
//!
//! Virtual try-on frame placement for eyewear product views.
//!
//! Given a captured face photo with normalized facial landmarks and a
//! product's catalog dimension string, this crate computes where and at
//! what scale to draw the product's frame overlay so it sits on the
//! wearer's nose bridge at a physically plausible size.
//!
//! This crate provides:
//! - **Dimension parsing**: free-form retailer strings like `"52-18-145"` into
//!   millimeter measurements, with a fixed fallback
//! - **Coordinate mapping**: normalized landmarks to display pixels under
//!   letterboxed "contain" fitting
//! - **Anthropometric scaling**: mm-per-pixel calibration from the face width,
//!   clamped to a visually safe scale range
//! - **Overlay state**: asset load/error lifecycle, resize handling and a
//!   renderable layer view, plus a raster compositor
//!
//! ## Algorithm Overview
//!
//! 1. Fit the photo into its container (uniform scale, centered)
//! 2. Map eyes, bridge (or eye midpoint) and face edges to display pixels
//! 3. Measure the face width in pixels; `mm_per_pixel = face_mm / face_px`
//! 4. Frame width in pixels = frame mm / `mm_per_pixel`
//! 5. Scale = frame pixels / asset base width, clamped to [0.26, 0.62]
//! 6. Anchor the frame 4 mm below the bridge
//!
//! ## Quick Start
//!
//! ```rust
//! use vto_fit::{place_frame, Anchor, CapturedData, Landmarks, Point, Size, VtoCalibration};
//!
//! let capture = CapturedData {
//!     landmarks: Some(Landmarks {
//!         left_eye: Some(Point::new(0.4, 0.5)),
//!         right_eye: Some(Point::new(0.6, 0.5)),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! let placement = place_frame(
//!     &capture,
//!     Some("140-18-145"),
//!     Size::new(640.0, 480.0), // photo
//!     Size::new(320.0, 240.0), // display box
//!     &VtoCalibration::default(),
//! );
//!
//! assert!(matches!(placement.anchor, Anchor::Pixels { .. }));
//! let style = placement.style();
//! println!("left: {}, top: {}, transform: {}", style.left, style.top, style.transform);
//! ```

mod calibration;
mod catalog;
pub mod composite;
mod dimensions;
mod error;
mod mapping;
pub mod overlay;
mod placement;
mod scale;
pub mod session;
mod types;

pub use calibration::VtoCalibration;
pub use catalog::{frames_for_face_width, FrameAssetResolver, Product, DEFAULT_FRAME_ASSET_BASE};
pub use composite::composite;
pub use dimensions::{parse_dimensions, FrameDimensions};
pub use error::{Error, Result};
pub use mapping::ContainFit;
pub use overlay::{
    AssetState, OverlayEvent, OverlayOptions, OverlayPhase, OverlayView, ResizeBus, VtoOverlay,
};
pub use placement::{place_frame, Anchor, FrameStyle, Placement};
pub use scale::{face_width_mm, DisplayFace, ScaleEstimate};
pub use session::{CaptureSession, FileStore, KeyValueStore, MemoryStore, CAPTURE_SESSION_KEY};
pub use types::{CapturedData, Landmarks, Measurements, Point, Size};
