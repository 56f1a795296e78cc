//! Per-product try-on overlay: asset load state, resize handling and the
//! layered view a UI toolkit renders.
//!
//! Each overlay owns two independent asset lifecycles (the main frame layer
//! and an optional thumbnail) on top of the captured photo. The host feeds
//! it load/error events and calls [`VtoOverlay::view`] whenever it renders.
//! Resizes arrive through a shared [`ResizeBus`]; every overlay holds a
//! [`ResizeSubscription`] that deregisters itself on unmount or drop.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::calibration::VtoCalibration;
use crate::catalog::{FrameAssetResolver, Product};
use crate::placement::{place_frame, Placement};
use crate::types::{CapturedData, Size};

/// Load state of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetState {
    /// Not requested yet.
    Pending,
    Loading,
    /// Loaded, with its intrinsic size.
    Loaded(Size),
    Failed,
}

/// Coarse lifecycle of an overlay, derived from its two main assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    AwaitingBasePhoto,
    BasePhotoLoaded,
    AwaitingFrameAsset,
    FrameAssetLoaded,
    /// Terminal: the frame layer stays hidden, the photo is unaffected.
    FrameAssetError,
}

/// Events a host forwards from its image elements and window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    BaseLoaded(Size),
    BaseFailed,
    FrameLoaded(Size),
    FrameFailed,
    ThumbnailFailed,
    Resized,
}

/// Reports the current pixel size of an overlay's container.
pub trait ContainerMeasure {
    fn measure(&self) -> Size;
}

impl<F: Fn() -> Size> ContainerMeasure for F {
    fn measure(&self) -> Size {
        self()
    }
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Window-resize fan-out shared by every overlay on a page.
#[derive(Clone, Default)]
pub struct ResizeBus {
    inner: Rc<RefCell<Listeners>>,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ResizeSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(listener)));
        ResizeSubscription {
            bus: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Invoke every registered listener.
    pub fn notify(&self) {
        // Snapshot first: a listener may subscribe or unsubscribe.
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Registration handle; dropping it removes the listener.
pub struct ResizeSubscription {
    bus: Weak<RefCell<Listeners>>,
    id: u64,
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Per-instance display options.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    /// Hide the frame thumbnail, e.g. for small preview boxes.
    pub compact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseLayer {
    pub src: String,
    pub alt: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLayer {
    pub src: String,
    pub alt: String,
    pub placement: Placement,
    /// 0.0 until the asset has loaded, then 1.0.
    pub opacity: f32,
    pub transition_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailLayer {
    pub src: String,
    pub alt: String,
}

/// Everything needed to draw one overlay, back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub container: Size,
    pub base: BaseLayer,
    pub frame: Option<FrameLayer>,
    pub thumbnail: Option<ThumbnailLayer>,
}

/// A mounted try-on overlay for one product.
pub struct VtoOverlay {
    capture: Rc<CapturedData>,
    product_name: String,
    dimensions: Option<String>,
    frame_url: Option<String>,
    options: OverlayOptions,
    calibration: Rc<VtoCalibration>,

    base: AssetState,
    frame: AssetState,
    thumbnail: AssetState,

    container: Rc<Cell<Size>>,
    measure: Rc<dyn ContainerMeasure>,
    subscription: Option<ResizeSubscription>,
}

impl VtoOverlay {
    /// Mount an overlay: measure the container once and start listening for
    /// resizes on `bus`.
    pub fn mount(
        capture: Rc<CapturedData>,
        product: &Product,
        resolver: &FrameAssetResolver,
        calibration: Rc<VtoCalibration>,
        options: OverlayOptions,
        bus: &ResizeBus,
        measure: impl ContainerMeasure + 'static,
    ) -> Self {
        let measure: Rc<dyn ContainerMeasure> = Rc::new(measure);
        let container = Rc::new(Cell::new(measure.measure()));

        let subscription = {
            let container = Rc::clone(&container);
            let measure = Rc::clone(&measure);
            bus.subscribe(move || container.set(measure.measure()))
        };

        let frame_url = resolver.product_url(product);
        // Without a key there is no asset to load; treat it as a failed load.
        let (frame, thumbnail) = match frame_url {
            Some(_) => (AssetState::Pending, AssetState::Loading),
            None => {
                tracing::debug!(product = %product.name, "no frame asset key, overlay suppressed");
                (AssetState::Failed, AssetState::Failed)
            }
        };

        Self {
            capture,
            product_name: product.name.clone(),
            dimensions: product.dimensions.clone(),
            frame_url,
            options,
            calibration,
            base: AssetState::Loading,
            frame,
            thumbnail,
            container,
            measure,
            subscription: Some(subscription),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Deregister the resize listener. Later events are ignored.
    pub fn unmount(&mut self) {
        self.subscription = None;
    }

    /// Start loading the frame asset. Returns its URL the first time only.
    pub fn request_frame(&mut self) -> Option<&str> {
        if !self.is_mounted() || self.frame != AssetState::Pending {
            return None;
        }
        self.frame = AssetState::Loading;
        self.frame_url.as_deref()
    }

    /// Apply an event. Returns `false` when it was ignored because the
    /// overlay is unmounted or the event does not apply in the current state.
    pub fn handle(&mut self, event: OverlayEvent) -> bool {
        if !self.is_mounted() {
            tracing::trace!(?event, "event after unmount ignored");
            return false;
        }

        match event {
            OverlayEvent::BaseLoaded(size) => {
                self.base = AssetState::Loaded(size);
            }
            OverlayEvent::BaseFailed => {
                self.base = AssetState::Failed;
            }
            OverlayEvent::FrameLoaded(size) => {
                if self.frame == AssetState::Failed {
                    return false;
                }
                self.frame = AssetState::Loaded(size);
            }
            OverlayEvent::FrameFailed => {
                tracing::debug!(product = %self.product_name, "frame asset failed to load");
                self.frame = AssetState::Failed;
            }
            OverlayEvent::ThumbnailFailed => {
                self.thumbnail = AssetState::Failed;
            }
            OverlayEvent::Resized => {
                self.container.set(self.measure.measure());
            }
        }
        true
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.frame == AssetState::Failed {
            return OverlayPhase::FrameAssetError;
        }
        if !matches!(self.base, AssetState::Loaded(_)) {
            return OverlayPhase::AwaitingBasePhoto;
        }
        match self.frame {
            AssetState::Pending => OverlayPhase::BasePhotoLoaded,
            AssetState::Loading => OverlayPhase::AwaitingFrameAsset,
            AssetState::Loaded(_) => OverlayPhase::FrameAssetLoaded,
            AssetState::Failed => OverlayPhase::FrameAssetError,
        }
    }

    pub fn base_state(&self) -> AssetState {
        self.base
    }

    pub fn frame_state(&self) -> AssetState {
        self.frame
    }

    pub fn container_size(&self) -> Size {
        self.container.get()
    }

    fn natural_size(&self) -> Size {
        match self.base {
            AssetState::Loaded(size) => size,
            _ => Size::zero(),
        }
    }

    /// Current placement; the default placement until sizes are known.
    pub fn placement(&self) -> Placement {
        place_frame(
            &self.capture,
            self.dimensions.as_deref(),
            self.natural_size(),
            self.container.get(),
            &self.calibration,
        )
    }

    pub fn view(&self) -> OverlayView {
        let base = BaseLayer {
            src: self.capture.processed_image_data_url.clone(),
            alt: "Your fit",
            visible: self.base != AssetState::Failed,
        };

        let frame = match (&self.frame_url, self.frame) {
            (Some(src), state) if state != AssetState::Failed => Some(FrameLayer {
                src: src.clone(),
                alt: self.product_name.clone(),
                placement: self.placement(),
                opacity: if matches!(state, AssetState::Loaded(_)) { 1.0 } else { 0.0 },
                transition_ms: self.calibration.frame_fade_ms,
            }),
            _ => None,
        };

        let thumbnail = match &self.frame_url {
            Some(src) if !self.options.compact && self.thumbnail != AssetState::Failed => {
                Some(ThumbnailLayer {
                    src: src.clone(),
                    alt: self.product_name.clone(),
                })
            }
            _ => None,
        };

        OverlayView {
            container: self.container.get(),
            base,
            frame,
            thumbnail,
        }
    }
}
