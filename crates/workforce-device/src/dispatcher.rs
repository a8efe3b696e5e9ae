//! Device-type dispatcher
//!
//! Keeps the device classification of a [`Viewport`] current and publishes
//! it through a `watch` channel. The viewport's resize listener is the only
//! writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::device::{DashboardVariant, DeviceType};
use crate::viewport::{ListenerId, Viewport};

/// Snapshot published by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    /// Last observed width.
    pub width: u32,
    /// Classification of `width`.
    pub device_type: DeviceType,
    /// Number of resize events applied since mount.
    pub revision: u64,
}

impl DeviceState {
    fn at(width: u32) -> Self {
        Self {
            width,
            device_type: DeviceType::classify(width),
            revision: 0,
        }
    }
}

/// Observes a viewport and classifies it as mobile, tablet or desktop.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use workforce_device::{DeviceType, DeviceTypeDispatcher, SimulatedViewport};
///
/// let viewport = Arc::new(SimulatedViewport::new(1280));
/// let dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
/// assert!(dispatcher.is_desktop());
///
/// viewport.resize(390);
/// assert_eq!(dispatcher.device_type(), DeviceType::Mobile);
/// ```
pub struct DeviceTypeDispatcher {
    viewport: Arc<dyn Viewport>,
    state: Arc<watch::Sender<DeviceState>>,
    /// Cleared on unmount; the listener ignores events once it is false,
    /// even if the viewport already dispatched to it.
    active: Arc<AtomicBool>,
    listener: Option<ListenerId>,
}

impl DeviceTypeDispatcher {
    /// Classify the viewport's current width and start listening for resizes.
    pub fn mount(viewport: Arc<dyn Viewport>) -> Self {
        let initial = DeviceState::at(viewport.width());
        let (tx, _rx) = watch::channel(initial);
        let state = Arc::new(tx);
        let active = Arc::new(AtomicBool::new(true));

        let listener = viewport.add_resize_listener({
            let state = state.clone();
            let active = active.clone();
            Arc::new(move |width| {
                if active.load(Ordering::Acquire) {
                    apply_resize(&state, width);
                }
            })
        });
        debug!(width = initial.width, device = %initial.device_type, "Device dispatcher mounted");

        Self {
            viewport,
            state,
            active,
            listener: Some(listener),
        }
    }

    /// Stop listening for resizes. The last classification stays readable.
    pub fn unmount(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(id) = self.listener.take() {
            self.viewport.remove_resize_listener(id);
            debug!("Device dispatcher unmounted");
        }
    }

    /// Whether the resize listener is still registered.
    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Current classification.
    pub fn device_type(&self) -> DeviceType {
        self.state.borrow().device_type
    }

    /// Check if the viewport is currently mobile.
    pub fn is_mobile(&self) -> bool {
        self.device_type().is_mobile()
    }

    /// Check if the viewport is currently tablet-sized.
    pub fn is_tablet(&self) -> bool {
        self.device_type().is_tablet()
    }

    /// Check if the viewport is currently anything but desktop.
    pub fn is_mobile_or_tablet(&self) -> bool {
        self.device_type().is_mobile_or_tablet()
    }

    /// Check if the viewport is currently desktop-sized.
    pub fn is_desktop(&self) -> bool {
        self.device_type().is_desktop()
    }

    /// Dashboard variant for the current classification.
    pub fn dashboard(&self) -> DashboardVariant {
        self.device_type().dashboard()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> DeviceState {
        *self.state.borrow()
    }

    /// Number of resize events applied since mount.
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Subscribe to state changes. Every resize event notifies once.
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.state.subscribe()
    }
}

impl Drop for DeviceTypeDispatcher {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for DeviceTypeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTypeDispatcher")
            .field("state", &*self.state.borrow())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

fn apply_resize(state: &watch::Sender<DeviceState>, width: u32) {
    state.send_modify(|s| {
        let device_type = DeviceType::classify(width);
        if device_type != s.device_type {
            debug!(from = %s.device_type, to = %device_type, width, "Device type changed");
        }
        s.width = width;
        s.device_type = device_type;
        s.revision += 1;
    });
}
