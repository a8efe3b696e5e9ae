//! # Workforce Device
//!
//! Viewport classification for the Workforce HR application. The dispatcher
//! decides which dashboard variant mounts and keeps that decision current
//! as the window is resized.
//!
//! ## Breakpoints
//!
//! | Width          | Device  |
//! |----------------|---------|
//! | `< 768`        | Mobile  |
//! | `768 ..< 1024` | Tablet  |
//! | `>= 1024`      | Desktop |
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use workforce_device::{DashboardVariant, DeviceTypeDispatcher, SimulatedViewport};
//!
//! let viewport = Arc::new(SimulatedViewport::new(800));
//! let mut dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
//! assert_eq!(dispatcher.dashboard(), DashboardVariant::Tablet);
//!
//! viewport.resize(1440);
//! assert!(dispatcher.is_desktop());
//!
//! dispatcher.unmount();
//! assert_eq!(viewport.listener_count(), 0);
//! ```

pub mod device;
pub mod dispatcher;
pub mod viewport;

// Re-export main types
pub use device::{DashboardVariant, DeviceType, DESKTOP_BREAKPOINT, MOBILE_BREAKPOINT};
pub use dispatcher::{DeviceState, DeviceTypeDispatcher};
pub use viewport::{ListenerId, ResizeListener, SimulatedViewport, Viewport};
