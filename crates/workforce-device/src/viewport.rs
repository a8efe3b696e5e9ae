//! Viewport abstraction
//!
//! Hosts wrap their window system in a [`Viewport`]. [`SimulatedViewport`]
//! is an in-memory one for headless hosts and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Callback invoked with the new width on every resize event.
pub type ResizeListener = Arc<dyn Fn(u32) + Send + Sync>;

/// Handle returned by [`Viewport::add_resize_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Source of viewport width and resize events.
pub trait Viewport: Send + Sync {
    /// Current width in CSS pixels.
    fn width(&self) -> u32;

    /// Register a listener for resize events.
    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId;

    /// Deregister a listener. Unknown ids are ignored.
    fn remove_resize_listener(&self, id: ListenerId);
}

#[derive(Default)]
struct Inner {
    width: u32,
    next_id: u64,
    listeners: Vec<(ListenerId, ResizeListener)>,
}

/// In-memory viewport driven by [`SimulatedViewport::resize`].
#[derive(Default)]
pub struct SimulatedViewport {
    inner: Mutex<Inner>,
}

impl SimulatedViewport {
    /// Create a viewport with the given initial width.
    pub fn new(width: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                width,
                ..Inner::default()
            }),
        }
    }

    /// Change the width and fire one resize event.
    ///
    /// Listeners run after the lock is released, so they may call back
    /// into the viewport. A listener removed by an earlier one during the
    /// same event is skipped.
    pub fn resize(&self, width: u32) {
        let listeners: Vec<(ListenerId, ResizeListener)> = {
            let mut inner = self.lock();
            inner.width = width;
            inner.listeners.clone()
        };
        trace!(width, listeners = listeners.len(), "Viewport resized");
        for (id, listener) in listeners {
            if self.is_registered(id) {
                listener(width);
            }
        }
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.lock().listeners.iter().any(|(existing, _)| *existing == id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SimulatedViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SimulatedViewport")
            .field("width", &inner.width)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Viewport for SimulatedViewport {
    fn width(&self) -> u32 {
        self.lock().width
    }

    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.listeners.push((id, listener));
        id
    }

    fn remove_resize_listener(&self, id: ListenerId) {
        self.lock().listeners.retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_resize_notifies_listeners() {
        let viewport = SimulatedViewport::new(1280);
        let seen = Arc::new(AtomicU32::new(0));

        let id = viewport.add_resize_listener({
            let seen = seen.clone();
            Arc::new(move |w| seen.store(w, Ordering::SeqCst))
        });
        viewport.resize(800);
        assert_eq!(viewport.width(), 800);
        assert_eq!(seen.load(Ordering::SeqCst), 800);

        viewport.remove_resize_listener(id);
        viewport.resize(400);
        assert_eq!(seen.load(Ordering::SeqCst), 800);
        assert_eq!(viewport.listener_count(), 0);
    }

    #[test]
    fn test_listener_removed_mid_event_is_skipped() {
        let viewport = Arc::new(SimulatedViewport::new(1280));
        let seen = Arc::new(AtomicU32::new(0));
        let victim: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        viewport.add_resize_listener({
            let viewport = Arc::downgrade(&viewport);
            let victim = victim.clone();
            Arc::new(move |_: u32| {
                let id = victim.lock().unwrap().take();
                if let (Some(viewport), Some(id)) = (viewport.upgrade(), id) {
                    viewport.remove_resize_listener(id);
                }
            })
        });
        let id = viewport.add_resize_listener({
            let seen = seen.clone();
            Arc::new(move |w| seen.store(w, Ordering::SeqCst))
        });
        *victim.lock().unwrap() = Some(id);

        viewport.resize(640);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(viewport.listener_count(), 1);
    }

    #[test]
    fn test_listener_ids_are_unique() {
        let viewport = SimulatedViewport::new(0);
        let a = viewport.add_resize_listener(Arc::new(|_: u32| {}));
        let b = viewport.add_resize_listener(Arc::new(|_: u32| {}));
        assert_ne!(a, b);

        viewport.remove_resize_listener(a);
        viewport.remove_resize_listener(a);
        assert_eq!(viewport.listener_count(), 1);
    }
}
