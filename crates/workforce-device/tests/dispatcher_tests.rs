//! Dispatcher behaviour observed through its `watch` channel.

use std::sync::Arc;
use workforce_device::{
    DashboardVariant, DeviceType, DeviceTypeDispatcher, SimulatedViewport, Viewport,
};

#[test]
fn test_boundary_widths_after_resize() {
    let viewport = Arc::new(SimulatedViewport::new(1920));
    let dispatcher = DeviceTypeDispatcher::mount(viewport.clone());

    let cases = [
        (767, DeviceType::Mobile),
        (768, DeviceType::Tablet),
        (1023, DeviceType::Tablet),
        (1024, DeviceType::Desktop),
    ];
    for (width, expected) in cases {
        viewport.resize(width);
        assert_eq!(dispatcher.device_type(), expected, "width {width}");
    }
}

#[test]
fn test_each_resize_notifies_exactly_once() {
    let viewport = Arc::new(SimulatedViewport::new(1280));
    let dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
    let mut rx = dispatcher.subscribe();
    assert!(!rx.has_changed().unwrap());

    for (i, width) in [1200, 700, 700, 900].into_iter().enumerate() {
        viewport.resize(width);
        assert!(rx.has_changed().unwrap());
        let state = *rx.borrow_and_update();
        assert_eq!(state.revision, i as u64 + 1);
        assert_eq!(state.width, width);
        assert!(!rx.has_changed().unwrap());
    }
}

#[test]
fn test_no_state_change_after_unmount() {
    let viewport = Arc::new(SimulatedViewport::new(1280));
    let mut dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
    let mut rx = dispatcher.subscribe();

    viewport.resize(600);
    rx.borrow_and_update();
    dispatcher.unmount();

    viewport.resize(1500);
    viewport.resize(300);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(dispatcher.device_type(), DeviceType::Mobile);
    assert_eq!(dispatcher.revision(), 1);
    assert_eq!(viewport.listener_count(), 0);
}

#[test]
fn test_dispatchers_do_not_leak_listeners() {
    let viewport = Arc::new(SimulatedViewport::new(1024));
    for _ in 0..10 {
        let dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
        assert_eq!(dispatcher.dashboard(), DashboardVariant::Desktop);
    }
    assert_eq!(viewport.listener_count(), 0);

    viewport.resize(500);
    assert_eq!(viewport.width(), 500);
}

#[tokio::test]
async fn test_subscriber_task_sees_device_change() {
    let viewport = Arc::new(SimulatedViewport::new(1280));
    let dispatcher = DeviceTypeDispatcher::mount(viewport.clone());
    let mut rx = dispatcher.subscribe();

    let watcher = tokio::spawn(async move {
        loop {
            rx.changed().await.expect("dispatcher dropped");
            let state = *rx.borrow_and_update();
            if state.device_type.is_mobile() {
                return state.device_type.dashboard();
            }
        }
    });

    viewport.resize(1000);
    viewport.resize(375);
    assert_eq!(watcher.await.unwrap(), DashboardVariant::Mobile);
}
