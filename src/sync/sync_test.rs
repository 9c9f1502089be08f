use std::sync::atomic::Ordering;

use crate::sync::ShutdownSignal;

#[test]
fn test_request_is_shared_between_clones() {
    let signal = ShutdownSignal::new();
    let clone = signal.clone();
    assert!(!signal.should_stop(false));
    clone.request();
    assert!(signal.should_stop(false));
    assert!(signal.should_stop(true));
}

#[test]
fn test_interrupt_ignored_during_session() {
    let signal = ShutdownSignal::new();
    signal.interrupt.store(true, Ordering::SeqCst);
    assert!(!signal.should_stop(true));
    // The interrupt was consumed
    assert!(!signal.should_stop(false));

    signal.interrupt.store(true, Ordering::SeqCst);
    assert!(signal.should_stop(false));
    assert!(signal.should_stop(true));
}
