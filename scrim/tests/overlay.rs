//! Tests for the upper-layer value store.

use std::sync::{Arc, Mutex};

use scrim::error::Error;
use scrim::overlay::{OverlayHandle, OverlayRegistry, OverlayScope};
use scrim::payload::{Payload, payload, payload_as};

fn as_u32(value: &Option<Payload>) -> u32 {
    value
        .as_ref()
        .and_then(|v| payload_as::<u32>(v).copied())
        .unwrap_or(0)
}

fn store() -> OverlayRegistry {
    OverlayRegistry::new([
        ("drawer".to_owned(), Some(payload(0u32))),
        ("palette".to_owned(), None),
    ])
}

#[test]
fn test_update_with_twice_increments_by_two() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    store
        .subscribe("drawer", {
            let seen = Arc::clone(&seen);
            move |value| seen.lock().unwrap().push(as_u32(value))
        })
        .unwrap();

    let bump = |prev: Option<Payload>| {
        Some(payload(
            prev.as_ref()
                .and_then(|v| payload_as::<u32>(v).copied())
                .unwrap_or(0)
                + 1,
        ))
    };
    store.update_with("drawer", bump).unwrap();
    store.update_with("drawer", bump).unwrap();

    let value = store.get("drawer").unwrap().unwrap();
    assert_eq!(payload_as::<u32>(&value), Some(&2));
    // Both the intermediate and final values, in order.
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_reset_returns_none_not_the_previous_value() {
    let store = store();
    store.update("drawer", payload(41u32)).unwrap();
    store.reset("drawer").unwrap();
    assert!(store.get("drawer").unwrap().is_none());
}

#[test]
fn test_reset_notifies_subscribers_with_none() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    store
        .subscribe("drawer", {
            let seen = Arc::clone(&seen);
            move |value: &Option<Payload>| seen.lock().unwrap().push(value.is_none())
        })
        .unwrap();

    store.update("drawer", payload(1u32)).unwrap();
    store.reset("drawer").unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
}

#[test]
fn test_undeclared_id_fails_every_operation() {
    let store = store();
    assert!(matches!(store.get("ghost"), Err(Error::UnknownUpperLayer(_))));
    assert!(matches!(
        store.update("ghost", payload(1u32)),
        Err(Error::UnknownUpperLayer(_))
    ));
    assert!(matches!(
        store.reset("ghost"),
        Err(Error::UnknownUpperLayer(_))
    ));
    assert!(matches!(
        store.subscribe("ghost", |_| {}),
        Err(Error::UnknownUpperLayer(_))
    ));
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscription = store
        .subscribe("palette", {
            let seen = Arc::clone(&seen);
            move |value| seen.lock().unwrap().push(as_u32(value))
        })
        .unwrap();

    store.update("palette", payload(1u32)).unwrap();
    store.unsubscribe(&subscription).unwrap();
    store.update("palette", payload(2u32)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1]);
}

#[test]
fn test_subscribers_notified_in_subscription_order() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second"] {
        let seen = Arc::clone(&seen);
        store
            .subscribe("palette", move |_| seen.lock().unwrap().push(tag))
            .unwrap();
    }

    store.update("palette", payload(1u32)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_default_data_is_visible_before_first_update() {
    let store = store();
    let value = store.get("drawer").unwrap().unwrap();
    assert_eq!(payload_as::<u32>(&value), Some(&0));
    assert!(store.get("palette").unwrap().is_none());
}

#[test]
fn test_handle_resolves_explicit_before_scope() {
    let store = store();
    let scope = OverlayScope::new("palette");
    let handle = OverlayHandle::bind(&store, Some("drawer"), Some(&scope)).unwrap();
    assert_eq!(handle.id(), "drawer");

    handle.update(payload(10u32)).unwrap();
    let value = store.get("drawer").unwrap().unwrap();
    assert_eq!(payload_as::<u32>(&value), Some(&10));
}

#[test]
fn test_handle_watch_sees_current_value_and_updates() {
    let store = store();
    let scope = OverlayScope::new("drawer");
    let handle = OverlayHandle::bind(&store, None, Some(&scope)).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (current, subscription) = handle
        .watch({
            let seen = Arc::clone(&seen);
            move |value| seen.lock().unwrap().push(as_u32(value))
        })
        .unwrap();

    assert_eq!(as_u32(&current), 0);
    handle.update(payload(8u32)).unwrap();
    handle.unsubscribe(&subscription).unwrap();
    handle.update(payload(9u32)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![8]);
}
