//! Tests for the toaster registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scrim::error::Error;
use scrim::payload::{Payload, payload, payload_as};
use scrim::toaster::{Dismiss, Toast, ToastSink, ToasterRegistry};

/// Sink that keeps a visible list the way a real layer component would.
#[derive(Default)]
struct LayerSink {
    visible: Mutex<Vec<(String, Payload)>>,
}

impl LayerSink {
    fn visible_ids(&self) -> Vec<String> {
        self.visible
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn content_of(&self, id: &str) -> Option<Payload> {
        self.visible
            .lock()
            .unwrap()
            .iter()
            .find(|(visible_id, _)| visible_id == id)
            .map(|(_, content)| content.clone())
    }
}

impl ToastSink for LayerSink {
    fn activate(&self, toasts: Vec<Toast>) {
        *self.visible.lock().unwrap() = toasts
            .into_iter()
            .map(|toast| (toast.id, toast.content))
            .collect();
    }

    fn deactivate(&self) {
        self.visible.lock().unwrap().clear();
    }

    fn show_toast(&self, id: &str, content: Payload) {
        self.visible.lock().unwrap().push((id.to_owned(), content));
    }

    fn hide_toast(&self, id: &str) {
        self.visible
            .lock()
            .unwrap()
            .retain(|(visible_id, _)| visible_id != id);
    }
}

fn layers(ids: &[&str]) -> Option<Vec<String>> {
    Some(ids.iter().map(|id| (*id).to_owned()).collect())
}

#[test]
fn test_same_id_show_replaces_across_layers() {
    let registry = ToasterRegistry::new();
    let a = Arc::new(LayerSink::default());
    let b = Arc::new(LayerSink::default());
    registry.register("a", a.clone());
    registry.register("b", b.clone());

    registry.show("t", payload("first"), layers(&["a"]));
    assert_eq!(a.visible_ids(), ["t"]);
    assert!(b.visible_ids().is_empty());

    registry.show("t", payload("second"), layers(&["b"]));
    assert!(a.visible_ids().is_empty());
    assert_eq!(b.visible_ids(), ["t"]);
    let content = b.content_of("t").unwrap();
    assert_eq!(payload_as::<&str>(&content), Some(&"second"));
}

#[test]
fn test_hide_broadcast_toast_clears_every_layer() {
    let registry = ToasterRegistry::new();
    let a = Arc::new(LayerSink::default());
    let b = Arc::new(LayerSink::default());
    registry.register("a", a.clone());
    registry.register("b", b.clone());

    registry.show("news", payload("hello"), None);
    assert_eq!(a.visible_ids(), ["news"]);
    assert_eq!(b.visible_ids(), ["news"]);

    registry.hide("news");
    assert!(a.visible_ids().is_empty());
    assert!(b.visible_ids().is_empty());
}

#[test]
fn test_activate_catches_up_relevant_toasts() {
    let registry = ToasterRegistry::new();
    registry.show("one", payload(1u32), None);
    registry.show("two", payload(2u32), None);
    registry.show("three", payload(3u32), layers(&["elsewhere"]));

    let late = Arc::new(LayerSink::default());
    registry.register("late", late.clone());
    registry.activate("late").unwrap();

    assert_eq!(late.visible_ids(), ["one", "two"]);
}

#[test]
fn test_deactivate_purges_only_single_layer_scoped_toasts() {
    let registry = ToasterRegistry::new();
    let a = Arc::new(LayerSink::default());
    let b = Arc::new(LayerSink::default());
    registry.register("a", a.clone());
    registry.register("b", b.clone());

    registry.show("solo", payload(1u32), layers(&["a"]));
    registry.show("pair", payload(2u32), layers(&["a", "b"]));
    registry.show("cast", payload(3u32), None);

    registry.deactivate("a").unwrap();
    assert!(a.visible_ids().is_empty());

    // Only the toast scoped to "a" alone died with the deactivation.
    registry.activate("a").unwrap();
    assert_eq!(a.visible_ids(), ["pair", "cast"]);
    registry.activate("b").unwrap();
    assert_eq!(b.visible_ids(), ["pair", "cast"]);
}

#[test]
fn test_show_to_unregistered_layer_waits_for_activation() {
    let registry = ToasterRegistry::new();
    registry.show("queued", payload("pending"), layers(&["later"]));

    let late = Arc::new(LayerSink::default());
    registry.register("later", late.clone());
    assert!(late.visible_ids().is_empty());

    registry.activate("later").unwrap();
    assert_eq!(late.visible_ids(), ["queued"]);
}

#[test]
fn test_unknown_layer_operations_error() {
    let registry = ToasterRegistry::new();
    assert!(matches!(
        registry.activate("ghost"),
        Err(Error::UnknownLayer(_))
    ));
    assert!(matches!(
        registry.deactivate("ghost"),
        Err(Error::UnknownLayer(_))
    ));
    assert!(matches!(
        registry.unregister("ghost"),
        Err(Error::UnknownLayer(_))
    ));
}

#[test]
fn test_hide_unknown_toast_is_a_noop() {
    let registry = ToasterRegistry::new();
    let sink = Arc::new(LayerSink::default());
    registry.register("root", sink.clone());
    registry.show("real", payload(1u32), None);

    registry.hide("imaginary");
    assert_eq!(sink.visible_ids(), ["real"]);
}

#[test]
fn test_unregistered_layer_no_longer_receives_toasts() {
    let registry = ToasterRegistry::new();
    let sink = Arc::new(LayerSink::default());
    registry.register("old", sink.clone());
    registry.unregister("old").unwrap();
    assert!(!registry.has_layer("old"));

    registry.show("orphan", payload(1u32), None);
    assert!(sink.visible_ids().is_empty());
}

#[test]
fn test_renderer_runs_once_per_show_and_dismiss_hides() {
    let registry = ToasterRegistry::new();
    let a = Arc::new(LayerSink::default());
    let b = Arc::new(LayerSink::default());
    registry.register("a", a.clone());
    registry.register("b", b.clone());

    let renders = Arc::new(AtomicUsize::new(0));
    let captured: Arc<Mutex<Option<Dismiss>>> = Arc::new(Mutex::new(None));
    registry.set_renderer(Arc::new({
        let renders = Arc::clone(&renders);
        let captured = Arc::clone(&captured);
        move |data: Payload, dismiss: Dismiss| {
            renders.fetch_add(1, Ordering::SeqCst);
            *captured.lock().unwrap() = Some(dismiss);
            data
        }
    }));

    registry.show("banner", payload("look"), None);
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(a.visible_ids(), ["banner"]);
    assert_eq!(b.visible_ids(), ["banner"]);

    let dismiss = captured.lock().unwrap().take().unwrap();
    assert_eq!(dismiss.id(), "banner");
    dismiss.dismiss();
    assert!(a.visible_ids().is_empty());
    assert!(b.visible_ids().is_empty());
}
