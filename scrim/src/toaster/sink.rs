//! Host-side traits driven by the toaster registry.

use crate::id::Id;
use crate::payload::Payload;

use super::store::Dismiss;

/// A rendered toast addressed to a layer.
#[derive(Clone)]
pub struct Toast {
    /// Toast id, unique while the toast is live.
    pub id: Id,
    /// Content produced by the renderer at show time.
    pub content: Payload,
}

/// Capability record a layer registers with the toaster.
///
/// The registry calls the sink whenever the layer's visible set changes; the
/// sink owns that visible set and how it is displayed.
pub trait ToastSink: Send + Sync {
    /// Replace the visible list with `toasts`.
    ///
    /// Called on activation so a layer mounted after toasts were queued
    /// catches up with everything addressed to it, in queue order.
    fn activate(&self, toasts: Vec<Toast>);

    /// Clear the visible list.
    fn deactivate(&self);

    /// Append one toast to the visible list.
    fn show_toast(&self, id: &str, content: Payload);

    /// Remove one toast from the visible list.
    fn hide_toast(&self, id: &str);
}

/// Turns toast data into displayable content, once per show.
///
/// The `dismiss` handle hides this toast everywhere; renderers bake it into
/// the content so the displayed toast can close itself.
pub trait ToastRenderer: Send + Sync {
    /// Render `data` into the content handed to layers.
    fn render(&self, data: Payload, dismiss: Dismiss) -> Payload;
}

impl<F> ToastRenderer for F
where
    F: Fn(Payload, Dismiss) -> Payload + Send + Sync,
{
    fn render(&self, data: Payload, dismiss: Dismiss) -> Payload {
        self(data, dismiss)
    }
}
