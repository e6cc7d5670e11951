//! Toaster registry - transient notifications routed to named layers.
//!
//! Layers register a [`ToastSink`] capability record; toasts are queued
//! centrally and pushed to every registered target. Because the queue, not
//! the layer, is the source of truth, a layer activated late still receives
//! everything addressed to it.

mod sink;
mod store;

pub use sink::{Toast, ToastRenderer, ToastSink};
pub use store::{Dismiss, ToasterRegistry};
