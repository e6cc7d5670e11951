//! Toaster registry: pending toast queue plus registered layers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::{Error, Result};
use crate::id::Id;
use crate::payload::Payload;
use crate::wake::{WakeHandle, WakeSender};

use super::sink::{Toast, ToastRenderer, ToastSink};

struct StoredToast {
    id: Id,
    content: Payload,
    /// Target layer ids; `None` broadcasts to every layer.
    layers: Option<Vec<Id>>,
}

impl StoredToast {
    fn targets(&self, layer: &str) -> bool {
        self.layers
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| id.as_str() == layer))
    }

    /// Scoped to exactly this one layer and nowhere else.
    fn only_targets(&self, layer: &str) -> bool {
        self.layers
            .as_ref()
            .is_some_and(|ids| ids.len() == 1 && ids[0] == layer)
    }
}

struct ToasterInner {
    layers: HashMap<Id, Arc<dyn ToastSink>>,
    pending: Vec<StoredToast>,
    renderer: Option<Arc<dyn ToastRenderer>>,
}

/// Registry of toast layers and the ordered queue of live toasts.
///
/// Toasts are addressed to every layer or to an explicit subset. A target
/// layer does not have to be registered at show time; activating it later
/// hands it everything still queued for it. Showing a toast under an id that
/// is already live replaces the old toast and moves it to the end of the
/// queue order.
#[derive(Clone)]
pub struct ToasterRegistry {
    inner: Arc<RwLock<ToasterInner>>,
    wake: WakeHandle,
}

impl ToasterRegistry {
    /// Create an empty registry with no renderer (data is shown as-is).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ToasterInner {
                layers: HashMap::new(),
                pending: Vec::new(),
                renderer: None,
            })),
            wake: WakeHandle::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ToasterInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ToasterInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the renderer applied to toast data on every show.
    pub fn set_renderer(&self, renderer: Arc<dyn ToastRenderer>) {
        self.write().renderer = Some(renderer);
    }

    /// Install a wake sender pinged after every mutation.
    pub fn install_wake(&self, sender: WakeSender) {
        self.wake.install(sender);
    }

    /// Register a layer's sink under `id`, replacing any previous sink.
    pub fn register(&self, id: impl Into<Id>, sink: Arc<dyn ToastSink>) {
        let id = id.into();
        log::debug!("registered toaster layer '{id}'");
        self.write().layers.insert(id, sink);
    }

    /// Remove the layer registered under `id`.
    pub fn unregister(&self, id: &str) -> Result<()> {
        let mut inner = self.write();
        if inner.layers.remove(id).is_none() {
            return Err(Error::UnknownLayer(id.to_owned()));
        }
        log::debug!("unregistered toaster layer '{id}'");
        Ok(())
    }

    /// Whether a layer is registered under `id`.
    pub fn has_layer(&self, id: &str) -> bool {
        self.read().layers.contains_key(id)
    }

    /// Hand the layer every queued toast addressed to it, in queue order.
    pub fn activate(&self, id: &str) -> Result<()> {
        let (sink, toasts) = {
            let inner = self.read();
            let sink = inner
                .layers
                .get(id)
                .cloned()
                .ok_or_else(|| Error::UnknownLayer(id.to_owned()))?;
            let toasts: Vec<Toast> = inner
                .pending
                .iter()
                .filter(|toast| toast.targets(id))
                .map(|toast| Toast {
                    id: toast.id.clone(),
                    content: toast.content.clone(),
                })
                .collect();
            (sink, toasts)
        };
        log::debug!("activated toaster layer '{id}' with {} toast(s)", toasts.len());
        sink.activate(toasts);
        self.wake.ping();
        Ok(())
    }

    /// Drop queued toasts scoped to this layer alone, then clear the layer.
    ///
    /// Broadcast and multi-layer toasts stay queued; only a toast that could
    /// never show anywhere else dies with its layer.
    pub fn deactivate(&self, id: &str) -> Result<()> {
        let sink = {
            let mut inner = self.write();
            let sink = inner
                .layers
                .get(id)
                .cloned()
                .ok_or_else(|| Error::UnknownLayer(id.to_owned()))?;
            inner.pending.retain(|toast| !toast.only_targets(id));
            sink
        };
        log::debug!("deactivated toaster layer '{id}'");
        sink.deactivate();
        self.wake.ping();
        Ok(())
    }

    /// Show a toast under `id`, optionally restricted to `layers`.
    ///
    /// The data is rendered once, any live toast with the same id is
    /// replaced, and the toast is pushed to each currently registered target
    /// layer, stale instance hidden first so replacement never doubles up.
    /// Layers the replaced toast targeted but the new one does not are told
    /// to hide it. Target layers that are not registered yet are skipped;
    /// they pick the toast up when activated.
    pub fn show(&self, id: impl Into<Id>, data: Payload, layers: Option<Vec<Id>>) {
        let id = id.into();
        let renderer = self.read().renderer.clone();
        let content = match renderer {
            Some(renderer) => {
                let dismiss = Dismiss {
                    inner: Arc::downgrade(&self.inner),
                    wake: self.wake.clone(),
                    id: id.clone(),
                };
                renderer.render(data, dismiss)
            }
            None => data,
        };

        let (stale, targets) = {
            let mut inner = self.write();
            let mut stale_ids: Vec<Id> = Vec::new();
            if let Some(previous) = inner.pending.iter().position(|toast| toast.id == id) {
                let removed = inner.pending.remove(previous);
                stale_ids = match &removed.layers {
                    Some(ids) => ids.clone(),
                    None => inner.layers.keys().cloned().collect(),
                };
            }
            inner.pending.push(StoredToast {
                id: id.clone(),
                content: content.clone(),
                layers: layers.clone(),
            });
            let target_ids: Vec<Id> = match &layers {
                Some(ids) => ids.clone(),
                None => inner.layers.keys().cloned().collect(),
            };
            stale_ids.retain(|layer| !target_ids.contains(layer));
            let stale: Vec<Arc<dyn ToastSink>> = stale_ids
                .iter()
                .filter_map(|layer| inner.layers.get(layer).cloned())
                .collect();
            let targets: Vec<Arc<dyn ToastSink>> = target_ids
                .iter()
                .filter_map(|layer| inner.layers.get(layer).cloned())
                .collect();
            (stale, targets)
        };
        log::debug!("showing toast '{id}' on {} layer(s)", targets.len());
        for sink in stale {
            sink.hide_toast(&id);
        }
        for sink in targets {
            sink.hide_toast(&id);
            sink.show_toast(&id, content.clone());
        }
        self.wake.ping();
    }

    /// Remove the toast with `id` from the queue and from every layer it
    /// targets. Unknown ids are ignored.
    pub fn hide(&self, id: &str) {
        let targets: Vec<Arc<dyn ToastSink>> = {
            let mut inner = self.write();
            let Some(index) = inner.pending.iter().position(|toast| toast.id == id) else {
                return;
            };
            let removed = inner.pending.remove(index);
            match &removed.layers {
                Some(ids) => ids
                    .iter()
                    .filter_map(|layer| inner.layers.get(layer).cloned())
                    .collect(),
                None => inner.layers.values().cloned().collect(),
            }
        };
        log::debug!("hiding toast '{id}'");
        for sink in targets {
            sink.hide_toast(id);
        }
        self.wake.ping();
    }
}

impl Default for ToasterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Hides one toast everywhere it is shown.
///
/// Baked into rendered content by the [`ToastRenderer`] so a displayed toast
/// can close itself. Holds only a weak reference; dismissing after the
/// registry is gone does nothing.
#[derive(Clone)]
pub struct Dismiss {
    inner: Weak<RwLock<ToasterInner>>,
    wake: WakeHandle,
    id: Id,
}

impl Dismiss {
    /// The toast id this handle hides.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Hide the toast.
    pub fn dismiss(&self) {
        let Some(inner) = self.inner.upgrade() else {
            log::debug!("dismiss of toast '{}' after registry dropped", self.id);
            return;
        };
        let registry = ToasterRegistry {
            inner,
            wake: self.wake.clone(),
        };
        registry.hide(&self.id);
    }
}
