//! Dialog registry and per-dialog data store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::id::Id;
use crate::observe::{Listeners, Subscription};
use crate::payload::Payload;
use crate::wake::{WakeHandle, WakeSender};

use super::surface::{DialogSurface, OverflowLock};

/// What an open handler decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Keep the dialog open.
    Open,
    /// Veto the open; the registry closes the dialog again immediately.
    Cancel,
}

/// Snapshot handed to dialog subscribers on every change.
#[derive(Clone)]
pub struct DialogState {
    /// Data last attached by open, close, or an update.
    pub data: Option<Payload>,
    /// Whether the dialog is currently open.
    pub opened: bool,
}

pub(crate) type OpenHandler =
    Arc<dyn Fn(Option<Payload>) -> BoxFuture<'static, OpenOutcome> + Send + Sync>;
pub(crate) type CloseHandler = Arc<dyn Fn(Option<Payload>) + Send + Sync>;

/// Per-mount dialog configuration passed to [`DialogRegistry::register`].
///
/// # Example
///
/// ```ignore
/// let config = DialogConfig::new()
///     .block_overflow(true)
///     .on_open(|data| async move {
///         if data.is_none() {
///             return OpenOutcome::Cancel;
///         }
///         OpenOutcome::Open
///     })
///     .on_close(|_| log::debug!("settings closed"));
/// registry.register("settings", surface, config);
/// ```
#[derive(Default)]
pub struct DialogConfig {
    pub(crate) block_overflow: bool,
    pub(crate) on_open: Option<OpenHandler>,
    pub(crate) on_close: Option<CloseHandler>,
}

impl DialogConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the shared overflow lock while this dialog is open.
    pub fn block_overflow(mut self, block: bool) -> Self {
        self.block_overflow = block;
        self
    }

    /// Run `handler` after the dialog is shown.
    ///
    /// The handler receives the open data and may return
    /// [`OpenOutcome::Cancel`] to close the dialog again.
    pub fn on_open<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Option<Payload>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpenOutcome> + Send + 'static,
    {
        self.on_open = Some(Arc::new(move |data| handler(data).boxed()));
        self
    }

    /// Run `handler` with the close data after the dialog is dismissed.
    pub fn on_close<F>(mut self, handler: F) -> Self
    where
        F: Fn(Option<Payload>) + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(handler));
        self
    }
}

struct DialogEntry {
    surface: Option<Arc<dyn DialogSurface>>,
    on_open: Option<OpenHandler>,
    on_close: Option<CloseHandler>,
    block_overflow: bool,
    opened: bool,
    /// Declared entries survive unregistration; mount-only entries do not.
    declared: bool,
    data: Option<Payload>,
    listeners: Listeners<DialogState>,
}

impl DialogEntry {
    fn empty() -> Self {
        Self {
            surface: None,
            on_open: None,
            on_close: None,
            block_overflow: false,
            opened: false,
            declared: false,
            data: None,
            listeners: Listeners::new(),
        }
    }
}

struct DialogInner {
    entries: HashMap<Id, DialogEntry>,
    overflow_lock: Option<Arc<dyn OverflowLock>>,
}

/// Registry of modal dialogs, keyed by caller-chosen id.
///
/// Entries come into existence two ways: `declare` pre-seeds an id with
/// default data (and makes it permanent until `remove`), `register` attaches
/// a mounted surface. Open marks the entry opened, shows the surface, runs
/// the optional async open handler, and engages the shared overflow lock for
/// blocking dialogs; close reverses all of that.
///
/// All methods take `&self`; the registry is cheap to clone and every clone
/// operates on the same entries. No internal lock is held while a surface,
/// handler, or subscriber callback runs.
#[derive(Clone)]
pub struct DialogRegistry {
    inner: Arc<RwLock<DialogInner>>,
    wake: WakeHandle,
}

impl DialogRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DialogInner {
                entries: HashMap::new(),
                overflow_lock: None,
            })),
            wake: WakeHandle::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DialogInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DialogInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the shared lock engaged while any blocking dialog is open.
    pub fn set_overflow_lock(&self, lock: Arc<dyn OverflowLock>) {
        self.write().overflow_lock = Some(lock);
    }

    /// Install a wake sender pinged after every mutation.
    pub fn install_wake(&self, sender: WakeSender) {
        self.wake.install(sender);
    }

    /// Pre-seed an entry with optional default data.
    ///
    /// Declared entries keep their data and subscribers across surface
    /// registrations and survive `unregister`. Declaring an existing id
    /// only fills in default data if none is set yet.
    pub fn declare(&self, id: impl Into<Id>, default_data: Option<Payload>) {
        let id = id.into();
        log::debug!("declared dialog '{id}'");
        let mut inner = self.write();
        let entry = inner.entries.entry(id).or_insert_with(DialogEntry::empty);
        entry.declared = true;
        if entry.data.is_none() {
            entry.data = default_data;
        }
    }

    /// Attach a mounted surface and its configuration.
    ///
    /// An already-registered id has its surface replaced without the
    /// previous surface being closed. Declared data and subscribers are kept;
    /// the entry starts closed.
    pub fn register(&self, id: impl Into<Id>, surface: Arc<dyn DialogSurface>, config: DialogConfig) {
        let id = id.into();
        log::debug!("registered dialog '{id}'");
        let mut inner = self.write();
        let entry = inner.entries.entry(id).or_insert_with(DialogEntry::empty);
        entry.surface = Some(surface);
        entry.on_open = config.on_open;
        entry.on_close = config.on_close;
        entry.block_overflow = config.block_overflow;
        entry.opened = false;
    }

    /// Detach the surface for `id`.
    ///
    /// A declared entry stays behind with its data and subscribers; a
    /// mount-only entry is removed entirely. The overflow lock is not
    /// touched; the next close rescans and naturally skips the gone entry.
    pub fn unregister(&self, id: &str) -> Result<()> {
        let mut inner = self.write();
        let Some(entry) = inner.entries.get_mut(id) else {
            return Err(Error::UnknownDialog(id.to_owned()));
        };
        entry.surface = None;
        entry.on_open = None;
        entry.on_close = None;
        entry.block_overflow = false;
        entry.opened = false;
        let declared = entry.declared;
        if !declared {
            inner.entries.remove(id);
        }
        log::debug!("unregistered dialog '{id}'");
        Ok(())
    }

    /// Delete the entry for `id` unconditionally, declared or not.
    pub fn remove(&self, id: &str) {
        let mut inner = self.write();
        if inner.entries.remove(id).is_some() {
            log::debug!("removed dialog '{id}'");
        }
    }

    /// Whether an entry (declared or registered) exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Whether the dialog is currently open.
    pub fn is_open(&self, id: &str) -> Result<bool> {
        let inner = self.read();
        let entry = inner
            .entries
            .get(id)
            .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
        Ok(entry.opened)
    }

    /// Open the dialog, attaching `data`.
    ///
    /// Shows the surface, stores the data, notifies subscribers, then awaits
    /// the open handler if one is configured. A handler returning
    /// [`OpenOutcome::Cancel`] closes the dialog again instead of engaging
    /// the overflow lock. If the dialog is closed or unregistered while the
    /// handler runs, the rest of the open is dropped.
    pub async fn open(&self, id: &str, data: Option<Payload>) -> Result<()> {
        let (surface, on_open, block_overflow, listeners, state) = {
            let mut inner = self.write();
            let entry = inner
                .entries
                .get_mut(id)
                .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
            let surface = entry
                .surface
                .clone()
                .ok_or_else(|| Error::DialogNotMounted(id.to_owned()))?;
            entry.opened = true;
            entry.data = data.clone();
            (
                surface,
                entry.on_open.clone(),
                entry.block_overflow,
                entry.listeners.snapshot(),
                DialogState {
                    data: data.clone(),
                    opened: true,
                },
            )
        };
        log::debug!("dialog '{id}' opened");
        surface.show_modal();
        for callback in listeners {
            callback(&state);
        }
        self.wake.ping();

        if let Some(handler) = on_open {
            let outcome = handler(data).await;
            // The dialog may have been closed or unregistered while the
            // handler ran; the continuation belongs to a state that no
            // longer exists and must not touch the entry.
            let blocking = {
                let inner = self.read();
                let Some(entry) = inner.entries.get(id) else {
                    return Ok(());
                };
                if !entry.opened || entry.surface.is_none() {
                    return Ok(());
                }
                entry.block_overflow
            };
            if outcome == OpenOutcome::Cancel {
                log::debug!("open handler vetoed dialog '{id}'");
                return match self.close(id, None) {
                    Err(Error::UnknownDialog(_)) => Ok(()),
                    other => other,
                };
            }
            if blocking {
                self.engage_overflow();
            }
        } else if block_overflow {
            self.engage_overflow();
        }
        Ok(())
    }

    /// Close the dialog, attaching `data`.
    ///
    /// Dismisses the surface, runs the close handler with the data, notifies
    /// subscribers, then releases the overflow lock if no opened blocking
    /// dialog remains. Closing a dialog that is not open does nothing.
    pub fn close(&self, id: &str, data: Option<Payload>) -> Result<()> {
        let (surface, on_close, listeners, state) = {
            let mut inner = self.write();
            let entry = inner
                .entries
                .get_mut(id)
                .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
            if !entry.opened {
                return Ok(());
            }
            entry.opened = false;
            entry.data = data.clone();
            (
                entry.surface.clone(),
                entry.on_close.clone(),
                entry.listeners.snapshot(),
                DialogState {
                    data,
                    opened: false,
                },
            )
        };
        log::debug!("dialog '{id}' closed");
        if let Some(surface) = surface {
            surface.close_modal();
        }
        if let Some(handler) = on_close {
            handler(state.data.clone());
        }
        for callback in listeners {
            callback(&state);
        }
        self.release_overflow_if_clear();
        self.wake.ping();
        Ok(())
    }

    /// Current data for `id`. `None` means reset or never set.
    pub fn get(&self, id: &str) -> Result<Option<Payload>> {
        let inner = self.read();
        let entry = inner
            .entries
            .get(id)
            .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
        Ok(entry.data.clone())
    }

    /// Replace the data for `id` and notify subscribers.
    pub fn update(&self, id: &str, value: Payload) -> Result<()> {
        self.apply_update(id, |_| Some(value))
    }

    /// Replace the data for `id` with a function of the previous data.
    ///
    /// The updater runs under the registry lock and must not call back into
    /// the registry. Subscribers are notified with the new data afterwards.
    pub fn update_with(
        &self,
        id: &str,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        self.apply_update(id, f)
    }

    /// Clear the data for `id` back to `None` and notify subscribers.
    pub fn reset(&self, id: &str) -> Result<()> {
        self.apply_update(id, |_| None)
    }

    fn apply_update(
        &self,
        id: &str,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        let (listeners, state) = {
            let mut inner = self.write();
            let entry = inner
                .entries
                .get_mut(id)
                .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
            entry.data = f(entry.data.clone());
            (
                entry.listeners.snapshot(),
                DialogState {
                    data: entry.data.clone(),
                    opened: entry.opened,
                },
            )
        };
        for callback in listeners {
            callback(&state);
        }
        self.wake.ping();
        Ok(())
    }

    /// Attach a subscriber to `id`. Notified on every open, close, update,
    /// and reset until unsubscribed.
    pub fn subscribe(
        &self,
        id: &str,
        callback: impl Fn(&DialogState) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
        let token = entry.listeners.insert(Arc::new(callback));
        Ok(Subscription {
            id: id.to_owned(),
            token,
        })
    }

    /// Detach a subscriber. Detaching twice is harmless.
    pub fn unsubscribe(&self, subscription: &Subscription) -> Result<()> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(subscription.id())
            .ok_or_else(|| Error::UnknownDialog(subscription.id.clone()))?;
        entry.listeners.remove(&subscription.token);
        Ok(())
    }

    /// Subscribe and read the current state in one step.
    ///
    /// The state returned is the one the subscription starts from, so no
    /// change can fall between the read and the subscription.
    pub fn watch(
        &self,
        id: &str,
        callback: impl Fn(&DialogState) + Send + Sync + 'static,
    ) -> Result<(DialogState, Subscription)> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| Error::UnknownDialog(id.to_owned()))?;
        let token = entry.listeners.insert(Arc::new(callback));
        let state = DialogState {
            data: entry.data.clone(),
            opened: entry.opened,
        };
        Ok((
            state,
            Subscription {
                id: id.to_owned(),
                token,
            },
        ))
    }

    fn engage_overflow(&self) {
        let lock = self.read().overflow_lock.clone();
        if let Some(lock) = lock {
            log::debug!("overflow lock engaged");
            lock.engage();
        }
    }

    /// Release the overflow lock unless some opened dialog still blocks.
    fn release_overflow_if_clear(&self) {
        let (lock, blocked) = {
            let inner = self.read();
            let blocked = inner
                .entries
                .values()
                .any(|entry| entry.opened && entry.block_overflow);
            (inner.overflow_lock.clone(), blocked)
        };
        if let Some(lock) = lock {
            if !blocked {
                log::debug!("overflow lock released");
                lock.release();
            }
        }
    }
}

impl Default for DialogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{payload, payload_as};

    struct NullSurface;

    impl DialogSurface for NullSurface {
        fn show_modal(&self) {}
        fn close_modal(&self) {}
    }

    #[test]
    fn test_declare_keeps_entry_across_unregister() {
        let registry = DialogRegistry::new();
        registry.declare("settings", Some(payload(1u32)));
        registry.register("settings", Arc::new(NullSurface), DialogConfig::new());
        registry.unregister("settings").unwrap();
        assert!(registry.contains("settings"));
        let data = registry.get("settings").unwrap().unwrap();
        assert_eq!(payload_as::<u32>(&data), Some(&1));
    }

    #[test]
    fn test_mount_only_entry_disappears_on_unregister() {
        let registry = DialogRegistry::new();
        registry.register("ephemeral", Arc::new(NullSurface), DialogConfig::new());
        registry.unregister("ephemeral").unwrap();
        assert!(!registry.contains("ephemeral"));
        assert!(matches!(
            registry.unregister("ephemeral"),
            Err(Error::UnknownDialog(_))
        ));
    }

    #[tokio::test]
    async fn test_open_requires_surface() {
        let registry = DialogRegistry::new();
        registry.declare("pending", None);
        assert!(matches!(
            registry.open("pending", None).await,
            Err(Error::DialogNotMounted(_))
        ));
    }
}
