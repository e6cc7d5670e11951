//! Upper-layer value store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::id::Id;
use crate::observe::{Listeners, Subscription};
use crate::payload::Payload;
use crate::wake::{WakeHandle, WakeSender};

struct OverlayEntry {
    data: Option<Payload>,
    listeners: Listeners<Option<Payload>>,
}

struct OverlayInner {
    entries: HashMap<Id, OverlayEntry>,
}

/// Keyed value store backing stacked overlay ("upper layer") components.
///
/// The set of ids is fixed at construction; an id that was not declared can
/// never be created later, operations on it always fail. Values are opaque
/// payloads, `None` standing for "no value" before the first update and
/// after a reset. Every mutation synchronously notifies that id's
/// subscribers with the new value.
#[derive(Clone)]
pub struct OverlayRegistry {
    inner: Arc<RwLock<OverlayInner>>,
    wake: WakeHandle,
}

impl OverlayRegistry {
    /// Create a store seeded with the declared ids and their default data.
    pub fn new(declarations: impl IntoIterator<Item = (Id, Option<Payload>)>) -> Self {
        let entries = declarations
            .into_iter()
            .map(|(id, data)| {
                (
                    id,
                    OverlayEntry {
                        data,
                        listeners: Listeners::new(),
                    },
                )
            })
            .collect();
        Self {
            inner: Arc::new(RwLock::new(OverlayInner { entries })),
            wake: WakeHandle::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, OverlayInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, OverlayInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Install a wake sender pinged after every mutation.
    pub fn install_wake(&self, sender: WakeSender) {
        self.wake.install(sender);
    }

    /// Seed one more declared id. Build-time only; the public surface never
    /// creates ids after construction.
    pub(crate) fn declare(&self, id: Id, default_data: Option<Payload>) {
        log::debug!("declared upper layer '{id}'");
        self.write().entries.entry(id).or_insert(OverlayEntry {
            data: default_data,
            listeners: Listeners::new(),
        });
    }

    /// Whether `id` was declared.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Current value for `id`. `None` before the first update or after a
    /// reset.
    pub fn get(&self, id: &str) -> Result<Option<Payload>> {
        let inner = self.read();
        let entry = inner
            .entries
            .get(id)
            .ok_or_else(|| Error::UnknownUpperLayer(id.to_owned()))?;
        Ok(entry.data.clone())
    }

    /// Replace the value for `id` and notify its subscribers.
    pub fn update(&self, id: &str, value: Payload) -> Result<()> {
        self.apply_update(id, |_| Some(value))
    }

    /// Replace the value for `id` with a function of the previous value.
    ///
    /// The updater runs under the store lock and must not call back into the
    /// store. Subscribers see the new value afterwards.
    pub fn update_with(
        &self,
        id: &str,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        self.apply_update(id, f)
    }

    /// Clear the value for `id` back to `None` and notify its subscribers.
    pub fn reset(&self, id: &str) -> Result<()> {
        self.apply_update(id, |_| None)
    }

    fn apply_update(
        &self,
        id: &str,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        let (listeners, value) = {
            let mut inner = self.write();
            let entry = inner
                .entries
                .get_mut(id)
                .ok_or_else(|| Error::UnknownUpperLayer(id.to_owned()))?;
            entry.data = f(entry.data.clone());
            (entry.listeners.snapshot(), entry.data.clone())
        };
        log::debug!("upper layer '{id}' updated");
        for callback in listeners {
            callback(&value);
        }
        self.wake.ping();
        Ok(())
    }

    /// Attach a subscriber to `id`, notified on every update and reset.
    pub fn subscribe(
        &self,
        id: &str,
        callback: impl Fn(&Option<Payload>) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| Error::UnknownUpperLayer(id.to_owned()))?;
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
            .ok_or_else(|| Error::UnknownUpperLayer(subscription.id().to_owned()))?;
        entry.listeners.remove(&subscription.token);
        Ok(())
    }

    /// Subscribe and read the current value in one step.
    ///
    /// The returned value is the one the subscription starts from, so no
    /// update can fall between the read and the subscription.
    pub fn watch(
        &self,
        id: &str,
        callback: impl Fn(&Option<Payload>) + Send + Sync + 'static,
    ) -> Result<(Option<Payload>, Subscription)> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| Error::UnknownUpperLayer(id.to_owned()))?;
        let token = entry.listeners.insert(Arc::new(callback));
        Ok((
            entry.data.clone(),
            Subscription {
                id: id.to_owned(),
                token,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::payload::{payload, payload_as};

    fn store() -> OverlayRegistry {
        OverlayRegistry::new([("panel".to_owned(), Some(payload(0u32)))])
    }

    #[test]
    fn test_undeclared_id_is_never_creatable() {
        let store = store();
        assert!(store.update("ghost", payload(1u32)).is_err());
        assert!(store.get("ghost").is_err());
        assert!(!store.contains("ghost"));
    }

    #[test]
    fn test_update_with_sees_previous_value() {
        let store = store();
        store
            .update_with("panel", |prev| {
                let prev = prev
                    .as_ref()
                    .and_then(|p| payload_as::<u32>(p).copied())
                    .unwrap_or(0);
                Some(payload(prev + 5))
            })
            .unwrap();
        let value = store.get("panel").unwrap().unwrap();
        assert_eq!(payload_as::<u32>(&value), Some(&5));
    }

    #[test]
    fn test_watch_returns_value_and_live_subscription() {
        let store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (current, subscription) = {
            let seen = Arc::clone(&seen);
            store
                .watch("panel", move |value| {
                    let value = value
                        .as_ref()
                        .and_then(|p| payload_as::<u32>(p).copied())
                        .unwrap_or(0);
                    seen.lock().unwrap().push(value);
                })
                .unwrap()
        };
        assert_eq!(payload_as::<u32>(&current.unwrap()), Some(&0));
        store.update("panel", payload(3u32)).unwrap();
        store.unsubscribe(&subscription).unwrap();
        store.update("panel", payload(4u32)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }
}
