//! In-process command bus.
//!
//! Commands are plain values published under a static topic name. The
//! provider subscribes a handler per topic and forwards each command to the
//! matching registry, so code with no access to the registries can still
//! drive them.
//!
//! Dispatch never holds the bus lock while a handler runs: publishing
//! snapshots the handler list first, so a handler may publish further
//! commands or attach new subscribers without deadlocking.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use uuid::Uuid;

/// Message carried on the [`CommandBus`].
///
/// Every command type names the topic it travels under. Two types must not
/// share a topic; a subscriber only sees payloads of its own type.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct Refresh;
///
/// impl Command for Refresh {
///     const TOPIC: &'static str = "app.refresh";
/// }
/// ```
pub trait Command: Clone + Send + Sync + 'static {
    /// Topic this command is published under.
    const TOPIC: &'static str;
}

type Handler = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    topics: HashMap<&'static str, Vec<(Uuid, Handler)>>,
}

/// Topic-keyed publish/subscribe channel connecting callers to the
/// registries.
///
/// Cloning is cheap and every clone publishes into the same channel.
#[derive(Clone, Default)]
pub struct CommandBus {
    inner: Arc<RwLock<BusInner>>,
}

impl CommandBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BusInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BusInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Attach `handler` to the command type's topic.
    ///
    /// The handler stays attached until the returned [`BusGuard`] is
    /// dropped.
    pub fn subscribe<C, F>(&self, handler: F) -> BusGuard
    where
        C: Command,
        F: Fn(&C) + Send + Sync + 'static,
    {
        let token = Uuid::new_v4();
        let erased: Handler = Arc::new(move |payload| match payload.downcast_ref::<C>() {
            Some(command) => handler(command),
            None => log::error!(
                "dropping command on topic '{}': payload is not {}",
                C::TOPIC,
                std::any::type_name::<C>()
            ),
        });
        self.write()
            .topics
            .entry(C::TOPIC)
            .or_default()
            .push((token, erased));
        log::debug!("subscribed to topic '{}'", C::TOPIC);
        BusGuard {
            bus: Arc::downgrade(&self.inner),
            topic: C::TOPIC,
            token,
        }
    }

    /// Publish `command` to every subscriber of its topic, in subscription
    /// order.
    pub fn publish<C: Command>(&self, command: C) {
        let handlers: Vec<Handler> = {
            let inner = self.read();
            match inner.topics.get(C::TOPIC) {
                Some(handlers) => handlers
                    .iter()
                    .map(|(_, handler)| Arc::clone(handler))
                    .collect(),
                None => Vec::new(),
            }
        };
        if handlers.is_empty() {
            log::debug!("no subscribers for topic '{}'", C::TOPIC);
            return;
        }
        let payload: &(dyn Any + Send + Sync) = &command;
        for handler in handlers {
            handler(payload);
        }
    }

    /// Number of handlers attached to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read().topics.get(topic).map_or(0, Vec::len)
    }
}

/// Detaches its handler from the bus when dropped.
///
/// Holds only a weak reference, so an outliving guard does not keep the bus
/// alive.
#[must_use = "dropping the guard detaches the handler"]
pub struct BusGuard {
    bus: Weak<RwLock<BusInner>>,
    topic: &'static str,
    token: Uuid,
}

impl BusGuard {
    /// Detach the handler now instead of at end of scope.
    pub fn detach(self) {}
}

impl Drop for BusGuard {
    fn drop(&mut self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        let mut inner = inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(handlers) = inner.topics.get_mut(self.topic) {
            handlers.retain(|(token, _)| token != &self.token);
            if handlers.is_empty() {
                inner.topics.remove(self.topic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone)]
    struct Ping(u32);

    impl Command for Ping {
        const TOPIC: &'static str = "test.ping";
    }

    #[derive(Clone)]
    struct Pong(u32);

    impl Command for Pong {
        const TOPIC: &'static str = "test.pong";
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let bus = CommandBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = Arc::clone(&seen);
            bus.subscribe::<Ping, _>(move |ping| seen.lock().unwrap().push(("first", ping.0)))
        };
        let second = {
            let seen = Arc::clone(&seen);
            bus.subscribe::<Ping, _>(move |ping| seen.lock().unwrap().push(("second", ping.0)))
        };

        bus.publish(Ping(7));
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);

        drop(first);
        drop(second);
    }

    #[test]
    fn test_guard_drop_detaches_handler() {
        let bus = CommandBus::new();
        let seen = Arc::new(Mutex::new(0u32));

        let guard = {
            let seen = Arc::clone(&seen);
            bus.subscribe::<Ping, _>(move |_| *seen.lock().unwrap() += 1)
        };
        bus.publish(Ping(1));
        assert_eq!(bus.subscriber_count(Ping::TOPIC), 1);

        drop(guard);
        bus.publish(Ping(2));
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count(Ping::TOPIC), 0);
    }

    #[test]
    fn test_handler_may_publish_without_deadlock() {
        let bus = CommandBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let relay = {
            let bus = bus.clone();
            bus.clone()
                .subscribe::<Ping, _>(move |ping| bus.publish(Pong(ping.0 + 1)))
        };
        let sink = {
            let seen = Arc::clone(&seen);
            bus.subscribe::<Pong, _>(move |pong| seen.lock().unwrap().push(pong.0))
        };

        bus.publish(Ping(1));
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        relay.detach();
        sink.detach();
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = CommandBus::new();
        bus.publish(Ping(9));
        assert_eq!(bus.subscriber_count(Ping::TOPIC), 0);
    }
}
