//! Bound upper-layer facade and the ambient layer scope.

use crate::error::Result;
use crate::id::{Id, resolve_id};
use crate::observe::Subscription;
use crate::payload::Payload;

use super::store::OverlayRegistry;

/// Ambient id of the enclosing upper layer.
///
/// Hosts hand a scope to everything rendered inside a layer so nested code
/// can address "its" layer without being told the id explicitly.
#[derive(Debug, Clone)]
pub struct OverlayScope {
    id: Id,
}

impl OverlayScope {
    /// Create a scope for the layer with `id`.
    pub fn new(id: impl Into<Id>) -> Self {
        Self { id: id.into() }
    }

    /// The enclosing layer's id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Upper-layer operations bound to one resolved id.
///
/// Binding resolves the id once, explicit argument first, enclosing scope
/// second, so a facade used with neither fails immediately instead of on
/// first use.
#[derive(Clone)]
pub struct OverlayHandle {
    registry: OverlayRegistry,
    id: Id,
}

impl OverlayHandle {
    /// Bind a facade to the id resolved from `explicit` or `scope`.
    pub fn bind(
        registry: &OverlayRegistry,
        explicit: Option<&str>,
        scope: Option<&OverlayScope>,
    ) -> Result<Self> {
        let id = resolve_id(explicit, None, scope.map(OverlayScope::id))?;
        Ok(Self {
            registry: registry.clone(),
            id,
        })
    }

    /// The id this facade is bound to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current value of the bound layer.
    pub fn get(&self) -> Result<Option<Payload>> {
        self.registry.get(&self.id)
    }

    /// Replace the bound layer's value.
    pub fn update(&self, value: Payload) -> Result<()> {
        self.registry.update(&self.id, value)
    }

    /// Replace the bound layer's value with a function of the previous one.
    pub fn update_with(
        &self,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        self.registry.update_with(&self.id, f)
    }

    /// Clear the bound layer's value.
    pub fn reset(&self) -> Result<()> {
        self.registry.reset(&self.id)
    }

    /// Attach a subscriber to the bound layer.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Option<Payload>) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        self.registry.subscribe(&self.id, callback)
    }

    /// Detach a subscriber.
    pub fn unsubscribe(&self, subscription: &Subscription) -> Result<()> {
        self.registry.unsubscribe(subscription)
    }

    /// Subscribe and read the current value in one step.
    pub fn watch(
        &self,
        callback: impl Fn(&Option<Payload>) + Send + Sync + 'static,
    ) -> Result<(Option<Payload>, Subscription)> {
        self.registry.watch(&self.id, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::payload::{payload, payload_as};

    #[test]
    fn test_scope_supplies_ambient_id() {
        let registry = OverlayRegistry::new([("sidebar".to_owned(), None)]);
        let scope = OverlayScope::new("sidebar");
        let handle = OverlayHandle::bind(&registry, None, Some(&scope)).unwrap();
        handle.update(payload("open")).unwrap();
        let value = registry.get("sidebar").unwrap().unwrap();
        assert_eq!(payload_as::<&str>(&value), Some(&"open"));
    }

    #[test]
    fn test_bind_without_any_id_fails() {
        let registry = OverlayRegistry::new([]);
        assert!(matches!(
            OverlayHandle::bind(&registry, None, None),
            Err(Error::MissingId)
        ));
    }
}
