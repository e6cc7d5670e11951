//! Bound dialog facade and the ambient dialog scope.

use crate::error::Result;
use crate::id::{Id, resolve_id};
use crate::observe::Subscription;
use crate::payload::Payload;

use super::store::{DialogRegistry, DialogState};

/// Ambient id of the enclosing dialog.
///
/// Hosts hand a scope to everything rendered inside a dialog so nested code
/// can address "its" dialog without being told the id explicitly.
#[derive(Debug, Clone)]
pub struct DialogScope {
    id: Id,
}

impl DialogScope {
    /// Create a scope for the dialog with `id`.
    pub fn new(id: impl Into<Id>) -> Self {
        Self { id: id.into() }
    }

    /// The enclosing dialog's id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Dialog operations bound to one resolved id.
///
/// Binding resolves the id once, explicit argument first, enclosing scope
/// second, so a facade used with neither fails immediately instead of on
/// first use.
///
/// # Example
///
/// ```ignore
/// let dialog = DialogHandle::bind(&registry, None, Some(&scope))?;
/// dialog.open(Some(payload(item_id))).await?;
/// ```
#[derive(Clone)]
pub struct DialogHandle {
    registry: DialogRegistry,
    id: Id,
}

impl DialogHandle {
    /// Bind a facade to the id resolved from `explicit` or `scope`.
    pub fn bind(
        registry: &DialogRegistry,
        explicit: Option<&str>,
        scope: Option<&DialogScope>,
    ) -> Result<Self> {
        let id = resolve_id(explicit, None, scope.map(DialogScope::id))?;
        Ok(Self {
            registry: registry.clone(),
            id,
        })
    }

    /// The id this facade is bound to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Open the bound dialog. See [`DialogRegistry::open`].
    pub async fn open(&self, data: Option<Payload>) -> Result<()> {
        self.registry.open(&self.id, data).await
    }

    /// Close the bound dialog. See [`DialogRegistry::close`].
    pub fn close(&self, data: Option<Payload>) -> Result<()> {
        self.registry.close(&self.id, data)
    }

    /// Whether the bound dialog is currently open.
    pub fn is_open(&self) -> Result<bool> {
        self.registry.is_open(&self.id)
    }

    /// Current data for the bound dialog.
    pub fn get(&self) -> Result<Option<Payload>> {
        self.registry.get(&self.id)
    }

    /// Replace the bound dialog's data.
    pub fn update(&self, value: Payload) -> Result<()> {
        self.registry.update(&self.id, value)
    }

    /// Replace the bound dialog's data with a function of the previous data.
    pub fn update_with(
        &self,
        f: impl FnOnce(Option<Payload>) -> Option<Payload>,
    ) -> Result<()> {
        self.registry.update_with(&self.id, f)
    }

    /// Clear the bound dialog's data.
    pub fn reset(&self) -> Result<()> {
        self.registry.reset(&self.id)
    }

    /// Attach a subscriber to the bound dialog.
    pub fn subscribe(
        &self,
        callback: impl Fn(&DialogState) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        self.registry.subscribe(&self.id, callback)
    }

    /// Detach a subscriber.
    pub fn unsubscribe(&self, subscription: &Subscription) -> Result<()> {
        self.registry.unsubscribe(subscription)
    }

    /// Subscribe and read the current state in one step.
    pub fn watch(
        &self,
        callback: impl Fn(&DialogState) + Send + Sync + 'static,
    ) -> Result<(DialogState, Subscription)> {
        self.registry.watch(&self.id, callback)
    }
}
