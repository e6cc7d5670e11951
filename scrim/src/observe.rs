//! Subscriber bookkeeping shared by the keyed stores.
//!
//! Each store entry owns a [`Listeners`] set; subscribers hold only a
//! [`Subscription`] token. Stores mutate under their own lock, snapshot the
//! callbacks, drop the guard, and then notify, so a callback can call back
//! into the store without deadlocking.

use std::sync::Arc;

use uuid::Uuid;

use crate::id::Id;

/// Shared callback stored for one subscriber.
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Token returned by `subscribe`; pass it back to `unsubscribe` to detach.
///
/// Dropping the token does nothing; a listener stays attached for the
/// store's lifetime unless explicitly unsubscribed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) id: Id,
    pub(crate) token: Uuid,
}

impl Subscription {
    /// The entry id this subscription listens to.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered set of subscriber callbacks for one entry.
///
/// Iteration order is subscription order, so every notification reaches
/// subscribers in the order they attached.
pub struct Listeners<A> {
    entries: Vec<(Uuid, Callback<A>)>,
}

impl<A> Listeners<A> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Attach a callback, returning its token.
    pub fn insert(&mut self, callback: Callback<A>) -> Uuid {
        let token = Uuid::new_v4();
        self.entries.push((token, callback));
        token
    }

    /// Detach the callback with `token`. Returns false if it was not
    /// attached.
    pub fn remove(&mut self, token: &Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| t != token);
        self.entries.len() != before
    }

    /// Clone out the callbacks for notification outside the store lock.
    pub fn snapshot(&self) -> Vec<Callback<A>> {
        self.entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }

    /// Number of attached callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no callbacks are attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for Listeners<A> {
    fn default() -> Self {
        Self::new()
    }
}
