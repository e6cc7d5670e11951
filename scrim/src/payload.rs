//! Opaque values carried through the registries.

use std::any::Any;
use std::sync::Arc;

/// Opaque payload attached to dialog opens/closes, toasts, and upper-layer
/// values.
///
/// Payloads are reference-counted so a registry can hand the same value to
/// several listeners without cloning the underlying data. The registries
/// never look inside a payload; consumers downcast back to the concrete
/// type they put in.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Wrap a value as a [`Payload`].
///
/// # Example
///
/// ```
/// use scrim::payload::{payload, payload_as};
///
/// let value = payload(42u32);
/// assert_eq!(payload_as::<u32>(&value), Some(&42));
/// ```
pub fn payload<T: Send + Sync + 'static>(value: T) -> Payload {
    Arc::new(value)
}

/// Borrow a payload as a concrete type.
///
/// Returns `None` when the payload holds a different type.
pub fn payload_as<T: 'static>(payload: &Payload) -> Option<&T> {
    payload.downcast_ref::<T>()
}
