//! Dialog registry - modal surfaces addressable by id.
//!
//! A dialog is declared or registered under a caller-chosen id, after which
//! anything holding the registry (or the command bus) can open and close it,
//! attach data to it, and subscribe to its changes. Blocking dialogs share a
//! single host-provided overflow lock that is held while any of them is
//! open.

mod handle;
mod store;
mod surface;

pub(crate) use store::{CloseHandler, OpenHandler};

pub use handle::{DialogHandle, DialogScope};
pub use store::{DialogConfig, DialogRegistry, DialogState, OpenOutcome};
pub use surface::{DialogSurface, OverflowLock};
