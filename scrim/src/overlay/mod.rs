//! Upper-layer registry - keyed values backing stacked overlay components.
//!
//! Layer ids are declared up front when the provider is built; each carries
//! an opaque value that components read, update, and subscribe to. Unlike
//! dialogs and toast layers there is nothing to mount: the store is the
//! whole subsystem, the host only renders what the values say.

mod handle;
mod store;

pub use handle::{OverlayHandle, OverlayScope};
pub use store::OverlayRegistry;
