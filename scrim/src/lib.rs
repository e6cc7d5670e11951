pub mod bus;
pub mod dialog;
pub mod error;
pub mod id;
pub mod observe;
pub mod overlay;
pub mod payload;
pub mod provider;
pub mod remote;
pub mod toaster;
pub mod wake;

pub use bus::{BusGuard, Command, CommandBus};
pub use error::{Error, Result};
pub use payload::{Payload, payload, payload_as};
pub use provider::Scrim;

pub mod prelude {
    pub use crate::bus::{BusGuard, Command, CommandBus};
    pub use crate::dialog::{
        DialogConfig, DialogHandle, DialogRegistry, DialogScope, DialogState, DialogSurface,
        OpenOutcome, OverflowLock,
    };
    pub use crate::error::{Error, Result};
    pub use crate::id::{Id, resolve_id};
    pub use crate::observe::Subscription;
    pub use crate::overlay::{OverlayHandle, OverlayRegistry, OverlayScope};
    pub use crate::payload::{Payload, payload, payload_as};
    pub use crate::provider::{Scrim, ToastLayerGuard};
    pub use crate::remote;
    pub use crate::toaster::{Dismiss, Toast, ToastRenderer, ToastSink, ToasterRegistry};
    pub use crate::wake::{WakeHandle, WakeReceiver, WakeSender};
}
