//! The provider: owns the registries and the remote-control wiring.

use std::sync::Arc;

use futures::FutureExt;

use crate::bus::{BusGuard, CommandBus};
use crate::dialog::{
    DialogConfig, DialogHandle, DialogRegistry, DialogScope, DialogSurface, OpenOutcome,
    OverflowLock,
};
use crate::error::Result;
use crate::id::Id;
use crate::overlay::{OverlayHandle, OverlayRegistry, OverlayScope};
use crate::payload::Payload;
use crate::remote::{
    CloseDialog, HideToast, OpenDialog, ResetUpperLayer, ShowToast, UpdateUpperLayer,
};
use crate::toaster::{ToastRenderer, ToastSink, ToasterRegistry};
use crate::wake::WakeSender;

/// Owner of the three registries and their remote-control subscriptions.
///
/// One `Scrim` per independent tree; nothing here is process-wide. Dropping
/// it detaches its bus handlers and, since the registries die with it,
/// leaves other trees untouched.
///
/// # Example
///
/// ```ignore
/// let bus = CommandBus::new();
/// let scrim = Scrim::new()
///     .dialog("settings", None)
///     .upper_layer("sidebar", Some(payload(SidebarState::default())))
///     .toast_renderer(render_toast)
///     .attach(&bus);
///
/// let scope = scrim.mount_dialog("settings", surface, DialogConfig::new());
/// remote::open_dialog(&bus, scope.id(), None);
/// ```
pub struct Scrim {
    dialogs: DialogRegistry,
    toaster: ToasterRegistry,
    overlays: OverlayRegistry,
    bus_guards: Vec<BusGuard>,
}

impl Scrim {
    /// Create a provider with empty registries.
    pub fn new() -> Self {
        Self {
            dialogs: DialogRegistry::new(),
            toaster: ToasterRegistry::new(),
            overlays: OverlayRegistry::new([]),
            bus_guards: Vec::new(),
        }
    }

    /// Declare a dialog id with optional default data.
    pub fn dialog(self, id: impl Into<Id>, default_data: Option<Payload>) -> Self {
        self.dialogs.declare(id, default_data);
        self
    }

    /// Declare an upper layer id with optional default data.
    ///
    /// Upper layers exist only if declared here; there is no way to add one
    /// after the provider is built.
    pub fn upper_layer(self, id: impl Into<Id>, default_data: Option<Payload>) -> Self {
        self.overlays.declare(id.into(), default_data);
        self
    }

    /// Set the renderer applied to toast data on every show.
    pub fn toast_renderer<R: ToastRenderer + 'static>(self, renderer: R) -> Self {
        self.toaster.set_renderer(Arc::new(renderer));
        self
    }

    /// Set the shared lock held while any blocking dialog is open.
    pub fn overflow_lock(self, lock: Arc<dyn OverflowLock>) -> Self {
        self.dialogs.set_overflow_lock(lock);
        self
    }

    /// Subscribe the six remote-control command handlers on `bus`.
    ///
    /// Handlers stay attached until the provider is dropped. Errors inside a
    /// handler are logged and the command dropped; the bus has no reply
    /// channel. Open commands run the dialog's async open path on a spawned
    /// task, so publishing them requires a Tokio runtime.
    pub fn attach(mut self, bus: &CommandBus) -> Self {
        let open_guard = {
            let dialogs = self.dialogs.clone();
            bus.subscribe::<OpenDialog, _>(move |command| {
                let dialogs = dialogs.clone();
                let command = command.clone();
                tokio::spawn(async move {
                    if let Err(err) = dialogs.open(&command.id, command.data).await {
                        log::warn!("dropping open-dialog command: {err}");
                    }
                });
            })
        };
        let close_guard = {
            let dialogs = self.dialogs.clone();
            bus.subscribe::<CloseDialog, _>(move |command| {
                if let Err(err) = dialogs.close(&command.id, command.data.clone()) {
                    log::warn!("dropping close-dialog command: {err}");
                }
            })
        };
        let show_guard = {
            let toaster = self.toaster.clone();
            bus.subscribe::<ShowToast, _>(move |command| {
                toaster.show(
                    command.id.clone(),
                    command.data.clone(),
                    command.layers.clone(),
                );
            })
        };
        let hide_guard = {
            let toaster = self.toaster.clone();
            bus.subscribe::<HideToast, _>(move |command| toaster.hide(&command.id))
        };
        let update_guard = {
            let overlays = self.overlays.clone();
            bus.subscribe::<UpdateUpperLayer, _>(move |command| {
                if let Err(err) = overlays.update(&command.id, command.state.clone()) {
                    log::warn!("dropping update-upper-layer command: {err}");
                }
            })
        };
        let reset_guard = {
            let overlays = self.overlays.clone();
            bus.subscribe::<ResetUpperLayer, _>(move |command| {
                if let Err(err) = overlays.reset(&command.id) {
                    log::warn!("dropping reset-upper-layer command: {err}");
                }
            })
        };
        self.bus_guards.extend([
            open_guard,
            close_guard,
            show_guard,
            hide_guard,
            update_guard,
            reset_guard,
        ]);
        self
    }

    /// Install one wake sender across all three registries.
    pub fn install_wake(&self, sender: WakeSender) {
        self.dialogs.install_wake(sender.clone());
        self.toaster.install_wake(sender.clone());
        self.overlays.install_wake(sender);
    }

    /// The dialog registry.
    pub fn dialogs(&self) -> &DialogRegistry {
        &self.dialogs
    }

    /// The toaster registry.
    pub fn toaster(&self) -> &ToasterRegistry {
        &self.toaster
    }

    /// The upper-layer registry.
    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    /// Bind a dialog facade. See [`DialogHandle::bind`].
    pub fn dialog_handle(
        &self,
        explicit: Option<&str>,
        scope: Option<&DialogScope>,
    ) -> Result<DialogHandle> {
        DialogHandle::bind(&self.dialogs, explicit, scope)
    }

    /// Bind an upper-layer facade. See [`OverlayHandle::bind`].
    pub fn overlay_handle(
        &self,
        explicit: Option<&str>,
        scope: Option<&OverlayScope>,
    ) -> Result<OverlayHandle> {
        OverlayHandle::bind(&self.overlays, explicit, scope)
    }

    /// Register a dialog surface whose open activates the same-id toast
    /// layer and whose close deactivates it.
    ///
    /// The user handlers from `config` still run, after the layer switch.
    /// Returns the scope handed to everything rendered inside the dialog; a
    /// dialog usually mounts its own toast layer under the same id.
    pub fn mount_dialog(
        &self,
        id: impl Into<Id>,
        surface: Arc<dyn DialogSurface>,
        config: DialogConfig,
    ) -> DialogScope {
        let id = id.into();
        let DialogConfig {
            block_overflow,
            on_open,
            on_close,
        } = config;

        let wrapped_open = {
            let toaster = self.toaster.clone();
            let id = id.clone();
            move |data: Option<Payload>| {
                if let Err(err) = toaster.activate(&id) {
                    log::debug!("dialog '{id}' has no toast layer to activate: {err}");
                }
                match &on_open {
                    Some(handler) => handler(data),
                    None => async { OpenOutcome::Open }.boxed(),
                }
            }
        };
        let wrapped_close = {
            let toaster = self.toaster.clone();
            let id = id.clone();
            move |data: Option<Payload>| {
                if let Err(err) = toaster.deactivate(&id) {
                    log::debug!("dialog '{id}' has no toast layer to deactivate: {err}");
                }
                if let Some(handler) = &on_close {
                    handler(data);
                }
            }
        };
        let wrapped = DialogConfig {
            block_overflow,
            on_open: Some(Arc::new(wrapped_open)),
            on_close: Some(Arc::new(wrapped_close)),
        };
        self.dialogs.register(id.clone(), surface, wrapped);
        DialogScope::new(id)
    }

    /// Register a toast layer sink, unregistered again when the returned
    /// guard drops.
    pub fn mount_toast_layer(
        &self,
        id: impl Into<Id>,
        sink: Arc<dyn ToastSink>,
    ) -> ToastLayerGuard {
        let id = id.into();
        self.toaster.register(id.clone(), sink);
        ToastLayerGuard {
            toaster: self.toaster.clone(),
            id,
        }
    }
}

impl Default for Scrim {
    fn default() -> Self {
        Self::new()
    }
}

/// Unregisters its toast layer when dropped.
#[must_use = "dropping the guard unregisters the layer"]
pub struct ToastLayerGuard {
    toaster: ToasterRegistry,
    id: Id,
}

impl ToastLayerGuard {
    /// The mounted layer's id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unregister the layer now instead of at end of scope.
    pub fn unmount(self) {}
}

impl Drop for ToastLayerGuard {
    fn drop(&mut self) {
        if let Err(err) = self.toaster.unregister(&self.id) {
            log::debug!("toast layer '{}' was already gone: {err}", self.id);
        }
    }
}
