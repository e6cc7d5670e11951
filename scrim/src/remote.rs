//! Remote-control commands and publish helpers.
//!
//! Everything a provider can be asked to do is expressible as a command on
//! the bus. The helpers here are the imperative surface for code that holds
//! a bus but none of the registries.
//!
//! # Example
//!
//! ```ignore
//! // From anywhere with a bus clone:
//! remote::open_dialog(&bus, "settings", None);
//! remote::show_toast(&bus, "saved", payload("Saved"), None);
//! ```

use crate::bus::{Command, CommandBus};
use crate::id::Id;
use crate::payload::Payload;

/// Ask the provider to open a dialog.
#[derive(Clone)]
pub struct OpenDialog {
    /// Target dialog id.
    pub id: Id,
    /// Data attached to the open.
    pub data: Option<Payload>,
}

impl Command for OpenDialog {
    const TOPIC: &'static str = "open-dialog";
}

/// Ask the provider to close a dialog.
#[derive(Clone)]
pub struct CloseDialog {
    /// Target dialog id.
    pub id: Id,
    /// Data attached to the close.
    pub data: Option<Payload>,
}

impl Command for CloseDialog {
    const TOPIC: &'static str = "close-dialog";
}

/// Ask the provider to show a toast.
#[derive(Clone)]
pub struct ShowToast {
    /// Toast id.
    pub id: Id,
    /// Toast data, rendered by the provider's renderer.
    pub data: Payload,
    /// Target layer ids; `None` broadcasts.
    pub layers: Option<Vec<Id>>,
}

impl Command for ShowToast {
    const TOPIC: &'static str = "show-toast";
}

/// Ask the provider to hide a toast.
#[derive(Clone)]
pub struct HideToast {
    /// Toast id.
    pub id: Id,
}

impl Command for HideToast {
    const TOPIC: &'static str = "hide-toast";
}

/// Ask the provider to update an upper layer's value.
#[derive(Clone)]
pub struct UpdateUpperLayer {
    /// Target layer id.
    pub id: Id,
    /// New value.
    pub state: Payload,
}

impl Command for UpdateUpperLayer {
    const TOPIC: &'static str = "update-upper-layer";
}

/// Ask the provider to reset an upper layer's value.
#[derive(Clone)]
pub struct ResetUpperLayer {
    /// Target layer id.
    pub id: Id,
}

impl Command for ResetUpperLayer {
    const TOPIC: &'static str = "reset-upper-layer";
}

/// Publish an [`OpenDialog`] command.
pub fn open_dialog(bus: &CommandBus, id: impl Into<Id>, data: Option<Payload>) {
    bus.publish(OpenDialog {
        id: id.into(),
        data,
    });
}

/// Publish a [`CloseDialog`] command.
pub fn close_dialog(bus: &CommandBus, id: impl Into<Id>, data: Option<Payload>) {
    bus.publish(CloseDialog {
        id: id.into(),
        data,
    });
}

/// Publish a [`ShowToast`] command.
pub fn show_toast(bus: &CommandBus, id: impl Into<Id>, data: Payload, layers: Option<Vec<Id>>) {
    bus.publish(ShowToast {
        id: id.into(),
        data,
        layers,
    });
}

/// Publish a [`HideToast`] command.
pub fn hide_toast(bus: &CommandBus, id: impl Into<Id>) {
    bus.publish(HideToast { id: id.into() });
}

/// Publish an [`UpdateUpperLayer`] command.
pub fn update_upper_layer(bus: &CommandBus, id: impl Into<Id>, state: Payload) {
    bus.publish(UpdateUpperLayer {
        id: id.into(),
        state,
    });
}

/// Publish a [`ResetUpperLayer`] command.
pub fn reset_upper_layer(bus: &CommandBus, id: impl Into<Id>) {
    bus.publish(ResetUpperLayer { id: id.into() });
}
