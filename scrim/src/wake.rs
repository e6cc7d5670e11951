//! Wake channel for on-demand rendering.
//!
//! Hosts that render on demand block between frames. The registries ping
//! the wake channel after every mutation so the host can schedule a repaint;
//! redundant pings collapse into a single wake.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Sender half of the wake channel.
#[derive(Clone, Debug)]
pub struct WakeSender {
    tx: mpsc::Sender<()>,
}

impl WakeSender {
    /// Send a wake signal.
    ///
    /// Non-blocking. A full channel means a repaint is already pending; a
    /// closed one means the host is shutting down. Both are ignored.
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wake channel.
pub struct WakeReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeReceiver {
    /// Wait for the next wake signal.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Consume any buffered signals.
    ///
    /// Called after waking so queued pings collapse into one repaint.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create a wake channel pair.
pub fn channel() -> (WakeSender, WakeReceiver) {
    let (tx, rx) = mpsc::channel(16);
    (WakeSender { tx }, WakeReceiver { rx })
}

/// Installable wake slot shared by the registries.
///
/// Starts empty; pinging is a no-op until the host installs a sender.
#[derive(Debug, Default, Clone)]
pub struct WakeHandle {
    inner: Arc<Mutex<Option<WakeSender>>>,
}

impl WakeHandle {
    /// Create a new empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sender.
    pub fn install(&self, sender: WakeSender) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(sender);
        }
    }

    /// Ping the channel if a sender is installed.
    pub fn ping(&self) {
        if let Ok(guard) = self.inner.lock() {
            if let Some(sender) = guard.as_ref() {
                sender.send();
            }
        }
    }
}
