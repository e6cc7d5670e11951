//! Notifications Example
//!
//! Toast layers and an upper layer, driven over the command bus:
//! - A page layer that receives toasts as they are shown
//! - A scoped layer mounted late that catches up on activation
//! - A renderer that bakes a dismiss handle into each toast
//! - A status-bar upper layer updated and reset remotely

use std::collections::HashMap;
use std::fs::File;
use std::sync::{Arc, Mutex};

use scrim::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Stand-in for an on-screen toast stack; prints its visible list.
struct TerminalLayer {
    name: &'static str,
    visible: Mutex<Vec<(String, String)>>,
}

impl TerminalLayer {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            visible: Mutex::new(Vec::new()),
        }
    }

    fn print(&self, visible: &[(String, String)]) {
        let texts: Vec<&str> = visible.iter().map(|(_, text)| text.as_str()).collect();
        println!("[{}] {:?}", self.name, texts);
    }
}

fn text_of(content: &Payload) -> String {
    payload_as::<String>(content)
        .cloned()
        .unwrap_or_else(|| String::from("<opaque>"))
}

impl ToastSink for TerminalLayer {
    fn activate(&self, toasts: Vec<Toast>) {
        let mut visible = self.visible.lock().unwrap();
        *visible = toasts
            .into_iter()
            .map(|toast| (toast.id, text_of(&toast.content)))
            .collect();
        self.print(&visible);
    }

    fn deactivate(&self) {
        let mut visible = self.visible.lock().unwrap();
        visible.clear();
        self.print(&visible);
    }

    fn show_toast(&self, id: &str, content: Payload) {
        let mut visible = self.visible.lock().unwrap();
        visible.push((id.to_owned(), text_of(&content)));
        self.print(&visible);
    }

    fn hide_toast(&self, id: &str) {
        let mut visible = self.visible.lock().unwrap();
        visible.retain(|(toast_id, _)| toast_id != id);
        self.print(&visible);
    }
}

#[tokio::main]
async fn main() {
    // Set up file logging
    let log_file = File::create("notifications.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let bus = CommandBus::new();

    // A real renderer would build a widget with a close button wired to the
    // dismiss handle. Here the handles land in a map so main can play the
    // user clicking close.
    let dismissers: Arc<Mutex<HashMap<String, Dismiss>>> = Arc::new(Mutex::new(HashMap::new()));
    let renderer = {
        let dismissers = Arc::clone(&dismissers);
        move |data: Payload, dismiss: Dismiss| {
            let text = payload_as::<String>(&data).cloned().unwrap_or_default();
            dismissers
                .lock()
                .unwrap()
                .insert(dismiss.id().to_owned(), dismiss);
            payload(format!("({text})"))
        }
    };

    let scrim = Scrim::new()
        .upper_layer("status-bar", Some(payload(String::from("ready"))))
        .toast_renderer(renderer)
        .attach(&bus);

    let _page = scrim.mount_toast_layer("page", Arc::new(TerminalLayer::new("page")));

    // Broadcast: lands on the page layer right away.
    remote::show_toast(&bus, "saved", payload(String::from("draft saved")), None);

    // Scoped to a layer that is not mounted yet; nothing shows.
    remote::show_toast(
        &bus,
        "hint",
        payload(String::from("press ? for help")),
        Some(vec![String::from("settings")]),
    );

    // Mounting and activating the settings layer catches it up on both the
    // broadcast toast and its scoped one, in show order.
    let settings = scrim.mount_toast_layer("settings", Arc::new(TerminalLayer::new("settings")));
    scrim.toaster().activate("settings").expect("layer is mounted");

    // The user clicks close on the saved toast; it disappears everywhere.
    let dismiss = dismissers.lock().unwrap().get("saved").cloned();
    if let Some(dismiss) = dismiss {
        dismiss.dismiss();
    }

    // Unmounting the settings layer stops delivery to it.
    settings.unmount();
    remote::hide_toast(&bus, "hint");

    // The status bar is an upper layer; remote updates reach every
    // subscriber, and reset drops the value back to none.
    let status = scrim
        .overlay_handle(Some("status-bar"), None)
        .expect("declared at build time");
    let (current, _watch) = status
        .watch(|data| {
            let text = data.as_ref().and_then(payload_as::<String>).cloned();
            println!("[status-bar] {text:?}");
        })
        .expect("declared at build time");
    println!(
        "[status-bar] starts as {:?}",
        current.as_ref().and_then(payload_as::<String>)
    );

    remote::update_upper_layer(&bus, "status-bar", payload(String::from("3 unread")));
    remote::reset_upper_layer(&bus, "status-bar");
}
