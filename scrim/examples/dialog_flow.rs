//! Dialog Flow Example
//!
//! Walks one confirm dialog through its whole lifecycle:
//! - Declared id with default data and a mounted surface
//! - Async open handler that vetoes opens with nothing to confirm
//! - Page scroll lock held while the blocking dialog is up
//! - Remote control over the command bus
//! - Wake channel collapsing mutations into repaint requests

use std::fs::File;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scrim::prelude::*;
use scrim::wake;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Stand-in for a host modal; prints instead of rendering.
struct PrintSurface {
    label: &'static str,
}

impl DialogSurface for PrintSurface {
    fn show_modal(&self) {
        println!("[surface] '{}' up", self.label);
    }

    fn close_modal(&self) {
        println!("[surface] '{}' down", self.label);
    }
}

/// Stand-in for a page scroll lock.
#[derive(Default)]
struct PageLock {
    engaged: AtomicBool,
}

impl OverflowLock for PageLock {
    fn engage(&self) {
        if !self.engaged.swap(true, Ordering::SeqCst) {
            println!("[page] scrolling locked");
        }
    }

    fn release(&self) {
        if self.engaged.swap(false, Ordering::SeqCst) {
            println!("[page] scrolling unlocked");
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up file logging
    let log_file = File::create("dialog_flow.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let bus = CommandBus::new();
    let scrim = Scrim::new()
        .dialog("confirm-quit", Some(payload(String::from("unsaved changes"))))
        .overflow_lock(Arc::new(PageLock::default()))
        .attach(&bus);

    // Hosts that render on demand hang a repaint off the wake channel.
    let (wake_tx, mut wakes) = wake::channel();
    scrim.install_wake(wake_tx);
    tokio::spawn(async move {
        while wakes.recv().await.is_some() {
            wakes.drain();
            println!("[frame] repaint scheduled");
        }
    });

    let scope = scrim.mount_dialog(
        "confirm-quit",
        Arc::new(PrintSurface {
            label: "confirm-quit",
        }),
        DialogConfig::new()
            .block_overflow(true)
            .on_open(|data| async move {
                match data.as_ref().and_then(payload_as::<String>) {
                    Some(prompt) => {
                        println!("[dialog] asking about '{prompt}'");
                        OpenOutcome::Open
                    }
                    None => {
                        println!("[dialog] nothing to confirm, vetoing");
                        OpenOutcome::Cancel
                    }
                }
            })
            .on_close(|data| {
                let confirmed = data.as_ref().and_then(payload_as::<bool>).copied();
                println!("[dialog] result: {confirmed:?}");
            }),
    );

    let handle = scrim
        .dialog_handle(None, Some(&scope))
        .expect("scope carries an id");
    let (state, subscription) = handle
        .watch(|state| println!("[state] opened={}", state.opened))
        .expect("dialog is declared");
    println!("[state] starts opened={}", state.opened);

    handle
        .open(Some(payload(String::from("unsaved changes"))))
        .await
        .expect("surface is mounted");

    // Anything holding the bus can drive the dialog without a registry
    // reference; the user confirmed, so the close carries `true`.
    remote::close_dialog(&bus, scope.id(), Some(payload(true)));

    // An open without data is vetoed by the handler above. Open commands run
    // on a spawned task, so give it a beat to land.
    remote::open_dialog(&bus, scope.id(), None);
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "[main] open after veto: {}",
        handle.is_open().expect("dialog is declared")
    );

    handle.unsubscribe(&subscription).expect("dialog is declared");
}
