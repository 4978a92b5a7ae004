//! Ctrl-C handling.
//!
//! The pipeline itself is blocking and spends most of its time waiting on
//! the operator, so the signal is awaited on a small runtime of its own.

use crate::console::{Console, Level, TerminalConsole};
use std::io;
use std::thread;

/// Exit status reported after an interrupt (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub const INTERRUPTED_MESSAGE: &str = "Operation interrupted by the user";

/// Tell the operator the run was interrupted; returns the exit status
pub fn report_interrupt(console: &mut dyn Console) -> i32 {
    tracing::info!("interrupt received");
    console.report("", Level::Info);
    console.report(INTERRUPTED_MESSAGE, Level::Warning);
    INTERRUPTED_EXIT_CODE
}

/// Spawn the watcher thread. On Ctrl-C the process reports and exits.
pub fn install() {
    let spawned = thread::Builder::new()
        .name("interrupt".into())
        .spawn(|| {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!("Failed to start the interrupt runtime: {}", e);
                    return;
                }
            };

            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        // stdin stays locked by the main console; this one only writes
                        let mut console = TerminalConsole::new(io::empty(), io::stdout());
                        std::process::exit(report_interrupt(&mut console));
                    }
                    Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
                }
            });
        });

    if let Err(e) = spawned {
        tracing::warn!("Failed to spawn the interrupt watcher: {}", e);
    }
}
