//! # Process signal handling.
//!
//! Maps OS signals onto runtime operations:
//!
//! **Unix platforms:**
//! - `SIGINT` / `SIGTERM` / Ctrl-C → [`Runtime::stop`], then the loop ends
//! - `SIGHUP` → [`Runtime::reload`]; a reload failure escalates to
//!   [`Runtime::stop`] and ends the loop
//!
//! **Non-Unix platforms:**
//! - Ctrl-C → [`Runtime::stop`]
//!
//! The loop is spawned by [`Runtime::run`] and aborted when `run` returns,
//! which deregisters signal handling for the process.

use std::sync::Arc;

use crate::core::runtime::Runtime;

/// Drives the signal loop until a terminate signal arrives or a reload
/// fails. Each call installs independent signal listeners.
#[cfg(unix)]
pub(crate) async fn signal_loop(runtime: Arc<Runtime>) {
    use tokio::signal::unix::{signal, SignalKind};

    let listeners = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    );
    let (mut sigint, mut sigterm, mut sighup) = match listeners {
        (Ok(int), Ok(term), Ok(hup)) => (int, term, hup),
        _ => {
            runtime.context().print("failed to install signal handlers");
            return;
        }
    };

    loop {
        let terminated = async {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigint.recv() => {},
                _ = sigterm.recv() => {},
            }
        };

        tokio::select! {
            _ = terminated => {
                // stop() logs its own failures.
                let _ = runtime.stop().await;
                break;
            }
            _ = sighup.recv() => {
                if let Err(err) = runtime.reload().await {
                    runtime
                        .context()
                        .print(format!("reload failed, shutting down: {err}"));
                    let _ = runtime.stop().await;
                    break;
                }
            }
        }
    }
}

/// Drives the signal loop until Ctrl-C arrives.
#[cfg(not(unix))]
pub(crate) async fn signal_loop(runtime: Arc<Runtime>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        let _ = runtime.stop().await;
    }
}
