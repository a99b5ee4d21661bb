//! # servitor
//!
//! **Servitor** is a lightweight service lifecycle runtime for Rust.
//!
//! It manages the units of work a long-running server process hosts —
//! network listeners, database handles, background loops — answering the
//! questions every such process faces: in what order do units start and
//! stop, how do startup failures propagate without deadlocking the others,
//! how is shutdown bounded in time, and how are configuration-reload
//! requests fanned out and their failures aggregated.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │   Service    │   │   Service    │
//!     │ (listener 1) │   │ (listener 2) │   │  (worker)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  ServiceManager (ordered registry)                       │
//! │  - start: concurrent, fail-fast on the first error       │
//! │  - stop:  reverse order, bounded by STOP_TIMEOUT         │
//! │  - reload: best-effort fan-out, errors aggregated        │
//! └──────────────────────────┬───────────────────────────────┘
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Runtime                                                 │
//! │  - setup callbacks bracketing the whole lifecycle        │
//! │    (start in order, unwind in reverse on the way out)    │
//! │  - signal loop: SIGINT/SIGTERM → stop, SIGHUP → reload   │
//! └──────────────────────────┬───────────────────────────────┘
//!                            ▼
//!               Context (config + log sink + metadata)
//! ```
//!
//! ## Lifecycle
//! ```text
//! Runtime::run(bootstrap)
//!   ├─► spawn signal loop            (terminate → stop, reload → reload)
//!   └─► bootstrap(runtime)
//!         ├─► register callbacks and services
//!         └─► Runtime::start()
//!               ├─► callbacks in order (push each success on a stack)
//!               ├─► ServiceManager::start()
//!               │     per service, concurrently:
//!               │       on_start? ─ err ─► fail-fast, start never called
//!               │       start()   ─ err ─► fail-fast (siblings keep running)
//!               │       ok ──────────────► on_stop?
//!               └─► unwind callback stack, reverse order
//! ```
//!
//! ## Semantics worth knowing
//! - A fail-fast start error does **not** cancel sibling unit tasks; the
//!   caller is expected to invoke `stop()` to halt everything.
//! - A `stop()` that exceeds [`STOP_TIMEOUT`] degrades to a reported
//!   timeout error; the late attempt is abandoned, not cancelled.
//! - Stop and reload are exhaustive: every unit is attempted and all
//!   failures are merged into one [`MultiError`] aggregate.
//!
//! ## Example
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use servitor::{Context, Runtime, ServiceError, ServiceFn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), servitor::RuntimeError> {
//!     let runtime = Runtime::new(Context::with_defaults("demo", "1.0"));
//!     runtime
//!         .run(|rt| async move {
//!             rt.on_start(|ctx| {
//!                 ctx.print(format!("{} starting", ctx.name()));
//!                 Ok(())
//!             });
//!
//!             rt.add_service(ServiceFn::arc(
//!                 "worker",
//!                 |shutdown: CancellationToken| async move {
//!                     shutdown.cancelled().await;
//!                     Ok::<_, ServiceError>(())
//!                 },
//!             ));
//!
//!             rt.start().await
//!         })
//!         .await
//! }
//! ```

mod context;
mod core;
mod error;
mod services;

// ---- Public re-exports ----

pub use context::{Config, Context, LogSink, MemoryConfig, TracingSink};
pub use core::{Runtime, ServiceManager, STOP_TIMEOUT};
pub use error::{MultiError, RuntimeError, ServiceError};
pub use services::{Reloadable, Service, ServiceFn, ServiceRef, StartHook, StopHook};
