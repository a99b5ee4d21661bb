//! Runtime core: orchestration and lifecycle.
//!
//! This module contains the lifecycle machinery of the servitor runtime.
//! The public API is [`ServiceManager`] (ordered registry, concurrent
//! startup, bounded shutdown, reload fan-out) and [`Runtime`] (boot-time
//! callbacks plus the signal-driven control loop).
//!
//! Internal modules:
//! - [`manager`]: drives the registered services through start/stop/reload;
//! - [`runtime`]: wraps the manager with setup callbacks and `run`;
//! - [`signals`]: cross-platform signal handling for stop/reload requests.

mod manager;
mod runtime;
mod signals;

pub use manager::{ServiceManager, STOP_TIMEOUT};
pub use runtime::Runtime;
