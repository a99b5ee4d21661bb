//! # Managed service abstractions.
//!
//! This module provides the unit-of-work contract and its helpers:
//! - [`Service`] - trait for independently startable/stoppable units
//! - [`StartHook`], [`StopHook`], [`Reloadable`] - optional capabilities
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)
//! - [`ServiceFn`] - closure-backed service implementation

mod service;
mod service_fn;

pub use service::{Reloadable, Service, ServiceRef, StartHook, StopHook};
pub use service_fn::ServiceFn;
