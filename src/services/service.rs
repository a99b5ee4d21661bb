//! # Service contract and optional capability hooks.
//!
//! A [`Service`] is a managed resource with a blocking `start` and a `stop`,
//! typically something exclusive such as a network listener, a database
//! file, or a shared memory segment. The manager owns registered services
//! for their whole start/stop lifetime through [`ServiceRef`] handles.
//!
//! Capabilities beyond the base contract are optional and queried at
//! runtime, never assumed:
//!
//! - [`StartHook`] — last-moment initialization before `start`;
//! - [`StopHook`] — completion logging/cleanup after a clean `start` return;
//! - [`Reloadable`] — reaction to configuration reload requests.
//!
//! A service advertises a capability by overriding the matching `as_*`
//! query to return `Some(self)`. Absence is a no-op, not a failure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ServiceError;

/// Shared handle to a managed service. Identity is reference identity.
pub type ServiceRef = Arc<dyn Service>;

/// A resource whose lifecycle is managed by the runtime.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use servitor::{Service, ServiceError};
///
/// struct Listener {
///     shutdown: CancellationToken,
/// }
///
/// #[async_trait]
/// impl Service for Listener {
///     fn name(&self) -> &str {
///         "listener"
///     }
///
///     async fn start(&self) -> Result<(), ServiceError> {
///         // accept loop would live here
///         self.shutdown.cancelled().await;
///         Ok(())
///     }
///
///     async fn stop(&self) -> Result<(), ServiceError> {
///         self.shutdown.cancel();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns a stable, human-readable service name, used in logs and
    /// timeout errors.
    fn name(&self) -> &str;

    /// Runs the main loop of the service.
    ///
    /// Blocks until [`stop`](Service::stop) is called or execution completes
    /// on its own. Returns an error on abnormal termination. Errors that
    /// occur during shutdown shall be returned by `stop` instead.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Requests termination of a running service.
    ///
    /// Must unblock a pending [`start`](Service::start) and may be called
    /// concurrently with it. Returns any error encountered while tearing
    /// down owned resources.
    async fn stop(&self) -> Result<(), ServiceError>;

    /// Capability query: start-hook support. Default: not supported.
    fn as_start_hook(&self) -> Option<&dyn StartHook> {
        None
    }

    /// Capability query: stop-hook support. Default: not supported.
    fn as_stop_hook(&self) -> Option<&dyn StopHook> {
        None
    }

    /// Capability query: reload support. Default: not supported.
    fn as_reloadable(&self) -> Option<&dyn Reloadable> {
        None
    }
}

/// Last-moment initialization that needs the shared [`Context`].
///
/// Invoked once, before [`Service::start`]. A failure here prevents `start`
/// from ever being called for that service.
#[async_trait]
pub trait StartHook: Send + Sync {
    /// Prepares the service; an error aborts its startup.
    async fn on_start(&self, ctx: &Context) -> Result<(), ServiceError>;
}

/// Completion logging/cleanup after a clean termination.
///
/// Invoked once, immediately after [`Service::start`] returns without error,
/// whether the termination was self-initiated or requested through `stop`.
/// Not invoked when `start` errored.
#[async_trait]
pub trait StopHook: Send + Sync {
    /// Observes the clean termination of the service.
    async fn on_stop(&self, ctx: &Context);
}

/// Reaction to a configuration reload request.
#[async_trait]
pub trait Reloadable: Send + Sync {
    /// Re-applies configuration. Errors are aggregated by the reload phase;
    /// they do not stop other services from reloading.
    async fn reload(&self) -> Result<(), ServiceError>;
}
