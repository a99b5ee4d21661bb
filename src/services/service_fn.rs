//! # Closure-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] wraps a closure `F: Fn(CancellationToken) -> Fut` together
//! with a cancellation token that `stop` trips. The closure produces a fresh
//! future per start attempt, owning its own state; shared state goes through
//! an explicit `Arc` inside the closure.
//!
//! The wrapped future must watch its token to honor `stop`: cancelling the
//! token is the only signal a pending `start` receives.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::services::service::Service;

/// Closure-backed service implementation.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use servitor::{Service, ServiceError, ServiceFn, ServiceRef};
///
/// let svc: ServiceRef = ServiceFn::arc("worker", |shutdown: CancellationToken| async move {
///     shutdown.cancelled().await;
///     Ok::<_, ServiceError>(())
/// });
/// assert_eq!(svc.name(), "worker");
/// ```
pub struct ServiceFn<F> {
    name: Cow<'static, str>,
    f: F,
    token: CancellationToken,
}

impl<F> ServiceFn<F> {
    /// Creates a new closure-backed service.
    ///
    /// Prefer [`ServiceFn::arc`] when you immediately need a
    /// [`ServiceRef`](crate::ServiceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            token: CancellationToken::new(),
        }
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        (self.f)(self.token.child_token()).await
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.token.cancel();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_unblocks_a_pending_start() {
        let svc = ServiceFn::arc("blocker", |shutdown: CancellationToken| async move {
            shutdown.cancelled().await;
            Ok::<_, ServiceError>(())
        });

        let running = tokio::spawn({
            let svc = svc.clone();
            async move { svc.start().await }
        });

        // Let the start attempt reach its await point first.
        tokio::task::yield_now().await;
        svc.stop().await.unwrap();

        assert!(running.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_start_propagates_the_closure_error() {
        let svc = ServiceFn::arc("broken", |_shutdown: CancellationToken| async move {
            Err(ServiceError::failed("bind: address already in use"))
        });

        let err = svc.start().await.unwrap_err();
        assert_eq!(err.to_string(), "bind: address already in use");
    }
}
