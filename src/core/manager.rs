//! # ServiceManager: concurrent startup, bounded shutdown, reload fan-out.
//!
//! The [`ServiceManager`] owns the ordered registry of services. Order is
//! meaningful: registration order is start-invocation order (start itself is
//! concurrent), and stop order is the strict reverse of registration order.
//! The registry is mutated only during single-threaded setup; once `start`
//! runs, it is read-only.
//!
//! ## Phases
//! ```text
//! start():  spawn one task per service
//!             on_start? ── err ─► report, never call start
//!             start()   ── err ─► log + report
//!             ok        ─────────► on_stop?
//!           return on FIRST error or when all tasks complete
//!           (fail-fast; surviving tasks are NOT cancelled)
//!
//! stop():   reverse order, concurrent, each raced against STOP_TIMEOUT
//!           every failure/timeout ─► MultiError ─► single aggregate
//!
//! reload(): Config::reload() first (abort on error),
//!           then every Reloadable service, best-effort ─► aggregate
//! ```
//!
//! Fail-fast startup deliberately leaves the other unit tasks running; the
//! caller (typically [`Runtime`](crate::Runtime)) is expected to invoke
//! [`ServiceManager::stop`] after observing the failure.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::context::Context;
use crate::error::{MultiError, RuntimeError, ServiceError};
use crate::services::ServiceRef;

/// Fixed per-service stop timeout.
///
/// A service whose `stop` exceeds this bound yields a
/// [`RuntimeError::StopTimeout`] instead of hanging the whole shutdown. The
/// late stop attempt is abandoned, not cancelled.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the ordered service registry and drives its lifecycle.
pub struct ServiceManager {
    ctx: Arc<Context>,
    services: RwLock<Vec<ServiceRef>>,
}

impl ServiceManager {
    /// Creates a manager with an empty registry.
    pub fn new(ctx: Arc<Context>) -> Self {
        Self {
            ctx,
            services: RwLock::new(Vec::new()),
        }
    }

    /// Appends a service to the registry.
    ///
    /// Must complete before [`start`](Self::start) is invoked; racing it
    /// against `start` or `stop` is undefined.
    pub fn add_service(&self, service: ServiceRef) {
        self.services.write().unwrap().push(service);
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.services.read().unwrap().len()
    }

    /// Returns `true` if no service has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<ServiceRef> {
        self.services.read().unwrap().clone()
    }

    /// Starts every registered service concurrently and blocks until either
    /// all of them have terminated or the first error is reported.
    ///
    /// Per service: the start hook runs first when present, and an error
    /// there means `start` is never called; otherwise `start` runs to
    /// termination, followed by the stop hook on a clean return.
    ///
    /// The first reported error wins a nondeterministic race and is returned
    /// without waiting for, or cancelling, the remaining unit tasks.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let services = self.snapshot();
        if services.is_empty() {
            return Err(RuntimeError::NoServices);
        }

        // A failing task blocks on this capacity-1 channel until its error
        // is taken or the receiver is gone, so a failure can never lose the
        // race against the all-complete branch.
        let (fail_tx, mut fail_rx) = mpsc::channel::<RuntimeError>(1);
        let mut running = JoinSet::new();

        for service in services {
            let ctx = Arc::clone(&self.ctx);
            let fail = fail_tx.clone();
            running.spawn(async move {
                let name = service.name().to_string();
                tracing::debug!(target: "servitor", service = %name, "starting service");

                if let Some(hook) = service.as_start_hook() {
                    if let Err(err) = hook.on_start(&ctx).await {
                        let _ = fail
                            .send(RuntimeError::StartHook {
                                service: name,
                                source: err,
                            })
                            .await;
                        return;
                    }
                }

                match service.start().await {
                    Ok(()) => {
                        if let Some(hook) = service.as_stop_hook() {
                            hook.on_stop(&ctx).await;
                        }
                    }
                    Err(err) => {
                        ctx.print(format!("error while running {name}: {err}"));
                        let _ = fail
                            .send(RuntimeError::Service {
                                service: name,
                                source: err,
                            })
                            .await;
                    }
                }
            });
        }
        drop(fail_tx);

        let first_error = {
            let drained = async {
                while running.join_next().await.is_some() {}
            };
            tokio::select! {
                _ = drained => None,
                err = fail_rx.recv() => err,
            }
        };

        match first_error {
            Some(err) => {
                // Surviving unit tasks keep running on their own; the
                // caller is expected to stop() them.
                running.detach_all();
                Err(err)
            }
            None => {
                // All tasks are finished; join whatever is left and check
                // for an error that was reported right at the end.
                while running.join_next().await.is_some() {}
                match fail_rx.try_recv() {
                    Ok(err) => Err(err),
                    Err(_) => Ok(()),
                }
            }
        }
    }

    /// Stops every registered service in reverse registration order.
    ///
    /// Stop attempts run concurrently, each under an independent
    /// [`STOP_TIMEOUT`]. Every error, timeouts included, lands in one
    /// [`MultiError`]; the call blocks until all attempts have completed or
    /// timed out and then returns the aggregate.
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        let services = self.snapshot();
        let faults = MultiError::new();

        let mut attempts = Vec::with_capacity(services.len());
        for service in services.into_iter().rev() {
            let name = service.name().to_string();
            tracing::debug!(target: "servitor", service = %name, "stopping service");
            attempts.push((name, tokio::spawn(Self::bounded_stop(service))));
        }

        for (name, attempt) in attempts {
            match attempt.await {
                Ok(result) => faults.record(result),
                Err(join_err) => faults.add(RuntimeError::Service {
                    service: name,
                    source: ServiceError::failed(format!("stop attempt panicked: {join_err}")),
                }),
            }
        }

        faults.into_result()
    }

    /// Races one service's `stop` against [`STOP_TIMEOUT`].
    ///
    /// On timeout the join handle is dropped, which abandons the attempt
    /// without cancelling it; its eventual result is unobservable.
    async fn bounded_stop(service: ServiceRef) -> Result<(), RuntimeError> {
        let name = service.name().to_string();
        let attempt = tokio::spawn(async move { service.stop().await });

        match tokio::time::timeout(STOP_TIMEOUT, attempt).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(err))) => Err(RuntimeError::Service {
                service: name,
                source: err,
            }),
            Ok(Err(join_err)) => Err(RuntimeError::Service {
                service: name,
                source: ServiceError::failed(format!("stop panicked: {join_err}")),
            }),
            Err(_) => Err(RuntimeError::StopTimeout { service: name }),
        }
    }

    /// Reloads shared configuration, then fans the reload out to every
    /// [`Reloadable`](crate::Reloadable) service.
    ///
    /// A configuration reload failure aborts immediately. Service reloads
    /// are best-effort: every reloadable service is attempted regardless of
    /// earlier failures, and all errors are returned as one aggregate.
    pub async fn reload(&self) -> Result<(), RuntimeError> {
        if let Err(err) = self.ctx.config().reload() {
            return Err(RuntimeError::ConfigReload { source: err });
        }

        let failed = MultiError::new();
        for service in self.snapshot() {
            if let Some(reloadable) = service.as_reloadable() {
                tracing::debug!(target: "servitor", service = %service.name(), "reloading service");
                failed.record(reloadable.reload().await.map_err(|err| {
                    RuntimeError::Reload {
                        service: service.name().to_string(),
                        source: err,
                    }
                }));
            }
        }
        failed.into_result()
    }
}
