//! # Runtime: process-wide setup callbacks around the service lifecycle.
//!
//! The [`Runtime`] wraps a [`ServiceManager`] with a second, independent
//! ordered list of boot-time callbacks for cross-cutting features that must
//! bracket the entire service lifecycle rather than an individual unit —
//! enabling CPU/heap profiling before anything starts and writing results
//! after everything stops is the canonical use.
//!
//! ## Start sequence
//! ```text
//! start():
//!   c1.start ─ ok ─► push c1          success stack: [c1]
//!   c2.start ─ ok ─► push c2          success stack: [c1, c2]
//!   c3.start ─ ERR ─► pop c2.stop, pop c1.stop ─► return c3's error
//!                     (ServiceManager never invoked)
//!
//!   all ok ─► ServiceManager::start() ─► ...blocks...
//!          ─► pop c3.stop, pop c2.stop, pop c1.stop ─► return
//! ```
//!
//! Teardown always walks the success stack most-recently-started first, so
//! callbacks that never started are never stopped.
//!
//! [`Runtime::run`] adds the signal-driven control loop: terminate signals
//! map to [`Runtime::stop`] and reload signals to [`Runtime::reload`],
//! concurrently with the caller-supplied bootstrap closure. Panics raised by
//! the bootstrap closure are not caught here; the process boundary that
//! converts them into logged errors lives outside this core.

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::context::Context;
use crate::core::manager::ServiceManager;
use crate::core::signals;
use crate::error::RuntimeError;
use crate::services::ServiceRef;

type StartFn = Box<dyn Fn(&Context) -> Result<(), RuntimeError> + Send + Sync>;
type StopFn = Box<dyn Fn(&Context) + Send + Sync>;

struct Callback {
    start: StartFn,
    stop: StopFn,
}

/// Application runtime: setup callbacks, managed services, signal handling.
///
/// All methods take `&self`; the runtime is designed to be shared behind an
/// `Arc` between the bootstrap closure and the signal loop. Registration
/// (callbacks and services) belongs to the single-threaded setup phase
/// before [`start`](Runtime::start) is first called.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use servitor::{Context, Runtime, ServiceError, ServiceFn};
///
/// #[tokio::main]
/// async fn main() -> Result<(), servitor::RuntimeError> {
///     let runtime = Runtime::new(Context::with_defaults("demo", "1.0"));
///     runtime.run(|rt| async move {
///         rt.add_service(ServiceFn::arc("worker", |shutdown: CancellationToken| async move {
///             shutdown.cancelled().await;
///             Ok::<_, ServiceError>(())
///         }));
///         rt.start().await
///     })
///     .await
/// }
/// ```
pub struct Runtime {
    ctx: Arc<Context>,
    manager: ServiceManager,
    callbacks: Mutex<Vec<Arc<Callback>>>,
}

impl Runtime {
    /// Creates a runtime around the given context.
    pub fn new(ctx: Context) -> Self {
        let ctx = Arc::new(ctx);
        Self {
            manager: ServiceManager::new(Arc::clone(&ctx)),
            ctx,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Returns the application context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Registers a (start, stop) callback pair.
    ///
    /// Start halves run in registration order before any service starts;
    /// stop halves run in reverse order of successful starts after every
    /// service has stopped.
    pub fn callback(
        &self,
        start: impl Fn(&Context) -> Result<(), RuntimeError> + Send + Sync + 'static,
        stop: impl Fn(&Context) + Send + Sync + 'static,
    ) {
        self.callbacks.lock().unwrap().push(Arc::new(Callback {
            start: Box::new(start),
            stop: Box::new(stop),
        }));
    }

    /// Registers a start-only callback with a no-op stop half.
    pub fn on_start(
        &self,
        start: impl Fn(&Context) -> Result<(), RuntimeError> + Send + Sync + 'static,
    ) {
        self.callback(start, |_ctx| {});
    }

    /// Registers a stop-only callback with a no-op start half.
    pub fn on_stop(&self, stop: impl Fn(&Context) + Send + Sync + 'static) {
        self.callback(|_ctx| Ok(()), stop);
    }

    /// Registers a service with the underlying [`ServiceManager`].
    pub fn add_service(&self, service: ServiceRef) {
        self.manager.add_service(service);
    }

    /// Runs setup callbacks in order, then delegates to
    /// [`ServiceManager::start`].
    ///
    /// A callback failure unwinds the callbacks that already started, in
    /// reverse order, and returns that error without ever invoking the
    /// manager. Otherwise the manager's result is returned after the full
    /// unwind — including when the manager was unblocked by an external
    /// [`stop`](Runtime::stop).
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let callbacks = self.callbacks.lock().unwrap().clone();

        let mut started: Vec<Arc<Callback>> = Vec::new();
        for callback in callbacks {
            match (callback.start)(&self.ctx) {
                Ok(()) => started.push(callback),
                Err(err) => {
                    self.unwind(&mut started);
                    return Err(err);
                }
            }
        }

        let result = self.manager.start().await;
        self.unwind(&mut started);
        result
    }

    /// Pops the success stack, stopping callbacks most-recently-started
    /// first.
    fn unwind(&self, started: &mut Vec<Arc<Callback>>) {
        while let Some(callback) = started.pop() {
            (callback.stop)(&self.ctx);
        }
    }

    /// Stops every service via [`ServiceManager::stop`], logging (not
    /// swallowing) any aggregate error.
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        let result = self.manager.stop().await;
        if let Err(err) = &result {
            self.ctx.print(format!("error while stopping services: {err}"));
        }
        result
    }

    /// Fans a configuration reload out via [`ServiceManager::reload`].
    pub async fn reload(&self) -> Result<(), RuntimeError> {
        self.manager.reload().await
    }

    /// Installs signal handling and invokes the single-shot bootstrap
    /// closure, whose job is to register callbacks/services and eventually
    /// call [`start`](Runtime::start).
    ///
    /// Signal handling runs concurrently with the bootstrap for the rest of
    /// the call and is deregistered on the way out. Returns the bootstrap's
    /// error after logging it.
    pub async fn run<F, Fut>(self, bootstrap: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Arc<Runtime>) -> Fut,
        Fut: Future<Output = Result<(), RuntimeError>>,
    {
        let runtime = Arc::new(self);
        let signal_task = tokio::spawn(signals::signal_loop(Arc::clone(&runtime)));

        let result = bootstrap(Arc::clone(&runtime)).await;
        if let Err(err) = &result {
            runtime.ctx.print(format!("{err}"));
        }

        signal_task.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::{Service, ServiceFn};

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    type Trace = Arc<Mutex<Vec<&'static str>>>;

    fn traced(trace: &Trace, label: &'static str) -> impl Fn(&Context) + Send + Sync + 'static {
        let trace = Arc::clone(trace);
        move |_ctx| trace.lock().unwrap().push(label)
    }

    struct QuickService;

    #[async_trait]
    impl Service for QuickService {
        fn name(&self) -> &str {
            "quick"
        }

        async fn start(&self) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn stop(&self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_callbacks_bracket_the_service_lifecycle_in_order() {
        let runtime = Runtime::new(Context::with_defaults("test", "0"));
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));

        for label in ["c1", "c2", "c3"] {
            let on_start = {
                let trace = Arc::clone(&trace);
                move |_ctx: &Context| {
                    trace.lock().unwrap().push(label);
                    Ok(())
                }
            };
            let stop_label: &'static str = match label {
                "c1" => "c1.stop",
                "c2" => "c2.stop",
                _ => "c3.stop",
            };
            runtime.callback(on_start, traced(&trace, stop_label));
        }
        runtime.add_service(Arc::new(QuickService));

        assert!(runtime.start().await.is_ok());
        assert_eq!(
            trace.lock().unwrap().as_slice(),
            ["c1", "c2", "c3", "c3.stop", "c2.stop", "c1.stop"]
        );
    }

    #[tokio::test]
    async fn test_callback_failure_unwinds_only_the_started_prefix() {
        let runtime = Runtime::new(Context::with_defaults("test", "0"));
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let service_starts = Arc::new(AtomicUsize::new(0));

        runtime.callback(|_ctx| Ok(()), traced(&trace, "c1.stop"));
        runtime.callback(
            |_ctx| Err(RuntimeError::callback("profile file unwritable")),
            traced(&trace, "c2.stop"),
        );
        runtime.callback(|_ctx| Ok(()), traced(&trace, "c3.stop"));

        let starts = Arc::clone(&service_starts);
        runtime.add_service(ServiceFn::arc("svc", move |_shutdown| {
            let starts = Arc::clone(&starts);
            async move {
                starts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ServiceError>(())
            }
        }));

        let err = runtime.start().await.unwrap_err();
        assert_eq!(err.to_string(), "profile file unwritable");

        // c1 unwinds exactly once, c3 never ran, the manager was never invoked.
        assert_eq!(trace.lock().unwrap().as_slice(), ["c1.stop"]);
        assert_eq!(service_starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_external_stop_unblocks_start_and_unwinds_callbacks() {
        let runtime = Arc::new(Runtime::new(Context::with_defaults("test", "0")));
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        runtime.callback(|_ctx| Ok(()), traced(&trace, "teardown"));

        runtime.add_service(ServiceFn::arc(
            "blocker",
            |shutdown: CancellationToken| async move {
                shutdown.cancelled().await;
                Ok::<_, ServiceError>(())
            },
        ));

        let stopper = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                runtime.stop().await
            })
        };

        assert!(runtime.start().await.is_ok());
        assert_eq!(trace.lock().unwrap().as_slice(), ["teardown"]);
        assert!(stopper.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_returns_the_bootstrap_error() {
        let runtime = Runtime::new(Context::with_defaults("test", "0"));
        let err = runtime
            .run(|_rt| async move { Err(RuntimeError::callback("nothing to serve")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "nothing to serve");
    }

    #[tokio::test]
    async fn test_run_drives_a_full_lifecycle() {
        let runtime = Runtime::new(Context::with_defaults("test", "0"));
        let result = runtime
            .run(|rt| async move {
                rt.add_service(ServiceFn::arc(
                    "worker",
                    |shutdown: CancellationToken| async move {
                        shutdown.cancelled().await;
                        Ok::<_, ServiceError>(())
                    },
                ));

                let stopper = {
                    let rt = Arc::clone(&rt);
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        rt.stop().await
                    })
                };

                let started = rt.start().await;
                stopper.await.expect("stopper panicked")?;
                started
            })
            .await;
        assert!(result.is_ok());
    }
}
