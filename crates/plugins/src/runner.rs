use std::sync::{Arc, Mutex};

use {
    async_trait::async_trait,
    chrono::Utc,
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use botplugs_common::CmdResult;

use crate::{plugin::PeriodicCommand, registry::PluginRegistry};

/// Where outbound messages end up (a chat adapter, stdout, a test buffer).
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn send(&self, result: CmdResult) -> anyhow::Result<()>;
}

/// Drives every registered periodic command on its own task.
pub struct PeriodicRunner {
    registry: Arc<PluginRegistry>,
    sink: Arc<dyn OutboundSink>,
    cancel: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PeriodicRunner {
    pub fn new(registry: Arc<PluginRegistry>, sink: Arc<dyn OutboundSink>) -> Self {
        Self {
            registry,
            sink,
            cancel: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn one timer task per periodic command. Returns how many were started.
    pub fn start(&self) -> usize {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        for periodic in self.registry.periodic() {
            let periodic = Arc::clone(periodic);
            let registry = Arc::clone(&self.registry);
            let sink = Arc::clone(&self.sink);
            let cancel = self.cancel.clone();
            handles.push(tokio::spawn(async move {
                timer_loop(periodic, registry, sink, cancel).await;
            }));
        }
        info!(count = handles.len(), "periodic runner started");
        handles.len()
    }

    pub async fn stop(&self) {
        self.cancel.cancel();
        let handles: Vec<_> = {
            let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            handles.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "periodic task ended abnormally");
            }
        }
        info!("periodic runner stopped");
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

async fn timer_loop(
    periodic: Arc<dyn PeriodicCommand>,
    registry: Arc<PluginRegistry>,
    sink: Arc<dyn OutboundSink>,
    cancel: CancellationToken,
) {
    let name = periodic.name().to_string();
    loop {
        let Some(delay) = periodic.schedule().delay_from(Utc::now()) else {
            warn!(periodic = %name, "schedule has no upcoming fire time, stopping");
            return;
        };

        tokio::select! {
            () = tokio::time::sleep(delay) => {},
            () = cancel.cancelled() => {
                debug!(periodic = %name, "periodic task cancelled");
                return;
            },
        }

        let results = match periodic.run().await {
            Ok(results) => results,
            Err(e) => {
                warn!(periodic = %name, error = %e, "periodic command failed");
                continue;
            },
        };

        for result in registry.filter_results(results, None).await {
            if let Err(e) = sink.send(result).await {
                warn!(periodic = %name, error = %e, "failed to deliver periodic message");
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::schedule::PeriodicSchedule;

    #[derive(Default)]
    struct Collect(Mutex<Vec<CmdResult>>);

    #[async_trait]
    impl OutboundSink for Collect {
        async fn send(&self, result: CmdResult) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(result);
            Ok(())
        }
    }

    struct Counter {
        schedule: PeriodicSchedule,
        runs: AtomicUsize,
    }

    #[async_trait]
    impl PeriodicCommand for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn schedule(&self) -> &PeriodicSchedule {
            &self.schedule
        }

        async fn run(&self) -> anyhow::Result<Vec<CmdResult>> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                anyhow::bail!("transient failure");
            }
            Ok(vec![CmdResult::new("#ops", format!("run {n}"))])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_on_schedule_until_stopped() {
        let mut registry = PluginRegistry::new("!");
        registry.register_periodic(Arc::new(Counter {
            schedule: PeriodicSchedule::parse("@every 10s").unwrap(),
            runs: AtomicUsize::new(0),
        }));
        let sink = Arc::new(Collect::default());
        let runner = PeriodicRunner::new(Arc::new(registry), sink.clone());
        assert_eq!(runner.start(), 1);

        tokio::time::sleep(Duration::from_secs(35)).await;
        runner.stop().await;

        let sent = sink.0.lock().unwrap().clone();
        let messages: Vec<_> = sent.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["run 1", "run 3"]);
        assert!(sent.iter().all(|r| r.channel == "#ops"));
    }

    #[tokio::test]
    async fn stop_without_periodics_is_a_noop() {
        let runner = PeriodicRunner::new(
            Arc::new(PluginRegistry::default()),
            Arc::new(Collect::default()),
        );
        assert_eq!(runner.start(), 0);
        runner.stop().await;
        assert!(runner.cancellation_token().is_cancelled());
    }
}
