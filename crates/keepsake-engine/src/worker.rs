//! Background worker that prunes a store on a schedule

use crate::{EngineError, PruneMetrics, Pruner, PrunerConfig};
use keepsake_domain::VersionStore;
use std::future::Future;
use tokio::time::{interval, Duration};

/// Runs a [`Pruner`] against a store at a fixed interval
///
/// # Examples
///
/// ```no_run
/// use keepsake_engine::{PrunerConfig, PrunerWorker};
/// # use keepsake_domain::{VersionRef, VersionStore};
/// # use std::collections::BTreeSet;
/// # struct Snapshots;
/// # impl VersionStore for Snapshots {
/// #     type Error = String;
/// #     fn list_versions(&self) -> Result<Vec<VersionRef>, String> { Ok(vec![]) }
/// #     fn current_version(&self) -> Result<i64, String> { Ok(0) }
/// #     fn delete_versions(&mut self, _: &BTreeSet<i64>) -> Result<(), String> { Ok(()) }
/// # }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = PrunerConfig::from_toml_str(r#"
///         dry_run = false
///         [policy]
///         keep_last_n = 5
///     "#)?;
///     let mut worker = PrunerWorker::new(config)?;
///
///     // Run until Ctrl+C
///     worker.run(Snapshots).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PrunerWorker {
    pruner: Pruner,
    interval: Duration,
}

impl PrunerWorker {
    /// Create a worker from configuration
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate
    pub fn new(config: PrunerConfig) -> Result<Self, EngineError> {
        Ok(Self {
            pruner: Pruner::from_config(&config)?,
            interval: config.sweep_interval(),
        })
    }

    /// Interval between passes
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed pass is logged and the worker keeps going.
    pub async fn run<S>(&mut self, store: S) -> Result<(), EngineError>
    where
        S: VersionStore,
        S::Error: std::fmt::Display,
    {
        self.run_until(store, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes
    ///
    /// The shutdown future is polled across passes, so a signal that fires
    /// during a pass stops the worker once that pass returns.
    pub async fn run_until<S, F>(&mut self, mut store: S, shutdown: F) -> Result<(), EngineError>
    where
        S: VersionStore,
        S::Error: std::fmt::Display,
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        tokio::pin!(shutdown);

        tracing::info!(
            dry_run = self.pruner.is_dry_run(),
            "Pruner worker started (interval: {:?})",
            self.interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping pruner");
                    break;
                }
                _ = ticker.tick() => {
                    match self.pruner.prune(&mut store) {
                        Ok(decision) => tracing::info!(
                            kept = decision.keep().len(),
                            deletable = decision.delete().len(),
                            "Prune pass completed"
                        ),
                        Err(e) => tracing::error!("Prune pass failed: {}", e),
                    }
                }
            }
        }

        tracing::info!("Pruner stopped.\n{}", self.pruner.metrics().summary());
        Ok(())
    }

    /// Run a fixed number of passes, stopping at the first failure
    pub async fn run_cycles<S>(&mut self, mut store: S, cycles: usize) -> Result<S, EngineError>
    where
        S: VersionStore,
        S::Error: std::fmt::Display,
    {
        let mut ticker = interval(self.interval);

        for cycle in 1..=cycles {
            ticker.tick().await;

            match self.pruner.prune(&mut store) {
                Ok(decision) => tracing::debug!(
                    "Prune pass {}/{}: {} kept, {} deletable",
                    cycle,
                    cycles,
                    decision.keep().len(),
                    decision.delete().len()
                ),
                Err(e) => {
                    tracing::error!("Prune pass {}/{} failed: {}", cycle, cycles, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Pruner finished {} passes.\n{}",
            cycles,
            self.pruner.metrics().summary()
        );
        Ok(store)
    }

    /// Metrics of the underlying pruner
    pub fn metrics(&self) -> &PruneMetrics {
        self.pruner.metrics()
    }

    /// Reset the pruner's metrics counters
    pub fn reset_metrics(&mut self) {
        self.pruner.reset_metrics();
    }
}
