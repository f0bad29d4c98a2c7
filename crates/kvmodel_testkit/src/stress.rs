//! Concurrent load helpers.
//!
//! These helpers drive a registry from many tasks at once, to check that
//! id allocation and persistence hold up under concurrent access.

use crate::fixtures::user_record;
use kvmodel_codec::RecordId;
use kvmodel_core::ModelRegistry;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Ids handed back by successful inserts.
    pub ids: Vec<RecordId>,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Number of distinct ids handed back.
    pub fn distinct_ids(&self) -> usize {
        self.ids.iter().collect::<BTreeSet<_>>().len()
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_ops as f64 / secs
        } else {
            0.0
        }
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent tasks.
    pub tasks: usize,
    /// Operations issued by each task.
    pub operations_per_task: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            tasks: 8,
            operations_per_task: 25,
        }
    }
}

/// Inserts users into `registry` from `config.tasks` concurrent tasks.
///
/// Usernames are unique across the run.
pub async fn stress_concurrent_inserts(
    registry: Arc<ModelRegistry>,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();
    let handles: Vec<_> = (0..config.tasks)
        .map(|task| {
            let registry = Arc::clone(&registry);
            let operations = config.operations_per_task;
            tokio::spawn(async move {
                let mut outcomes = Vec::with_capacity(operations);
                let Ok(users) = registry.model("user") else {
                    return outcomes;
                };
                for op in 0..operations {
                    let record = user_record(&format!("t{task}_{op}"));
                    outcomes.push(users.insert(record).await.ok().and_then(|r| r.id()));
                }
                outcomes
            })
        })
        .collect();

    let mut ids = Vec::new();
    let mut failed = 0usize;
    for outcome in futures::future::join_all(handles).await {
        match outcome {
            Ok(outcomes) => {
                for id in outcomes {
                    match id {
                        Some(id) => ids.push(id),
                        None => failed += 1,
                    }
                }
            }
            Err(_) => failed += config.operations_per_task,
        }
    }

    StressTestResult {
        total_ops: config.tasks * config.operations_per_task,
        successful_ops: ids.len(),
        failed_ops: failed,
        ids,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestRegistry;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_get_distinct_ids() {
        let fx = TestRegistry::new();
        let registry = Arc::new(fx.registry);
        let config = StressConfig {
            tasks: 4,
            operations_per_task: 10,
        };

        let result = stress_concurrent_inserts(registry, &config).await;
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 40);
        assert_eq!(result.distinct_ids(), 40);
    }
}
