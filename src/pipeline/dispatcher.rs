//! Fixed-size worker pool. Workers return values; the calling thread consumes them in completion order.

use crate::corpus::WorkItem;
use crate::error::Result;
use crate::features::{process_item, FailureRecord, FeatureRow};
use crate::graph::GraphAnalytics;
use crossbeam::channel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// What a worker hands back for one item.
#[derive(Debug)]
pub enum Outcome {
    Row(FeatureRow),
    Failed(FailureRecord),
    /// Stop was requested before the item started; it stays pending for the next run.
    Cancelled(String),
}

pub struct Dispatcher {
    pool: rayon::ThreadPool,
    stop: Arc<AtomicBool>,
}

impl Dispatcher {
    /// `workers == 0` uses one thread per logical CPU.
    pub fn new(workers: usize, stop: Arc<AtomicBool>) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("graph-worker-{i}"));
        if workers > 0 {
            builder = builder.num_threads(workers);
        }
        Ok(Self {
            pool: builder.build()?,
            stop,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every item and feed each outcome to `on_outcome` as it completes.
    /// An error from `on_outcome` cancels the items not yet started and is returned.
    pub fn run<A, F>(&self, analytics: &A, items: Vec<WorkItem>, mut on_outcome: F) -> Result<usize>
    where
        A: GraphAnalytics,
        F: FnMut(Outcome) -> Result<()>,
    {
        let total = items.len();
        let abort = AtomicBool::new(false);
        let (tx, rx) = channel::unbounded::<Outcome>();

        self.pool.in_place_scope(|scope| {
            for item in items {
                let tx = tx.clone();
                let stop = &self.stop;
                let abort = &abort;
                scope.spawn(move |_| {
                    let outcome = if stop.load(Ordering::Relaxed) || abort.load(Ordering::Relaxed) {
                        Outcome::Cancelled(item.identity)
                    } else {
                        match process_item(analytics, &item) {
                            Ok(row) => Outcome::Row(row),
                            Err(failure) => Outcome::Failed(failure),
                        }
                    };
                    let _ = tx.send(outcome);
                });
            }
            drop(tx);

            let mut processed = 0usize;
            for outcome in rx.iter() {
                processed += 1;
                if let Err(e) = on_outcome(outcome) {
                    abort.store(true, Ordering::Relaxed);
                    return Err(e);
                }
                info!(processed, total, "Progress: {processed}/{total} files processed.");
            }
            Ok(processed)
        })
    }
}
