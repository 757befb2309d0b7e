//! Single-flight, write-once result cache keyed by configuration.
//!
//! Concurrent first requests for the same configuration share one underlying
//! computation. A completed result is stored once and replayed to every later
//! requester; it is never overwritten. [`SingleFlightCache::invalidate`] drops
//! every slot and cancels computations that are still running, so they
//! neither publish stale results nor keep their waiters blocked.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{SummarizerError, SummarizerResult};

type SharedComputation<T> = Shared<BoxFuture<'static, SummarizerResult<Arc<T>>>>;

enum Slot<T> {
    InFlight {
        epoch: u64,
        computation: SharedComputation<T>,
    },
    Ready(Arc<T>),
}

pub struct SingleFlightCache<K, T> {
    name: &'static str,
    slots: Mutex<HashMap<K, Slot<T>>>,
    /// Bumped on every invalidation; in-flight computations watch it.
    epoch: watch::Sender<u64>,
    computations: AtomicUsize,
}

impl<K, T> SingleFlightCache<K, T>
where
    K: Clone + Eq + Hash + Send + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        let (epoch, _) = watch::channel(0);
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
            epoch,
            computations: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `key`, joining or starting its computation.
    ///
    /// `compute` is only invoked when no slot exists for `key`. Failed or
    /// cancelled computations leave no slot behind, so a later request
    /// recomputes.
    pub async fn get_or_compute<F, Fut>(&self, key: &K, compute: F) -> SummarizerResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SummarizerResult<T>> + Send + 'static,
    {
        let (epoch, computation) = {
            let mut slots = self.slots.lock();
            let joined = match slots.get(key) {
                Some(Slot::Ready(value)) => {
                    debug!(cache = self.name, "cache hit");
                    return Ok(Arc::clone(value));
                }
                Some(Slot::InFlight { epoch, computation }) => {
                    debug!(cache = self.name, "joining in-flight computation");
                    Some((*epoch, computation.clone()))
                }
                None => None,
            };

            match joined {
                Some(in_flight) => in_flight,
                None => {
                    debug!(cache = self.name, "cache miss, starting computation");
                    let epoch = *self.epoch.borrow();
                    let computation = self.start(compute());
                    slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            epoch,
                            computation: computation.clone(),
                        },
                    );
                    self.computations.fetch_add(1, Ordering::SeqCst);
                    (epoch, computation)
                }
            }
        };

        let result = computation.await;

        let mut slots = self.slots.lock();
        let owns_slot = matches!(
            slots.get(key),
            Some(Slot::InFlight { epoch: e, .. }) if *e == epoch
        );
        if owns_slot {
            match &result {
                Ok(value) => {
                    slots.insert(key.clone(), Slot::Ready(Arc::clone(value)));
                }
                Err(_) => {
                    slots.remove(key);
                }
            }
        }

        result
    }

    fn start<Fut>(&self, computation: Fut) -> SharedComputation<T>
    where
        Fut: Future<Output = SummarizerResult<T>> + Send + 'static,
    {
        let mut cancelled = self.epoch.subscribe();
        let name = self.name;
        async move {
            tokio::select! {
                result = computation => result.map(Arc::new),
                _ = cancelled.changed() => Err(SummarizerError::cancelled(
                    "configuration invalidated while computing",
                )
                .with_summarizer(name)),
            }
        }
        .boxed()
        .shared()
    }

    /// Drop every slot and cancel in-flight computations.
    pub fn invalidate(&self) {
        let mut slots = self.slots.lock();
        slots.clear();
        self.epoch.send_modify(|epoch| *epoch += 1);
    }

    /// Number of computations started since creation.
    pub fn computation_count(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }

    /// Number of completed results currently held.
    pub fn ready_len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}
