//! CPU client and execution queue

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::device::CpuDevice;
use super::launch::{Dim2, ExecUnit, LaunchConfig, LaunchLimits};
use crate::error::Result;
use crate::runtime::Device;

/// Thread pool configuration for a [`CpuClient`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Worker threads. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    /// Minimum number of groups handed to one rayon task. `None` means 1.
    pub min_len: Option<usize>,
}

impl ParallelismConfig {
    /// Create a parallelism configuration
    pub fn new(num_threads: Option<usize>, min_len: Option<usize>) -> Self {
        Self {
            num_threads,
            min_len,
        }
    }
}

/// Completion handle of a launch
///
/// [`CpuClient::launch`] blocks until its grid has run, so an event is
/// already signaled when the caller receives it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaunchEvent {
    seq: u64,
}

impl LaunchEvent {
    /// Position of the launch in its queue, starting at 1
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
struct QueueState {
    submitted: u64,
    in_flight: BTreeSet<u64>,
}

#[derive(Debug, Default)]
struct Queue {
    state: Mutex<QueueState>,
    drained: Condvar,
}

impl Queue {
    fn submit(&self) -> LaunchEvent {
        let mut state = self.state.lock();
        state.submitted += 1;
        let seq = state.submitted;
        state.in_flight.insert(seq);
        LaunchEvent { seq }
    }
}

/// Retires a launch when dropped, including when a group panics
struct InFlight<'a> {
    queue: &'a Queue,
    seq: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.queue.state.lock().in_flight.remove(&self.seq);
        self.queue.drained.notify_all();
    }
}

/// CPU client for operation dispatch
///
/// Cloning the client shares its queue: launches from every clone draw
/// sequence numbers from it and are visible to [`CpuClient::synchronize`].
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    limits: LaunchLimits,
    min_len: usize,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
    queue: Arc<Queue>,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            limits: LaunchLimits::default(),
            min_len: 1,
            #[cfg(feature = "rayon")]
            pool: None,
            queue: Arc::new(Queue::default()),
        }
    }

    /// Run launches on a dedicated thread pool.
    ///
    /// If the pool cannot be built the client keeps the global pool.
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Self {
        self.min_len = config.min_len.unwrap_or(1).max(1);
        #[cfg(feature = "rayon")]
        {
            self.pool = match config.num_threads {
                Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                    Ok(pool) => Some(Arc::new(pool)),
                    Err(err) => {
                        log::warn!("failed to build {n}-thread pool, using global pool: {err}");
                        None
                    }
                },
                None => None,
            };
        }
        self
    }

    /// Replace the launch limits geometry is validated against
    pub fn with_limits(mut self, limits: LaunchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Device this client runs on
    pub fn device(&self) -> &CpuDevice {
        &self.device
    }

    /// Launch limits of this client
    pub fn limits(&self) -> &LaunchLimits {
        &self.limits
    }

    /// Minimum number of groups per rayon task
    pub fn rayon_min_len(&self) -> usize {
        self.min_len
    }

    /// Run `f` inside this client's thread pool
    pub fn install_parallelism<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "rayon")]
        if let Some(pool) = &self.pool {
            return pool.install(f);
        }
        f()
    }

    /// Submit a launch and block until it has run.
    ///
    /// The geometry is validated before anything runs. `body` is called once
    /// per execution unit; groups may run concurrently, units of one group
    /// run in order.
    ///
    /// The call does not return before the grid completes, so launches
    /// issued one after another run in submission order. Launches issued at
    /// the same time from different threads run concurrently: the queue lock
    /// only hands out sequence numbers and is never held while groups run.
    pub fn launch<F>(&self, cfg: &LaunchConfig, body: F) -> Result<LaunchEvent>
    where
        F: Fn(ExecUnit) + Sync,
    {
        cfg.validate(&self.limits)?;

        let event = self.queue.submit();
        let _retire = InFlight {
            queue: &self.queue,
            seq: event.seq,
        };
        log::trace!(
            "launch #{} on {}: grid {}x{}, group {}x{}",
            event.seq,
            self.device.name(),
            cfg.grid.x,
            cfg.grid.y,
            cfg.group.x,
            cfg.group.y
        );

        let run_group = |g: usize| {
            let group = Dim2::new(g % cfg.grid.x, g / cfg.grid.x);
            for ty in 0..cfg.group.y {
                for tx in 0..cfg.group.x {
                    body(ExecUnit {
                        group,
                        thread: Dim2::new(tx, ty),
                        group_dim: cfg.group,
                        grid_dim: cfg.grid,
                    });
                }
            }
        };

        #[cfg(feature = "rayon")]
        {
            let min_len = self.min_len;
            self.install_parallelism(|| {
                (0..cfg.num_groups())
                    .into_par_iter()
                    .with_min_len(min_len)
                    .for_each(run_group)
            });
        }
        #[cfg(not(feature = "rayon"))]
        (0..cfg.num_groups()).for_each(run_group);

        Ok(event)
    }

    /// Event for the most recent launch on this queue.
    ///
    /// Dispatches that have no work to run return this instead of launching.
    pub fn record_event(&self) -> LaunchEvent {
        LaunchEvent {
            seq: self.queue.state.lock().submitted,
        }
    }

    /// Whether `event` has finished
    pub fn is_complete(&self, event: &LaunchEvent) -> bool {
        let state = self.queue.state.lock();
        event.seq <= state.submitted && !state.in_flight.contains(&event.seq)
    }

    /// Wait for every launch submitted to this queue before the call.
    ///
    /// Launches made by the calling thread have already finished; this only
    /// waits on launches other threads have in flight. Do not call it from a
    /// task running on the pool those launches need.
    pub fn synchronize(&self) {
        let mut state = self.queue.state.lock();
        let horizon = state.submitted;
        while state.in_flight.range(..=horizon).next().is_some() {
            self.queue.drained.wait(&mut state);
        }
    }
}

impl Default for CpuClient {
    fn default() -> Self {
        Self::new(CpuDevice::new())
    }
}
