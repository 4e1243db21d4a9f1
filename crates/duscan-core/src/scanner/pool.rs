/// Bounded worker pool for subdirectory fan-out.
///
/// A fixed set of lanes drains one shared job channel. Admission is gated
/// by an atomic in-flight counter: `try_spawn` accepts a task only while
/// the count is below the lane count, so at most `capacity` tasks exist at
/// any moment and a lane is always available (or about to be) for every
/// admitted task. Rejected tasks run inline on the discovering thread,
/// which keeps the scan deadlock-free even with a single lane.
use crossbeam_channel::{Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to one in-flight task result.
pub struct TaskReceipt<T> {
    rx: Receiver<T>,
}

impl<T> TaskReceipt<T> {
    /// Block until the task finishes. `None` means the lane was lost: the
    /// task panicked or the pool shut down before completion.
    pub fn join(self) -> Option<T> {
        self.rx.recv().ok()
    }
}

/// Fixed-size pool of stateless worker lanes.
pub struct WorkerPool {
    job_tx: Option<Sender<Job>>,
    in_flight: Arc<AtomicUsize>,
    capacity: usize,
    lanes: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `capacity` lanes (floor of one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let lanes = (0..capacity)
            .map(|lane| {
                let rx = job_rx.clone();
                thread::Builder::new()
                    .name(format!("duscan-lane-{lane}"))
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker lane")
            })
            .collect();
        Self {
            job_tx: Some(job_tx),
            in_flight: Arc::new(AtomicUsize::new(0)),
            capacity,
            lanes,
        }
    }

    /// Number of lanes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admit `task` iff the in-flight count is below capacity. On
    /// admission the counter is raised immediately and lowered when the
    /// task completes, panics included.
    pub fn try_spawn<T, F>(&self, task: F) -> Option<TaskReceipt<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let mut observed = self.in_flight.load(Ordering::Acquire);
        loop {
            if observed >= self.capacity {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                observed,
                observed + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => observed = current,
            }
        }

        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let in_flight = Arc::clone(&self.in_flight);
        let job: Job = Box::new(move || {
            // A panicking task must not take its lane down; the receipt
            // sees the dropped sender and reports the task as lost.
            let result = panic::catch_unwind(AssertUnwindSafe(task));
            // free the lane before publishing: once a joiner observes the
            // result, the admission slot is guaranteed available again
            in_flight.fetch_sub(1, Ordering::AcqRel);
            if let Ok(value) = result {
                let _ = result_tx.send(value);
            }
        });

        let Some(tx) = &self.job_tx else {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return None;
        };
        if tx.send(job).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return None;
        }
        Some(TaskReceipt { rx: result_rx })
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // closing the channel lets each lane drain and exit
        self.job_tx.take();
        for lane in self.lanes.drain(..) {
            let _ = lane.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_is_bounded_by_capacity() {
        let pool = WorkerPool::new(2);
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(0);

        let gate_a = release_rx.clone();
        let first = pool.try_spawn(move || gate_a.recv().ok()).unwrap();
        let gate_b = release_rx.clone();
        let second = pool.try_spawn(move || gate_b.recv().ok()).unwrap();

        // both lanes occupied: the third task must be rejected
        assert!(pool.try_spawn(|| ()).is_none());

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert!(first.join().is_some());
        assert!(second.join().is_some());

        // counter drained: admission works again
        let third = pool.try_spawn(|| 7).unwrap();
        assert_eq!(third.join(), Some(7));
    }

    #[test]
    fn results_come_back_through_the_receipt() {
        let pool = WorkerPool::new(4);
        let receipts: Vec<_> = (0..4)
            .map(|i| pool.try_spawn(move || i * 10).unwrap())
            .collect();
        let values: Vec<_> = receipts.into_iter().filter_map(TaskReceipt::join).collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn panicking_task_is_reported_lost_and_lane_survives() {
        let pool = WorkerPool::new(1);
        let exploding = pool.try_spawn(|| -> u32 { panic!("task blew up") }).unwrap();
        assert_eq!(exploding.join(), None);

        // the lane must still accept and run work afterwards
        let receipt = pool.try_spawn(|| 42).expect("lane was lost to the panic");
        assert_eq!(receipt.join(), Some(42));
    }
}
