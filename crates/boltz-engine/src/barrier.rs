//! Two-phase step barrier between the controller and the worker pool.
//!
//! One cycle: the controller `release_all`s the pool, every worker runs its
//! share and `report_done`s, the controller's `wait_all_done` returns once
//! all reports are in. The wake side and the completion side are independent
//! conditions so a fast worker can report and park again while others still
//! run. Releases are level-triggered per-worker flags: a release issued
//! before the worker reaches `wait_release` is consumed on entry, never
//! lost, and spurious wakeups re-check the predicate.

use parking_lot::{Condvar, Mutex};

pub struct StepBarrier {
    workers: usize,
    wake: Mutex<Box<[bool]>>,
    wake_cv: Condvar,
    done: Mutex<usize>,
    done_cv: Condvar,
}

impl StepBarrier {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            wake: Mutex::new(vec![false; workers].into_boxed_slice()),
            wake_cv: Condvar::new(),
            done: Mutex::new(0),
            done_cv: Condvar::new(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Controller: wake every worker for one activation.
    pub fn release_all(&self) {
        let mut wake = self.wake.lock();
        for flag in wake.iter_mut() {
            *flag = true;
        }
        self.wake_cv.notify_all();
    }

    /// Worker: block until released, consuming the release.
    pub fn wait_release(&self, id: usize) {
        let mut wake = self.wake.lock();
        self.wake_cv.wait_while(&mut wake, |wake| !wake[id]);
        wake[id] = false;
    }

    /// Worker: count this activation as finished.
    pub fn report_done(&self) {
        let mut done = self.done.lock();
        *done += 1;
        self.done_cv.notify_one();
    }

    /// Controller: block until every worker reported, then reset the count.
    pub fn wait_all_done(&self) {
        let mut done = self.done.lock();
        self.done_cv.wait_while(&mut done, |done| *done < self.workers);
        *done = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_release_before_wait_is_consumed() {
        let barrier = Arc::new(StepBarrier::new(1));
        barrier.release_all();
        // The release predates the wait; it must still satisfy it.
        let b = Arc::clone(&barrier);
        let t = thread::spawn(move || b.wait_release(0));
        t.join().unwrap();
        barrier.report_done();
        barrier.wait_all_done();
    }

    #[test]
    fn test_cycles_run_to_completion() {
        // Full controller/worker choreography over many cycles: every
        // worker must run exactly once per release.
        let workers = 4;
        let cycles = 200;
        let barrier = Arc::new(StepBarrier::new(workers));
        let stop = Arc::new(AtomicBool::new(false));
        let counts: Vec<_> = (0..workers)
            .map(|_| Arc::new(AtomicUsize::new(0)))
            .collect();

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let barrier = Arc::clone(&barrier);
                let stop = Arc::clone(&stop);
                let count = Arc::clone(&counts[id]);
                thread::spawn(move || loop {
                    barrier.wait_release(id);
                    if stop.load(Ordering::SeqCst) {
                        barrier.report_done();
                        break;
                    }
                    count.fetch_add(1, Ordering::Relaxed);
                    barrier.report_done();
                })
            })
            .collect();

        for _ in 0..cycles {
            barrier.release_all();
            barrier.wait_all_done();
        }
        stop.store(true, Ordering::SeqCst);
        barrier.release_all();
        for h in handles {
            h.join().unwrap();
        }

        for count in &counts {
            assert_eq!(count.load(Ordering::Relaxed), cycles);
        }
    }

    #[test]
    fn test_completion_side_resets() {
        let barrier = StepBarrier::new(2);
        barrier.report_done();
        barrier.report_done();
        barrier.wait_all_done();
        // A second rendezvous needs two fresh reports.
        barrier.report_done();
        barrier.report_done();
        barrier.wait_all_done();
    }
}
