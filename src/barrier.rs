// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Condvar, Mutex};

struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// A reusable counting barrier for a fixed set of parties.
///
/// Built from a mutex, a condition variable, an arrival counter, and a
/// generation counter. All parties block in [`SweepBarrier::arrive_and_wait`]
/// until the final party arrives; that arrival resets the counter, advances
/// the generation, and releases everyone. Because waiters block on the
/// generation they entered with, a thread that reaches the next cycle early
/// cannot consume a release meant for the previous one, and a waiter woken
/// spuriously goes back to sleep. The barrier is immediately reusable after
/// each release.
///
/// There is no timeout and no partial wait: if any party fails to arrive,
/// the rest block forever.
pub struct SweepBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    all_arrived: Condvar,
}

impl SweepBarrier {
    /// Create a barrier that releases once `parties` threads have arrived.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "SweepBarrier requires at least one party");
        SweepBarrier {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            all_arrived: Condvar::new(),
        }
    }

    /// Number of parties the barrier waits for.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all parties have arrived at the current cycle.
    ///
    /// The final arrival resets the barrier for the next cycle and wakes
    /// the waiting parties before returning.
    pub fn arrive_and_wait(&self) {
        let mut state = self.state.lock().unwrap();
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.all_arrived.notify_all();
        } else {
            let generation = state.generation;
            while state.generation == generation {
                state = self.all_arrived.wait(state).unwrap();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn single_party_never_blocks() {
        let barrier = SweepBarrier::new(1);
        for _ in 0..100 {
            barrier.arrive_and_wait();
        }
    }

    #[test]
    fn all_parties_pass_together() {
        let parties = 4;
        let barrier = Arc::new(SweepBarrier::new(parties));
        let before = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..parties {
            let barrier = Arc::clone(&barrier);
            let before = Arc::clone(&before);
            handles.push(std::thread::spawn(move || {
                before.fetch_add(1, Ordering::SeqCst);
                barrier.arrive_and_wait();
                before.load(Ordering::SeqCst)
            }));
        }
        for h in handles {
            assert_eq!(h.join().unwrap(), parties);
        }
    }

    #[test]
    fn missing_party_blocks_the_rest() {
        let parties = 3;
        let barrier = Arc::new(SweepBarrier::new(parties));
        let (tx, rx) = mpsc::channel();

        let mut handles = Vec::new();
        for _ in 0..parties - 1 {
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            handles.push(std::thread::spawn(move || {
                barrier.arrive_and_wait();
                tx.send(()).unwrap();
            }));
        }

        // Two of three parties have arrived; neither may pass yet.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        barrier.arrive_and_wait();
        for _ in 0..parties - 1 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn reusable_across_many_cycles() {
        let parties = 4;
        let cycles = 50;
        let barrier = Arc::new(SweepBarrier::new(parties));
        let counter = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..parties {
            let barrier = Arc::clone(&barrier);
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                for cycle in 0..cycles {
                    counter.fetch_add(1, Ordering::SeqCst);
                    barrier.arrive_and_wait();
                    // Everyone incremented before anyone passed.
                    assert_eq!(counter.load(Ordering::SeqCst), parties * (cycle + 1));
                    barrier.arrive_and_wait();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), parties * cycles);
    }

    #[test]
    #[should_panic]
    fn zero_parties_is_a_contract_violation() {
        let _ = SweepBarrier::new(0);
    }
}
