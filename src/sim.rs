//! Deterministic stand-ins for the audio context and the timer queue.
//!
//! [`RecordingBackend`] keeps every graph it is asked to schedule and
//! [`ManualScheduler`] runs deferred tasks only when virtual time is
//! advanced. Both read the same [`VirtualClock`], so recorded graphs carry
//! the start times a real context would have reported. Handles are cheap
//! clones sharing state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::SynthError;
use crate::graph::ToneGraph;
use crate::synth::{AudioBackend, Scheduler};

/// Shared virtual time in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock(Rc<Cell<f64>>);

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.0.get()
    }

    pub fn seconds(&self) -> f64 {
        self.0.get() / 1000.0
    }

    fn set_ms(&self, ms: f64) {
        self.0.set(ms);
    }
}

/// Records graphs instead of playing them.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    clock: VirtualClock,
    sample_rate: f64,
    graphs: Rc<RefCell<Vec<ToneGraph>>>,
    reject: bool,
}

impl RecordingBackend {
    pub fn new(clock: VirtualClock) -> Self {
        Self::with_sample_rate(clock, 44100.0)
    }

    pub fn with_sample_rate(clock: VirtualClock, sample_rate: f64) -> Self {
        RecordingBackend {
            clock,
            sample_rate,
            graphs: Rc::default(),
            reject: false,
        }
    }

    /// A backend that fails every `schedule` call.
    pub fn rejecting(clock: VirtualClock) -> Self {
        RecordingBackend {
            reject: true,
            ..Self::new(clock)
        }
    }

    pub fn graphs(&self) -> Vec<ToneGraph> {
        self.graphs.borrow().clone()
    }

    pub fn clear(&self) {
        self.graphs.borrow_mut().clear();
    }
}

impl AudioBackend for RecordingBackend {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn schedule(&self, graph: ToneGraph) -> Result<(), SynthError> {
        if self.reject {
            return Err(SynthError::Backend("schedule rejected".to_string()));
        }
        self.graphs.borrow_mut().push(graph);
        Ok(())
    }
}

struct Pending {
    due_ms: f64,
    delay_ms: u32,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Queue {
    pending: Vec<Pending>,
    next_seq: u64,
}

/// A timer queue driven by hand.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: VirtualClock,
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new(clock: VirtualClock) -> Self {
        ManualScheduler {
            clock,
            queue: Rc::default(),
        }
    }

    /// Requested delays of tasks not yet run, in due order.
    pub fn pending_delays(&self) -> Vec<u32> {
        let queue = self.queue.borrow();
        let mut due: Vec<(f64, u64, u32)> = queue
            .pending
            .iter()
            .map(|p| (p.due_ms, p.seq, p.delay_ms))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, d)| d).collect()
    }

    /// Move time forward by `ms`, running due tasks in order with the clock
    /// set to each task's due time. Returns the number of tasks run.
    pub fn advance(&self, ms: f64) -> usize {
        let target = self.clock.now_ms() + ms;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            (task.task)();
            ran += 1;
        }
        self.clock.set_ms(target);
        ran
    }

    /// Run everything queued, including tasks queued while running.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let last_due = self
                .queue
                .borrow()
                .pending
                .iter()
                .map(|p| p.due_ms)
                .fold(f64::NEG_INFINITY, f64::max);
            if last_due == f64::NEG_INFINITY {
                return ran;
            }
            let step = (last_due - self.clock.now_ms()).max(0.0);
            ran += self.advance(step);
        }
    }

    fn pop_due(&self, target: f64) -> Option<Pending> {
        let mut queue = self.queue.borrow_mut();
        let idx = queue
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= target)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        let task = queue.pending.remove(idx);
        self.clock.set_ms(task.due_ms);
        Some(task)
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let mut queue = self.queue.borrow_mut();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.pending.push(Pending {
            due_ms: self.clock.now_ms() + delay_ms as f64,
            delay_ms,
            seq,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_task(log: &Rc<RefCell<Vec<(u32, f64)>>>, clock: &VirtualClock, id: u32) -> Box<dyn FnOnce()> {
        let log = Rc::clone(log);
        let clock = clock.clone();
        Box::new(move || log.borrow_mut().push((id, clock.now_ms())))
    }

    #[test]
    fn runs_tasks_in_due_order_at_due_time() {
        let clock = VirtualClock::new();
        let sched = ManualScheduler::new(clock.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        sched.defer(100, log_task(&log, &clock, 1));
        sched.defer(50, log_task(&log, &clock, 2));
        sched.defer(50, log_task(&log, &clock, 3));

        assert_eq!(sched.advance(60.0), 2);
        assert_eq!(*log.borrow(), vec![(2, 50.0), (3, 50.0)]);
        assert_eq!(clock.now_ms(), 60.0);
        assert_eq!(sched.pending_delays(), vec![100]);

        assert_eq!(sched.run_all(), 1);
        assert_eq!(log.borrow()[2], (1, 100.0));
    }

    #[test]
    fn tasks_queued_while_running_are_honored() {
        let clock = VirtualClock::new();
        let sched = ManualScheduler::new(clock.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_sched = sched.clone();
        let inner_log = Rc::clone(&log);
        let inner_clock = clock.clone();
        sched.defer(
            10,
            Box::new(move || {
                inner_sched.defer(10, log_task(&inner_log, &inner_clock, 9));
            }),
        );

        assert_eq!(sched.run_all(), 2);
        assert_eq!(*log.borrow(), vec![(9, 20.0)]);
    }

    #[test]
    fn recording_backend_reports_clock() {
        let clock = VirtualClock::new();
        let backend = RecordingBackend::new(clock.clone());
        let sched = ManualScheduler::new(clock);
        sched.advance(250.0);
        assert!((backend.current_time() - 0.25).abs() < 1e-12);
        assert_eq!(backend.sample_rate(), 44100.0);
    }
}
